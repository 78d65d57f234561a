//! Evenly spaced sample points for scans and sweep axes.

use serde::Deserialize;

use crate::error::{Result, SimError};

/// `num` evenly spaced values over `[start, stop]`, both ends included.
///
/// `num == 0` gives an empty vector and `num == 1` gives `[start]`.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut out: Vec<f64> = (0..num).map(|i| start + i as f64 * step).collect();
            // exact endpoint
            out[num - 1] = stop;
            out
        }
    }
}

/// One axis of a parameter sweep
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParamRange {
    /// `num` values over `[start, stop]` inclusive
    Linspace { start: f64, stop: f64, num: usize },
    /// `start, start + step, ...` strictly before `stop`
    Arange { start: f64, stop: f64, step: f64 },
}

impl ParamRange {
    pub fn linspace(start: f64, stop: f64, num: usize) -> Self {
        Self::Linspace { start, stop, num }
    }

    pub fn arange(start: f64, stop: f64, step: f64) -> Self {
        Self::Arange { start, stop, step }
    }

    pub fn values(&self) -> Result<Vec<f64>> {
        match *self {
            ParamRange::Linspace { start, stop, num } => {
                if !(start.is_finite() && stop.is_finite()) {
                    return Err(SimError::range(format!("non-finite bounds {start}..={stop}")));
                }
                Ok(linspace(start, stop, num))
            }
            ParamRange::Arange { start, stop, step } => {
                if !(start.is_finite() && stop.is_finite()) {
                    return Err(SimError::range(format!("non-finite bounds {start}..{stop}")));
                }
                if !step.is_finite() || step == 0.0 {
                    return Err(SimError::range(format!("step must be finite and non-zero, got {step}")));
                }
                let count = ((stop - start) / step).ceil().max(0.0) as usize;
                Ok((0..count).map(|i| start + i as f64 * step).collect())
            }
        }
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.values()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
