//! Position sampling
//!
//! Advances a [`Simulation`] forward through equally spaced times and records
//! every body's (x, y) after each advance.

use nalgebra::DMatrix;
use tracing::debug;

use crate::analysis::range::linspace;
use crate::error::Result;
use crate::simulation::engine::Simulation;

/// Positions of every body over time.
/// `x` and `y` are bodies x samples, `times[k]` is the time of column `k`.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionTrace {
    pub x: DMatrix<f64>,
    pub y: DMatrix<f64>,
    pub times: Vec<f64>,
}

impl PositionTrace {
    pub fn body_count(&self) -> usize {
        self.x.nrows()
    }

    pub fn sample_count(&self) -> usize {
        self.x.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Largest |x| or |y| over all bodies and samples, 0 for an empty trace
    pub fn max_abs_coordinate(&self) -> f64 {
        self.x
            .iter()
            .chain(self.y.iter())
            .fold(0.0_f64, |acc, c| acc.max(c.abs()))
    }

    /// Trace restricted to the first `frames` samples
    pub fn truncated(&self, frames: usize) -> PositionTrace {
        let k = frames.min(self.sample_count());
        PositionTrace {
            x: self.x.columns(0, k).into_owned(),
            y: self.y.columns(0, k).into_owned(),
            times: self.times[..k].to_vec(),
        }
    }

    /// Every `stride`-th sample, always keeping the last one
    pub fn subsampled(&self, stride: usize) -> PositionTrace {
        let n = self.sample_count();
        if stride <= 1 || n == 0 {
            return self.clone();
        }
        let mut cols: Vec<usize> = (0..n).step_by(stride).collect();
        if cols.last() != Some(&(n - 1)) {
            cols.push(n - 1);
        }
        PositionTrace {
            x: self.x.select_columns(cols.iter()),
            y: self.y.select_columns(cols.iter()),
            times: cols.iter().map(|&k| self.times[k]).collect(),
        }
    }
}

/// Record positions at `nb_steps` equally spaced times over `[0, duration]`.
///
/// The simulation is only ever moved forward; a simulation already past one
/// of the sample times surfaces the collaborator's backward-step error.
pub fn sample_positions<S: Simulation + ?Sized>(sim: &mut S, duration: f64, nb_steps: usize) -> Result<PositionTrace> {
    let n = sim.body_count();
    let times = linspace(0.0, duration, nb_steps);

    let mut x = DMatrix::zeros(n, times.len());
    let mut y = DMatrix::zeros(n, times.len());

    for (k, &t) in times.iter().enumerate() {
        sim.advance_to(t)?;
        for (i, p) in sim.positions().iter().enumerate() {
            x[(i, k)] = p.x;
            y[(i, k)] = p.y;
        }
    }

    debug!(bodies = n, samples = times.len(), duration, "sampled positions");
    Ok(PositionTrace { x, y, times })
}
