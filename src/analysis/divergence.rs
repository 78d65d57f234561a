//! Divergence detection
//!
//! A system counts as divergent as soon as any body's |x| or |y| goes past a
//! threshold. The check only runs at equally spaced checkpoints, so the time
//! reported is the first checkpoint past the event, never anything finer.

use serde::Deserialize;
use tracing::trace;

use crate::analysis::range::linspace;
use crate::analysis::sampler::PositionTrace;
use crate::error::{Result, SimError};
use crate::simulation::engine::Simulation;

/// Default threshold in AU
pub const DEFAULT_THRESHOLD: f64 = 1.0e3;

/// Default number of checkpoint intervals in a scan
pub const DEFAULT_NB_STEPS: usize = 100;

/// How long to scan, how often to check, and what counts as divergent
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ScanConfig {
    pub duration: f64,
    #[serde(default = "default_nb_steps")]
    pub nb_steps: usize,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl ScanConfig {
    pub fn new(duration: f64, nb_steps: usize, threshold: f64) -> Self {
        Self { duration, nb_steps, threshold }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            return Err(SimError::params(format!("scan duration must be non-negative, got {}", self.duration)));
        }
        if self.threshold.is_nan() {
            return Err(SimError::params("threshold is NaN"));
        }
        Ok(())
    }

    /// The `nb_steps + 1` checkpoint times
    pub fn checkpoints(&self) -> Vec<f64> {
        linspace(0.0, self.duration, self.nb_steps + 1)
    }
}

fn default_nb_steps() -> usize {
    DEFAULT_NB_STEPS
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

/// Result of a divergence scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DivergenceOutcome {
    /// First checkpoint at which the threshold was exceeded
    Diverged { time: f64 },
    /// No checkpoint exceeded the threshold; `scanned_until` is the last checkpoint
    Stable { scanned_until: f64 },
}

impl DivergenceOutcome {
    /// Divergence time, or the end of the scan for a stable system
    pub fn time(&self) -> f64 {
        match *self {
            DivergenceOutcome::Diverged { time } => time,
            DivergenceOutcome::Stable { scanned_until } => scanned_until,
        }
    }

    pub fn diverged(&self) -> bool {
        matches!(self, DivergenceOutcome::Diverged { .. })
    }
}

/// True when some coordinate in the trace is strictly beyond `threshold`
pub fn check_divergence(trace: &PositionTrace, threshold: f64) -> bool {
    trace.max_abs_coordinate() > threshold
}

/// Earliest checkpoint at which the system is beyond `threshold`.
///
/// Checkpoints are `linspace(0, duration, nb_steps + 1)`; the simulation is
/// advanced to each one in turn and its current positions are tested. Errors
/// from the simulation abort the scan unchanged.
pub fn divergence_time<S: Simulation + ?Sized>(
    sim: &mut S,
    duration: f64,
    nb_steps: usize,
    threshold: f64,
) -> Result<DivergenceOutcome> {
    let checkpoints = linspace(0.0, duration, nb_steps + 1);
    let mut last = 0.0;

    for &t in &checkpoints {
        sim.advance_to(t)?;
        let max_abs = sim
            .positions()
            .iter()
            .fold(0.0_f64, |acc, p| acc.max(p.x.abs()).max(p.y.abs()));
        if max_abs > threshold {
            trace!(t, max_abs, threshold, "threshold exceeded");
            return Ok(DivergenceOutcome::Diverged { time: t });
        }
        last = t;
    }

    Ok(DivergenceOutcome::Stable { scanned_until: last })
}

/// [`divergence_time`] with the settings bundled in a [`ScanConfig`]
pub fn scan<S: Simulation + ?Sized>(sim: &mut S, cfg: &ScanConfig) -> Result<DivergenceOutcome> {
    cfg.validate()?;
    divergence_time(sim, cfg.duration, cfg.nb_steps, cfg.threshold)
}
