//! Error type shared by the simulation, analysis and output layers.

use thiserror::Error;

/// Errors raised while building, stepping or post-processing a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// A body with a negative or non-finite mass, position or velocity
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// `advance_to` was asked to go back in time
    #[error("cannot advance backwards from t = {from} to t = {to}")]
    BackwardStep { from: f64, to: f64 },

    /// Target time is NaN or infinite
    #[error("invalid target time {0}")]
    InvalidTime(f64),

    /// Integration produced NaN/inf positions or velocities
    #[error("non-finite state reached at t = {0}")]
    NonFiniteState(f64),

    /// Sweep axis cannot be enumerated
    #[error("invalid parameter range: {0}")]
    InvalidRange(String),

    /// Numerical parameters or scan settings out of bounds
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Rendering backend failure (plotters)
    #[error("plot error: {0}")]
    Plot(String),
}

impl SimError {
    /// Creates a body validation error.
    pub fn body(msg: impl Into<String>) -> Self {
        Self::InvalidBody(msg.into())
    }

    /// Creates a range error.
    pub fn range(msg: impl Into<String>) -> Self {
        Self::InvalidRange(msg.into())
    }

    /// Creates a parameter error.
    pub fn params(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }

    /// Wraps any displayable backend error as a plot error.
    pub fn plot(err: impl std::fmt::Display) -> Self {
        Self::Plot(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
