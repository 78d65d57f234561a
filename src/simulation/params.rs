//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - the fixed integration step `h0`
//! - softening and gravitational constant (`eps2`, `G`)

use crate::error::{Result, SimError};

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub h0: f64, // step size
    pub eps2: f64, // softening
    pub G: f64, // gravitational constant
}

impl Default for Parameters {
    /// G = 1 with masses in solar masses, lengths in AU and time in yr/2pi
    fn default() -> Self {
        Self {
            h0: 0.01,
            eps2: 0.0,
            G: 1.0,
        }
    }
}

impl Parameters {
    pub fn validate(&self) -> Result<()> {
        if !(self.h0.is_finite() && self.h0 > 0.0) {
            return Err(SimError::params(format!("step size h0 must be positive, got {}", self.h0)));
        }
        if !(self.eps2.is_finite() && self.eps2 >= 0.0) {
            return Err(SimError::params(format!("eps2 must be non-negative, got {}", self.eps2)));
        }
        if !self.G.is_finite() {
            return Err(SimError::params(format!("G must be finite, got {}", self.G)));
        }
        Ok(())
    }
}
