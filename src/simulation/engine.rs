//! Runtime engine settings and the stepping capability
//!
//! [`Simulation`] is the narrow interface the sampler, the divergence
//! detector and the sweep depend on. [`Engine`] picks which integrator
//! advances a [`Scenario`](super::scenario::Scenario).

use crate::configuration::config::IntegratorConfig;
use crate::error::Result;
use crate::simulation::forces::AccelSet;
use crate::simulation::integrator::{leapfrog_integrator, verlet_integrator};
use crate::simulation::states::{Body, NVec2, System};

/// Something that holds bodies and can be advanced forward in time.
pub trait Simulation {
    /// Append a body to the system
    fn add_body(&mut self, body: Body) -> Result<()>;

    /// Advance the state to absolute time `t`.
    /// Going backwards is an error, `t == time()` is a no-op.
    fn advance_to(&mut self, t: f64) -> Result<()>;

    /// Current position of every body, in insertion order
    fn positions(&self) -> Vec<NVec2>;

    /// Current simulation time
    fn time(&self) -> f64;

    fn body_count(&self) -> usize;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Engine {
    pub integrator: IntegratorConfig, // verlet or leapfrog
}

impl Engine {
    pub fn new(integrator: IntegratorConfig) -> Self {
        Self { integrator }
    }

    /// One step of size `dt` with the configured integrator
    pub fn step(&self, sys: &mut System, forces: &AccelSet, dt: f64) {
        match self.integrator {
            IntegratorConfig::Verlet => verlet_integrator(sys, forces, dt),
            IntegratorConfig::Leapfrog => leapfrog_integrator(sys, forces, dt),
        }
    }
}
