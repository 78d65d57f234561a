//! Fully-initialized simulation scenarios
//!
//! A [`Scenario`] bundles:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - system state (`System`, bodies at t = 0 when freshly built)
//! - active force set (`AccelSet`)
//!
//! It is the crate's own implementation of [`Simulation`]: sampling, divergence
//! detection and sweeps all drive it through that trait.

use crate::configuration::config::BodyConfig;
use crate::error::{Result, SimError};
use crate::simulation::engine::{Engine, Simulation};
use crate::simulation::forces::{AccelSet, NewtonianGravity};
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec2, System};

pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub system: System,
    pub forces: AccelSet,
}

impl Scenario {
    /// Empty system at t = 0 with Newtonian gravity registered
    pub fn new(engine: Engine, parameters: Parameters) -> Result<Self> {
        parameters.validate()?;

        let forces = AccelSet::new().with(NewtonianGravity {
            G: parameters.G,
            eps2: parameters.eps2,
        });

        Ok(Self {
            engine,
            parameters,
            system: System::default(),
            forces,
        })
    }

    /// Scenario from an explicit list of bodies (YAML `bodies:`)
    pub fn build_scenario(bodies: &[BodyConfig], engine: Engine, parameters: Parameters) -> Result<Self> {
        let mut scenario = Self::new(engine, parameters)?;
        for bc in bodies {
            bc.check_shape()?;
            let body = Body {
                x: NVec2::new(bc.x[0], bc.x[1]),
                v: NVec2::new(bc.v[0], bc.v[1]),
                m: bc.m,
                radius: bc.radius,
            };
            scenario.add_body(body)?;
        }
        Ok(scenario)
    }

    pub fn bodies(&self) -> &[Body] {
        &self.system.bodies
    }
}

impl Simulation for Scenario {
    fn add_body(&mut self, body: Body) -> Result<()> {
        if !(body.m.is_finite() && body.m >= 0.0) {
            return Err(SimError::body(format!("mass must be finite and non-negative, got {}", body.m)));
        }
        if !(body.radius.is_finite() && body.radius >= 0.0) {
            return Err(SimError::body(format!("radius must be finite and non-negative, got {}", body.radius)));
        }
        if !body.is_finite() {
            return Err(SimError::body(format!("non-finite position/velocity {:?} {:?}", body.x, body.v)));
        }
        self.system.bodies.push(body);
        Ok(())
    }

    fn advance_to(&mut self, t: f64) -> Result<()> {
        if !t.is_finite() {
            return Err(SimError::InvalidTime(t));
        }
        let from = self.system.t;
        if t < from {
            return Err(SimError::BackwardStep { from, to: t });
        }

        let h = self.parameters.h0;
        // below this the remainder is rounding noise, not a step
        let tol = h * 1e-9;
        while t - self.system.t > tol {
            let dt = h.min(t - self.system.t);
            self.engine.step(&mut self.system, &self.forces, dt);
        }
        self.system.t = t;

        if self.system.bodies.iter().any(|b| !b.is_finite()) {
            return Err(SimError::NonFiniteState(t));
        }
        Ok(())
    }

    fn positions(&self) -> Vec<NVec2> {
        self.system.bodies.iter().map(|b| b.x).collect()
    }

    fn time(&self) -> f64 {
        self.system.t
    }

    fn body_count(&self) -> usize {
        self.system.bodies.len()
    }
}
