//! Core state types for the N-body simulation.
//!
//! - `Body` a point mass with 2D position/velocity (`NVec2`)
//! - `System` the ordered list of bodies and the current simulation time `t`

use nalgebra::Vector2;
pub type NVec2 = Vector2<f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub m: f64, // mass
    pub radius: f64, // radius (softening)
}

impl Body {
    /// Point mass with no softening radius
    pub fn new(m: f64, x: f64, y: f64, vx: f64, vy: f64) -> Self {
        Self {
            x: NVec2::new(x, y),
            v: NVec2::new(vx, vy),
            m,
            radius: 0.0,
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// True when position and velocity hold no NaN/inf
    pub fn is_finite(&self) -> bool {
        self.x.iter().chain(self.v.iter()).all(|c| c.is_finite())
    }
}

#[derive(Debug, Clone, Default)]
pub struct System {
    pub bodies: Vec<Body>, // 2d collection of bodies
    pub t: f64, // time
}
