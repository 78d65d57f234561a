//! Acceleration contributors for the 2D n-body engine
//!
//! An [`AccelSet`] sums every registered [`Acceleration`] term into one
//! acceleration per body. The only term shipped here is softened direct
//! Newtonian gravity.

use crate::simulation::states::{System, NVec2};

/// Trait for acceleration sources operating on a [`System`]
/// Implementations add their contribution into `out[i]` for each body
pub trait Acceleration {
    fn acceleration(&self, t: f64, sys: &System, out: &mut [NVec2]);
}

/// Collection of acceleration terms (gravity, drag, etc.)
#[derive(Default)]
pub struct AccelSet {
    terms: Vec<Box<dyn Acceleration + Send + Sync>>,
}

impl AccelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an acceleration term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Acceleration + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Total accelerations at time `t`: `out` is zeroed, then every term adds in
    pub fn accumulate_accels(&self, t: f64, sys: &System, out: &mut [NVec2]) {
        out.iter_mut().for_each(|a| *a = NVec2::zeros());
        for term in &self.terms {
            term.acceleration(t, sys, out);
        }
    }
}

/// Direct O(N^2) Newtonian gravity with softening
///
/// The softened squared distance of a pair is
/// `|r|^2 + (r_i^2 + r_j^2) / 2 + eps2`, so bodies with a radius and the
/// global `eps2` floor both smooth close encounters.
#[allow(non_snake_case)]
pub struct NewtonianGravity {
    pub G: f64, // gravitational constant
    pub eps2: f64, // softening
}

impl Acceleration for NewtonianGravity {
    fn acceleration(&self, _t: f64, sys: &System, out: &mut [NVec2]) {
        let bodies = &sys.bodies;

        for (i, bi) in bodies.iter().enumerate() {
            for (j, bj) in bodies.iter().enumerate().skip(i + 1) {
                // massless pairs contribute nothing, even when they overlap
                if bi.m == 0.0 && bj.m == 0.0 {
                    continue;
                }

                // points from i to j: i is pulled along +r, j along -r
                let r = bj.x - bi.x;
                let soft2 = 0.5 * (bi.radius * bi.radius + bj.radius * bj.radius) + self.eps2;
                let d2 = r.norm_squared() + soft2;

                let inv_d = d2.sqrt().recip();
                let coef = self.G * inv_d * inv_d * inv_d;

                out[i] += coef * bj.m * r;
                out[j] -= coef * bi.m * r;
            }
        }
    }
}
