//! Named initial configurations
//!
//! A [`Template`] turns `(mass, secondary parameter)` into a ready-to-run
//! [`Scenario`]. Which field the secondary parameter replaces depends on the
//! template (see [`Template::secondary_label`]); sweeps vary it along the
//! heatmap's x axis.
//!
//! Units: masses in solar masses, lengths in AU, time in yr/2pi (G = 1).

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::error::{Result, SimError};
use crate::simulation::engine::{Engine, Simulation};
use crate::simulation::params::Parameters;
use crate::simulation::scenario::Scenario;
use crate::simulation::states::{Body, NVec2};

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Template {
    /// Three equal masses on a 3-4-5 right triangle, two of them moving outwards at `v0`
    Triangle {
        #[serde(default)]
        v0: f64,
    },
    /// Sun and the eight planets, plus a perturbing star at `distance` when mass > 0
    SolarSystemPerturbator {
        #[serde(default)]
        distance: f64,
    },
    /// Three collinear masses, outer ones `x` from the centre moving at +/-`v0`
    Aligned {
        x: f64,
        #[serde(default)]
        v0: f64,
    },
    /// Equilateral triangle of edge `l`, velocities tangent to the circumcircle
    Equilateral {
        l: f64,
        #[serde(default)]
        v0: f64,
    },
    /// Two bodies with a seeded random mass offset, separation and speed
    RandomTwo {
        m_range: f64,
        x_range: f64,
        v0_range: f64,
        #[serde(default)]
        seed: u64,
    },
}

/// (name, mass in solar masses, semi-major axis in AU, mean longitude at J2000 in degrees)
const PLANETS: [(&str, f64, f64, f64); 8] = [
    ("Mercury", 1.660_1e-7, 0.387_1, 252.25),
    ("Venus", 2.447_8e-6, 0.723_3, 181.98),
    ("Earth", 3.040_4e-6, 1.000_0, 100.46),
    ("Mars", 3.227_2e-7, 1.523_7, 355.43),
    ("Jupiter", 9.547_9e-4, 5.202_6, 34.40),
    ("Saturn", 2.858_9e-4, 9.554_9, 49.94),
    ("Uranus", 4.366_2e-5, 19.218_4, 313.23),
    ("Neptune", 5.151_4e-5, 30.110_4, 304.88),
];

/// Labels used when the animation is drawn as the solar system
pub const SOLAR_SYSTEM_LABELS: [&str; 10] = [
    "Sun", "Mercury", "Venus", "Earth", "Mars", "Jupiter", "Saturn", "Uranus", "Neptune", "Perturber",
];

impl Template {
    pub fn name(&self) -> &'static str {
        match self {
            Template::Triangle { .. } => "triangle",
            Template::SolarSystemPerturbator { .. } => "solar_system_perturbator",
            Template::Aligned { .. } => "aligned",
            Template::Equilateral { .. } => "equilateral",
            Template::RandomTwo { .. } => "random_two",
        }
    }

    /// Axis title for the parameter a sweep varies
    pub fn secondary_label(&self) -> &'static str {
        match self {
            Template::Triangle { .. } => "Initial velocity (AU per yr/2pi)",
            Template::SolarSystemPerturbator { .. } => "Distance to the Sun (AU)",
            Template::Aligned { .. } => "Outer star velocity (AU per yr/2pi)",
            Template::Equilateral { .. } => "Tangential velocity (AU per yr/2pi)",
            Template::RandomTwo { .. } => "Maximal separation (AU)",
        }
    }

    /// Copy of the template with its secondary parameter replaced
    pub fn with_secondary(&self, p2: f64) -> Template {
        let mut t = self.clone();
        match &mut t {
            Template::Triangle { v0 } => *v0 = p2,
            Template::SolarSystemPerturbator { distance } => *distance = p2,
            Template::Aligned { v0, .. } => *v0 = p2,
            Template::Equilateral { v0, .. } => *v0 = p2,
            Template::RandomTwo { x_range, .. } => *x_range = p2,
        }
        t
    }

    /// Build one sweep cell: fresh scenario for `(mass, p2)`
    pub fn build_cell(&self, mass: f64, p2: f64, engine: Engine, parameters: &Parameters) -> Result<Scenario> {
        self.with_secondary(p2).build(mass, engine, parameters)
    }

    /// Build the scenario using the template's own fields
    pub fn build(&self, mass: f64, engine: Engine, parameters: &Parameters) -> Result<Scenario> {
        let mut sim = Scenario::new(engine, parameters.clone())?;

        match *self {
            Template::Triangle { v0 } => {
                sim.add_body(Body::new(mass, 0.0, 0.0, 0.0, 0.0))?;
                sim.add_body(Body::new(mass, 3.0, 0.0, v0, 0.0))?;
                sim.add_body(Body::new(mass, 0.0, 4.0, 0.0, v0))?;
            }
            Template::SolarSystemPerturbator { distance } => {
                for body in solar_system(parameters.G) {
                    sim.add_body(body)?;
                }
                if mass != 0.0 {
                    let d = distance * FRAC_1_SQRT_2;
                    sim.add_body(Body::new(mass, d, d, 0.0, 0.0))?;
                }
            }
            Template::Aligned { x, v0 } => {
                sim.add_body(Body::new(mass, 0.0, 0.0, 0.0, 0.0))?;
                sim.add_body(Body::new(mass, x, 0.0, 0.0, v0))?;
                sim.add_body(Body::new(mass, -x, 0.0, 0.0, -v0))?;
            }
            Template::Equilateral { l, v0 } => {
                if !(l.is_finite() && l > 0.0) {
                    return Err(SimError::params(format!("edge length must be positive, got {l}")));
                }
                // circumradius of an equilateral triangle
                let r = l / 3f64.sqrt();
                for k in 0..3 {
                    let theta = PI / 2.0 + k as f64 * 2.0 * PI / 3.0;
                    let (s, c) = theta.sin_cos();
                    sim.add_body(Body::new(mass, r * c, r * s, -v0 * s, v0 * c))?;
                }
            }
            Template::RandomTwo { m_range, x_range, v0_range, seed } => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let (um, ux, uv): (f64, f64, f64) = (rng.gen(), rng.gen(), rng.gen());
                sim.add_body(Body::new(mass, 0.0, 0.0, 0.0, 0.0))?;
                sim.add_body(Body::new(mass + m_range * um, x_range * ux, 0.0, v0_range * uv, 0.0))?;
            }
        }

        Ok(sim)
    }
}

/// Sun and planets on circular, coplanar orbits, shifted to the barycentric frame
pub fn solar_system(g: f64) -> Vec<Body> {
    let sun_mass = 1.0;
    let mut bodies = vec![Body::new(sun_mass, 0.0, 0.0, 0.0, 0.0)];

    for &(_, m, a, longitude) in PLANETS.iter() {
        let (s, c) = longitude.to_radians().sin_cos();
        let speed = (g * (sun_mass + m) / a).sqrt();
        bodies.push(Body::new(m, a * c, a * s, -speed * s, speed * c));
    }

    let total: f64 = bodies.iter().map(|b| b.m).sum();
    let com = bodies.iter().fold(NVec2::zeros(), |acc, b| acc + b.m * b.x) / total;
    let vcom = bodies.iter().fold(NVec2::zeros(), |acc, b| acc + b.m * b.v) / total;
    for b in bodies.iter_mut() {
        b.x -= com;
        b.v -= vcom;
    }
    bodies
}
