//! Configuration types for loading runs from YAML.
//!
//! A run file has four sections:
//!
//! - [`EngineConfig`]     – which integrator advances the system
//! - [`ParametersConfig`] – step size and physical constants
//! - [`OutputConfig`]     – where CSV/PNG/GIF files go and how they are named
//! - [`TaskConfig`]       – what to do: record a trace or sweep divergence times
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   integrator: "verlet"    # or "leapfrog"
//!
//! parameters:
//!   h0: 0.01                # fixed step size
//!   eps2: 0.0               # softening epsilon^2
//!   G: 1.0                  # gravitational constant
//!
//! output:
//!   directory: "output"
//!   naming: { kind: random_suffix, digits: 12 }
//!
//! task:
//!   kind: sweep
//!   template: { kind: triangle, v0: 0.0 }
//!   masses: { kind: arange, start: 2.0, stop: 32.0, step: 2.0 }
//!   secondaries: { kind: arange, start: 0.0, stop: 13.0, step: 1.0 }
//!   scan: { duration: 1000.0, nb_steps: 100, threshold: 1000.0 }
//! ```
//!
//! The runtime turns these into an `Engine`, `Parameters` and one or more
//! `Scenario`s.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::analysis::divergence::ScanConfig;
use crate::analysis::range::ParamRange;
use crate::error::{Result, SimError};
use crate::simulation::engine::Engine;
use crate::simulation::params::Parameters;
use crate::simulation::templates::Template;
use crate::visualization::output::OutputConfig;

/// Which integrator the engine uses
/// `integrator: "verlet"` or `integrator: "leapfrog"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegratorConfig {
    #[default]
    #[serde(rename = "verlet")] // kick-drift-kick, two force evaluations per step
    Verlet,

    #[serde(rename = "leapfrog")] // drift-kick-drift, one force evaluation per step
    Leapfrog,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub integrator: IntegratorConfig,
}

/// Step size and physical constants; any field left out keeps its default
#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ParametersConfig {
    pub h0: f64,   // time step size
    pub eps2: f64, // softening - prevent singular forces at very small separations
    pub G: f64,    // gravitational constant
}

impl Default for ParametersConfig {
    fn default() -> Self {
        let p = Parameters::default();
        Self { h0: p.h0, eps2: p.eps2, G: p.G }
    }
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: Vec<f64>, // initial position [x, y]
    pub v: Vec<f64>, // initial velocity [vx, vy]
    pub m: f64,      // mass
    #[serde(default)]
    pub radius: f64, // softening core radius
}

/// Where a trace task gets its initial bodies from
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "from", rename_all = "snake_case")]
pub enum TraceSource {
    Template {
        template: Template,
        mass: f64,
        #[serde(default)]
        secondary: Option<f64>, // overrides the template's swept field
    },
    Bodies {
        bodies: Vec<BodyConfig>,
    },
}

/// Sample positions of one system and animate them
#[derive(Deserialize, Debug, Clone)]
pub struct TraceTask {
    pub source: TraceSource,
    pub duration: f64,
    pub nb_steps: usize,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub solar_system: bool, // planet labels + legend in the animation
    #[serde(default = "default_frame_delay")]
    pub frame_delay_ms: u32,
    #[serde(default)]
    pub max_frames: Option<usize>, // subsample long traces
    #[serde(default)]
    pub threshold: Option<f64>, // also report whether the trace diverges
}

/// Divergence-time heatmap over (mass, secondary parameter)
#[derive(Deserialize, Debug, Clone)]
pub struct SweepTask {
    pub template: Template,
    pub masses: ParamRange,
    pub secondaries: ParamRange,
    pub scan: ScanConfig,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default = "default_true")]
    pub progress: bool,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskConfig {
    Trace(TraceTask),
    Sweep(SweepTask),
}

/// Top-level run configuration loaded from YAML
#[derive(Deserialize, Debug, Clone)]
pub struct RunConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub task: TaskConfig,
}

impl RunConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let cfg: RunConfig = serde_yaml::from_reader(BufReader::new(file))?;
        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn engine(&self) -> Engine {
        Engine {
            integrator: self.engine.integrator,
        }
    }

    /// Runtime parameters, validated
    pub fn parameters(&self) -> Result<Parameters> {
        let p = Parameters {
            h0: self.parameters.h0,
            eps2: self.parameters.eps2,
            G: self.parameters.G,
        };
        p.validate()?;
        Ok(p)
    }
}

impl BodyConfig {
    /// Checks the vectors are 2D before they are turned into `Body`s
    pub fn check_shape(&self) -> Result<()> {
        if self.x.len() != 2 || self.v.len() != 2 {
            return Err(SimError::body(format!(
                "expected 2D position/velocity, got x = {:?}, v = {:?}",
                self.x, self.v
            )));
        }
        Ok(())
    }
}

fn default_title() -> String {
    "trajectories".to_string()
}

fn default_frame_delay() -> u32 {
    40
}

fn default_font_size() -> u32 {
    12
}

fn default_true() -> bool {
    true
}
