pub mod error;
pub mod simulation;
pub mod configuration;
pub mod analysis;
pub mod visualization;

pub use error::{Result, SimError};

pub use simulation::states::{Body, System, NVec2};
pub use simulation::forces::{Acceleration, AccelSet, NewtonianGravity};
pub use simulation::integrator::{verlet_integrator, leapfrog_integrator};
pub use simulation::engine::{Engine, Simulation};
pub use simulation::params::Parameters;
pub use simulation::scenario::Scenario;
pub use simulation::templates::Template;

pub use configuration::config::{IntegratorConfig, EngineConfig, ParametersConfig, BodyConfig, RunConfig, TaskConfig, TraceTask, SweepTask, TraceSource};

pub use analysis::range::{linspace, ParamRange};
pub use analysis::sampler::{sample_positions, PositionTrace};
pub use analysis::divergence::{check_divergence, divergence_time, DivergenceOutcome, ScanConfig};
pub use analysis::sweep::{DivergenceMatrix, SweepEngine};

pub use visualization::output::{OutputConfig, NamingStrategy};
pub use visualization::heatmap::{render_heatmap, HeatmapLabels};
pub use visualization::animation::{render_animation, AnimationSettings};
#[cfg(feature = "viewer")]
pub use visualization::viewer2d::run_viewer;
