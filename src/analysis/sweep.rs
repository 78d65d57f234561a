//! Divergence-time sweeps over (mass, secondary parameter)
//!
//! Every cell of the grid gets its own freshly built simulation, so cells
//! share nothing and can run in any order. Rows run on rayon when
//! `parallel` is set; the matrix comes out the same either way.

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use nalgebra::DMatrix;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::analysis::divergence::{divergence_time, DivergenceOutcome, ScanConfig};
use crate::analysis::range::ParamRange;
use crate::error::Result;
use crate::simulation::engine::{Engine, Simulation};
use crate::simulation::params::Parameters;
use crate::simulation::templates::Template;

/// Divergence times indexed by (mass index, secondary index)
#[derive(Debug, Clone, PartialEq)]
pub struct DivergenceMatrix {
    /// Divergence time, or the end of the scan when the cell never diverged
    pub times: DMatrix<f64>,
    /// Whether the cell actually crossed the threshold
    pub diverged: DMatrix<bool>,
    pub masses: Vec<f64>,
    pub secondaries: Vec<f64>,
    pub duration: f64,
}

impl DivergenceMatrix {
    pub fn shape(&self) -> (usize, usize) {
        self.times.shape()
    }

    pub fn outcome(&self, i: usize, j: usize) -> DivergenceOutcome {
        let t = self.times[(i, j)];
        if self.diverged[(i, j)] {
            DivergenceOutcome::Diverged { time: t }
        } else {
            DivergenceOutcome::Stable { scanned_until: t }
        }
    }

    /// Number of cells that crossed the threshold
    pub fn diverged_count(&self) -> usize {
        self.diverged.iter().filter(|d| **d).count()
    }
}

pub struct SweepEngine {
    pub template: Template,
    pub masses: ParamRange,
    pub secondaries: ParamRange,
    pub scan: ScanConfig,
    pub engine: Engine,
    pub parameters: Parameters,
    pub parallel: bool,
    pub progress: bool,
}

impl SweepEngine {
    pub fn new(template: Template, masses: ParamRange, secondaries: ParamRange, scan: ScanConfig) -> Self {
        Self {
            template,
            masses,
            secondaries,
            scan,
            engine: Engine::default(),
            parameters: Parameters::default(),
            parallel: false,
            progress: false,
        }
    }

    pub fn with_engine(mut self, engine: Engine, parameters: Parameters) -> Self {
        self.engine = engine;
        self.parameters = parameters;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Sweep the configured template
    pub fn run(&self) -> Result<DivergenceMatrix> {
        let template = &self.template;
        let engine = self.engine;
        let parameters = &self.parameters;
        self.run_with(|m, p2| template.build_cell(m, p2, engine, parameters))
    }

    /// Sweep with cells built by `factory(mass, secondary)`.
    ///
    /// The first error from the factory or from a scan aborts the whole sweep.
    pub fn run_with<S, F>(&self, factory: F) -> Result<DivergenceMatrix>
    where
        S: Simulation,
        F: Fn(f64, f64) -> Result<S> + Sync,
    {
        self.scan.validate()?;
        let masses = self.masses.values()?;
        let secondaries = self.secondaries.values()?;

        info!(
            template = self.template.name(),
            rows = masses.len(),
            cols = secondaries.len(),
            duration = self.scan.duration,
            nb_steps = self.scan.nb_steps,
            threshold = self.scan.threshold,
            parallel = self.parallel,
            "starting divergence sweep"
        );
        let started = Instant::now();
        let pb = self.progress_bar(masses.len() as u64);

        let row = |&m: &f64| -> Result<Vec<DivergenceOutcome>> {
            let cells = secondaries
                .iter()
                .map(|&p2| {
                    let mut sim = factory(m, p2)?;
                    let outcome = divergence_time(&mut sim, self.scan.duration, self.scan.nb_steps, self.scan.threshold)?;
                    debug!(mass = m, secondary = p2, ?outcome, "cell done");
                    Ok(outcome)
                })
                .collect::<Result<Vec<_>>>()?;
            pb.inc(1);
            Ok(cells)
        };

        let rows: Vec<Vec<DivergenceOutcome>> = if self.parallel {
            masses.par_iter().map(row).collect::<Result<_>>()?
        } else {
            masses.iter().map(row).collect::<Result<_>>()?
        };
        pb.finish_and_clear();

        let (nr, nc) = (masses.len(), secondaries.len());
        let times = DMatrix::from_fn(nr, nc, |i, j| rows[i][j].time());
        let diverged = DMatrix::from_fn(nr, nc, |i, j| rows[i][j].diverged());

        let matrix = DivergenceMatrix {
            times,
            diverged,
            masses,
            secondaries,
            duration: self.scan.duration,
        };
        info!(
            cells = nr * nc,
            diverged = matrix.diverged_count(),
            elapsed_s = started.elapsed().as_secs_f64(),
            "sweep finished"
        );
        Ok(matrix)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} masses ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        pb.set_style(style);
        pb
    }
}
