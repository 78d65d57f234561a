use starsweep::{RunConfig, TaskConfig, TraceTask, SweepTask, TraceSource};
use starsweep::{Scenario, SweepEngine, sample_positions, check_divergence};
use starsweep::{render_heatmap, render_animation, AnimationSettings, HeatmapLabels};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "N-body trajectories and divergence-time sweeps")]
struct Args {
    /// Run file, relative to the scenarios directory
    #[arg(short, long, default_value = "triangle_sweep.yaml")]
    file_name: String,

    /// Directory holding run files (defaults to the crate's scenarios/)
    #[arg(long)]
    scenarios_dir: Option<PathBuf>,

    /// Replay trace tasks in an interactive window (needs the `viewer` feature)
    #[arg(long)]
    viewer: bool,
}

// load here to keep main clean
fn load_run_from_yaml(args: &Args) -> Result<RunConfig> {
    let dir = args
        .scenarios_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios"));
    let config_path = dir.join(&args.file_name);

    RunConfig::from_path(&config_path).with_context(|| format!("failed to load run file {}", config_path.display()))
}

fn run_trace(cfg: &RunConfig, task: &TraceTask, viewer: bool) -> Result<()> {
    let engine = cfg.engine();
    let parameters = cfg.parameters()?;

    let mut sim = match &task.source {
        TraceSource::Template { template, mass, secondary } => {
            let template = match secondary {
                Some(p2) => template.with_secondary(*p2),
                None => template.clone(),
            };
            info!(template = template.name(), mass, "building scenario from template");
            template.build(*mass, engine, &parameters)?
        }
        TraceSource::Bodies { bodies } => Scenario::build_scenario(bodies, engine, parameters)?,
    };

    let trace = sample_positions(&mut sim, task.duration, task.nb_steps)?;
    if let Some(threshold) = task.threshold {
        info!(threshold, diverged = check_divergence(&trace, threshold), "divergence check");
    }

    let stem = cfg.output.stem(&task.title);
    cfg.output.save_trace(&trace, &stem)?;

    let frames = match task.max_frames {
        Some(max) if max > 0 && trace.sample_count() > max => trace.subsampled(trace.sample_count().div_ceil(max)),
        _ => trace.clone(),
    };
    let settings = AnimationSettings {
        title: task.title.clone(),
        solar_system: task.solar_system,
        frame_delay_ms: task.frame_delay_ms,
        ..Default::default()
    };
    render_animation(&frames, &settings, &cfg.output.path_for(&stem, "gif")?)?;

    if viewer {
        #[cfg(feature = "viewer")]
        starsweep::run_viewer(trace);
        #[cfg(not(feature = "viewer"))]
        warn!("built without the `viewer` feature, skipping replay");
    }
    Ok(())
}

fn run_sweep(cfg: &RunConfig, task: &SweepTask) -> Result<()> {
    let sweep = SweepEngine::new(task.template.clone(), task.masses.clone(), task.secondaries.clone(), task.scan)
        .with_engine(cfg.engine(), cfg.parameters()?)
        .parallel(task.parallel)
        .progress(task.progress);

    let matrix = sweep.run()?;

    let name = task.template.name();
    let stem = cfg.output.stem(name);
    cfg.output.save_matrix(&matrix, &stem)?;

    let labels = HeatmapLabels {
        title: format!("Divergence time ({name})"),
        x_desc: task.template.secondary_label().to_string(),
        y_desc: "Mass (solar masses)".to_string(),
    };
    let png = cfg.output.path_for(&stem, "png")?;
    render_heatmap(&matrix, &labels, &png, task.font_size)?;
    info!(path = %png.display(), "heatmap saved");
    Ok(())
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let cfg = load_run_from_yaml(&args)?;

    match &cfg.task {
        TaskConfig::Trace(task) => run_trace(&cfg, task, args.viewer)?,
        TaskConfig::Sweep(task) => {
            if args.viewer {
                warn!("--viewer only applies to trace tasks");
            }
            run_sweep(&cfg, task)?
        }
    }

    Ok(())
}
