//! Trajectory animation written as a looping GIF
//!
//! Frame `k` (0 to the sample count) shows every body's path over samples `0..k`, a `+` at its latest
//! point and a star where it started. Axes follow the data drawn so far; the
//! first frame has nothing to fit and keeps the default bounds.

use std::ops::Range;
use std::path::Path;

use plotters::prelude::*;
use tracing::info;

use crate::analysis::sampler::PositionTrace;
use crate::error::{Result, SimError};
use crate::simulation::templates::SOLAR_SYSTEM_LABELS;

pub const BODY_COLORS: [RGBColor; 10] = [
    RGBColor(255, 215, 0),   // gold
    RGBColor(0, 128, 0),     // green
    RGBColor(255, 165, 0),   // orange
    RGBColor(0, 0, 255),     // blue
    RGBColor(255, 0, 0),     // red
    RGBColor(244, 164, 96),  // sandy brown
    RGBColor(255, 228, 181), // moccasin
    RGBColor(135, 206, 250), // light sky blue
    RGBColor(0, 0, 205),     // medium blue
    RGBColor(255, 105, 180), // hot pink
];

const DEFAULT_BOUNDS: (Range<f64>, Range<f64>) = (-1.0..1.0, -1.0..1.0);

#[derive(Debug, Clone)]
pub struct AnimationSettings {
    pub title: String,
    pub solar_system: bool,
    pub frame_delay_ms: u32,
    pub size: (u32, u32),
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            title: "trajectories".to_string(),
            solar_system: false,
            frame_delay_ms: 40,
            size: (640, 640),
        }
    }
}

pub fn body_color(i: usize) -> RGBColor {
    BODY_COLORS[i % BODY_COLORS.len()]
}

/// Axis ranges covering samples `0..frame` of every body, padded by 5%.
/// `None` when the frame shows no samples yet.
pub fn frame_bounds(trace: &PositionTrace, frame: usize) -> Option<(Range<f64>, Range<f64>)> {
    let k = frame.min(trace.sample_count());
    if k == 0 || trace.body_count() == 0 {
        return None;
    }
    let xs = trace.x.columns(0, k);
    let ys = trace.y.columns(0, k);
    Some((padded(xs.min(), xs.max()), padded(ys.min(), ys.max())))
}

fn padded(lo: f64, hi: f64) -> Range<f64> {
    let pad = ((hi - lo) * 0.05).max(1e-3);
    (lo - pad)..(hi + pad)
}

/// Writes the animation of `trace` to `path` (GIF, loops forever)
pub fn render_animation(trace: &PositionTrace, settings: &AnimationSettings, path: &Path) -> Result<()> {
    let frames = trace.sample_count();
    let bodies = trace.body_count();
    info!(frames, bodies, path = %path.display(), "rendering animation");

    let root = BitMapBackend::gif(path, settings.size, settings.frame_delay_ms)
        .map_err(SimError::plot)?
        .into_drawing_area();

    let mut bounds = DEFAULT_BOUNDS;
    // the last frame shows the whole trace
    for frame in 0..=frames {
        // nothing shown yet: keep the previous axes
        if let Some(b) = frame_bounds(trace, frame) {
            bounds = b;
        }

        root.fill(&WHITE).map_err(SimError::plot)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(&settings.title, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(bounds.0.clone(), bounds.1.clone())
            .map_err(SimError::plot)?;
        chart.configure_mesh().draw().map_err(SimError::plot)?;

        for n in 0..bodies {
            let color = body_color(n);
            let path_points: Vec<(f64, f64)> = (0..frame).map(|k| (trace.x[(n, k)], trace.y[(n, k)])).collect();

            let series = chart
                .draw_series(LineSeries::new(path_points.iter().copied(), color.stroke_width(1)))
                .map_err(SimError::plot)?;
            if settings.solar_system {
                let label = SOLAR_SYSTEM_LABELS.get(n).copied().unwrap_or("Body");
                series
                    .label(label)
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
            }

            if let Some(&last) = path_points.last() {
                chart
                    .draw_series(std::iter::once(Cross::new(last, 5, color.stroke_width(2))))
                    .map_err(SimError::plot)?;
            }
            if frames > 0 {
                let start = (trace.x[(n, 0)], trace.y[(n, 0)]);
                chart
                    .draw_series(std::iter::once(TriangleMarker::new(start, 6, color.filled())))
                    .map_err(SimError::plot)?;
            }
        }

        if settings.solar_system {
            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(SimError::plot)?;
        }

        root.present().map_err(SimError::plot)?;
    }

    info!(path = %path.display(), "animation saved");
    Ok(())
}
