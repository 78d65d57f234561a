//! Divergence-time heatmap
//!
//! Rows are masses (y axis), columns the template's secondary parameter
//! (x axis). Colour follows log10 of the divergence time; cells at t = 0 have
//! no logarithm and are drawn grey. Each cell is annotated with its value.

use std::path::Path;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::analysis::sweep::DivergenceMatrix;
use crate::error::{Result, SimError};

/// Text shown around the grid
#[derive(Debug, Clone)]
pub struct HeatmapLabels {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
}

const CELL_PX: u32 = 56;
const NO_LOG: RGBColor = RGBColor(190, 190, 190);

/// Maps `value` onto a blue (short) to red (long) hue on a log scale spanning
/// `[log_min, log_max]`. Non-positive values have no log and get `None`.
pub fn log_color(value: f64, log_min: f64, log_max: f64) -> Option<HSLColor> {
    if !(value > 0.0) {
        return None;
    }
    let span = log_max - log_min;
    let s = if span > 0.0 {
        ((value.log10() - log_min) / span).clamp(0.0, 1.0)
    } else {
        1.0
    };
    // hue 0.66 (blue) for quick divergence down to 0.0 (red) for long-lived cells
    Some(HSLColor(0.66 * (1.0 - s), 0.75, 0.5))
}

/// log10 range over the strictly positive entries, if there are any
pub fn log_bounds(matrix: &DivergenceMatrix) -> Option<(f64, f64)> {
    matrix
        .times
        .iter()
        .filter(|v| **v > 0.0)
        .map(|v| v.log10())
        .fold(None, |acc, l| match acc {
            None => Some((l, l)),
            Some((lo, hi)) => Some((lo.min(l), hi.max(l))),
        })
}

/// Label for a tick at `pos`: cells are centred on integer coordinates
fn tick_label(values: &[f64], pos: f64) -> String {
    if pos.fract() != 0.0 || pos < 0.0 {
        return String::new();
    }
    values
        .get(pos as usize)
        .map(|v| format!("{v}"))
        .unwrap_or_default()
}

/// Renders `matrix` as a PNG at `path`
pub fn render_heatmap(matrix: &DivergenceMatrix, labels: &HeatmapLabels, path: &Path, font_size: u32) -> Result<()> {
    let (rows, cols) = matrix.shape();
    if rows == 0 || cols == 0 {
        return Err(SimError::Plot(format!("cannot draw an empty {rows}x{cols} heatmap")));
    }
    let (log_min, log_max) = log_bounds(matrix).unwrap_or((0.0, 0.0));

    let width = 160 + CELL_PX * cols as u32;
    let height = 140 + CELL_PX * rows as u32;
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(SimError::plot)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&labels.title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..cols as f64 - 0.5, -0.5f64..rows as f64 - 0.5)
        .map_err(SimError::plot)?;

    let masses = &matrix.masses;
    let secondaries = &matrix.secondaries;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(labels.x_desc.as_str())
        .y_desc(labels.y_desc.as_str())
        .x_labels(cols)
        .y_labels(rows)
        .x_label_formatter(&|x| tick_label(secondaries, *x))
        .y_label_formatter(&|y| tick_label(masses, *y))
        .draw()
        .map_err(SimError::plot)?;

    let cells = (0..rows).flat_map(|i| (0..cols).map(move |j| (i, j)));

    chart
        .draw_series(cells.clone().map(|(i, j)| {
            let value = matrix.times[(i, j)];
            let style = match log_color(value, log_min, log_max) {
                Some(c) => c.filled(),
                None => NO_LOG.filled(),
            };
            let (x, y) = (j as f64, i as f64);
            Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], style)
        }))
        .map_err(SimError::plot)?;

    let annot = ("sans-serif", font_size)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    chart
        .draw_series(cells.map(|(i, j)| {
            let value = matrix.times[(i, j)];
            Text::new(format!("{value:.0}"), (j as f64, i as f64), annot.clone())
        }))
        .map_err(SimError::plot)?;

    root.present().map_err(SimError::plot)?;
    Ok(())
}
