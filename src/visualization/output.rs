//! Output location and file naming
//!
//! Every artifact (CSV arrays, heatmap PNG, animation GIF) is written under
//! [`OutputConfig::directory`]. A run picks one stem with [`OutputConfig::stem`]
//! and derives all of its file names from it, so a sweep's CSV and PNG share a
//! suffix.

use std::fs;
use std::path::{Path, PathBuf};

use nalgebra::DMatrix;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::sampler::PositionTrace;
use crate::analysis::sweep::DivergenceMatrix;
use crate::error::{Result, SimError};

/// How file stems are derived from a run name
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NamingStrategy {
    /// `<name>-<digits random decimal digits>`
    RandomSuffix {
        #[serde(default = "default_digits")]
        digits: usize,
    },
    /// `<name>` as is; later runs overwrite earlier ones
    Plain,
}

impl Default for NamingStrategy {
    fn default() -> Self {
        NamingStrategy::RandomSuffix { digits: default_digits() }
    }
}

fn default_digits() -> usize {
    12
}

fn default_directory() -> PathBuf {
    PathBuf::from("output")
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default)]
    pub naming: NamingStrategy,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            naming: NamingStrategy::default(),
        }
    }
}

#[derive(Serialize)]
struct TraceRow {
    body: usize,
    t: f64,
    x: f64,
    y: f64,
}

impl OutputConfig {
    pub fn new(directory: impl Into<PathBuf>, naming: NamingStrategy) -> Self {
        Self {
            directory: directory.into(),
            naming,
        }
    }

    /// File stem for `name`, using the thread RNG for suffixes
    pub fn stem(&self, name: &str) -> String {
        self.stem_with(name, &mut rand::thread_rng())
    }

    pub fn stem_with<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> String {
        match self.naming {
            NamingStrategy::Plain => name.to_string(),
            NamingStrategy::RandomSuffix { digits } => {
                let suffix: String = (0..digits)
                    .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
                    .collect();
                format!("{name}-{suffix}")
            }
        }
    }

    /// `<directory>/<stem>.<ext>`, creating the directory if needed
    pub fn path_for(&self, stem: &str, ext: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.directory)?;
        Ok(self.directory.join(format!("{stem}.{ext}")))
    }

    /// Writes `<stem>.csv` (divergence times) and `<stem>.diverged.csv` (0/1 mask)
    pub fn save_matrix(&self, matrix: &DivergenceMatrix, stem: &str) -> Result<(PathBuf, PathBuf)> {
        let times_path = self.path_for(stem, "csv")?;
        write_matrix_csv(&times_path, &matrix.times, |v| format!("{v:.18e}"))?;

        let mask_path = self.path_for(stem, "diverged.csv")?;
        write_matrix_csv(&mask_path, &matrix.diverged, |d| if *d { "1".into() } else { "0".into() })?;

        info!(path = %times_path.display(), "divergence matrix saved");
        Ok((times_path, mask_path))
    }

    /// Writes `<stem>.trace.csv` with one `body,t,x,y` row per body and sample
    pub fn save_trace(&self, trace: &PositionTrace, stem: &str) -> Result<PathBuf> {
        let path = self.path_for(stem, "trace.csv")?;
        let mut wtr = csv::Writer::from_path(&path)?;
        for (k, &t) in trace.times.iter().enumerate() {
            for body in 0..trace.body_count() {
                wtr.serialize(TraceRow {
                    body,
                    t,
                    x: trace.x[(body, k)],
                    y: trace.y[(body, k)],
                })?;
            }
        }
        wtr.flush()?;
        info!(path = %path.display(), "trace saved");
        Ok(path)
    }
}

fn write_matrix_csv<T, F>(path: &Path, m: &DMatrix<T>, fmt: F) -> Result<()>
where
    T: nalgebra::Scalar,
    F: Fn(&T) -> String,
{
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    for row in m.row_iter() {
        wtr.write_record(row.iter().map(&fmt))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Reads a header-less numeric CSV written by [`OutputConfig::save_matrix`]
pub fn read_matrix_csv(path: impl AsRef<Path>) -> Result<DMatrix<f64>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(false).from_path(path)?;
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let row = record
            .iter()
            .map(|field| {
                field
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| SimError::params(format!("bad number {field:?}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        rows.push(row);
    }

    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != ncols) {
        return Err(SimError::params("ragged CSV matrix"));
    }
    Ok(DMatrix::from_fn(rows.len(), ncols, |i, j| rows[i][j]))
}
