//! Stored trajectory tables.
//!
//! Expected headers: `position,velocity,duration_ms`.
use serde::Deserialize;
use std::path::Path;

/// One row of a stored trajectory, in sensor units.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TrajectoryRow {
    pub position: f64,
    pub velocity: f64,
    pub duration_ms: u32,
}

/// A validated, ordered trajectory table.
///
/// The first row is the zeroing row and the final row terminates the profile;
/// the loader does not require the file to mark either.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryTable {
    rows: Vec<TrajectoryRow>,
}

impl TrajectoryTable {
    pub fn from_rows(rows: Vec<TrajectoryRow>) -> eyre::Result<Self> {
        if rows.is_empty() {
            eyre::bail!("trajectory must contain at least one point");
        }
        for (idx, r) in rows.iter().enumerate() {
            if !r.position.is_finite() || !r.velocity.is_finite() {
                eyre::bail!("trajectory point {idx}: position and velocity must be finite");
            }
            if r.duration_ms == 0 {
                eyre::bail!("trajectory point {idx}: duration_ms must be >= 1");
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[TrajectoryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of all point durations in milliseconds.
    pub fn total_duration_ms(&self) -> u64 {
        self.rows.iter().map(|r| u64::from(r.duration_ms)).sum()
    }
}

impl TryFrom<Vec<TrajectoryRow>> for TrajectoryTable {
    type Error = eyre::Report;
    fn try_from(rows: Vec<TrajectoryRow>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

pub fn load_trajectory_csv(path: &Path) -> eyre::Result<TrajectoryTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open trajectory CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["position", "velocity", "duration_ms"];
    let actual: Vec<String> = headers.iter().map(str::to_string).collect();
    if actual != expected {
        eyre::bail!(
            "trajectory CSV must have headers 'position,velocity,duration_ms', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<TrajectoryRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => eyre::bail!("invalid CSV row {}: {}", idx + 2, e),
        }
    }

    TrajectoryTable::try_from(rows)
}
