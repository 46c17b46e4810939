//! The export seam.

use std::path::PathBuf;

use jobcrawl_shared::{Job, Result};

/// Persists a run's results. Called exactly once per run, with jobs in
/// query order.
pub trait JobWriter: Send + Sync {
    /// Write both collections and return the files produced.
    fn write(&self, accepted: &[Job], rejected: &[Job]) -> Result<Vec<PathBuf>>;
}
