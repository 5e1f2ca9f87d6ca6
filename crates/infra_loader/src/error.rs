//! Loader error types

use std::path::PathBuf;

use domain_claims::SeedTable;
use thiserror::Error;

/// Errors that stop loading of one entity type
///
/// Per-record and per-batch problems never surface here; they are logged
/// and counted in the [`LoadReport`](crate::LoadReport).
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("seed directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),

    #[error("no files matching {pattern} in {}", dir.display())]
    NoFiles { dir: PathBuf, pattern: &'static str },

    #[error("no {0} were loaded")]
    NothingLoaded(SeedTable),

    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to parse JSON {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LoaderError {
    /// True when the seed files are simply absent
    pub fn is_no_data(&self) -> bool {
        matches!(self, LoaderError::MissingDirectory(_) | LoaderError::NoFiles { .. })
    }
}
