/// Error types for loading, indexing and exporting dashboard data

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("CSV has no 'Time' column")]
    MissingTimeColumn,

    #[error("row {row} has {found} fields, header has {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("column '{0}' appears more than once")]
    DuplicateColumn(String),

    #[error("row {row}, column '{column}': '{value}' is not a number")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },

    #[error("cannot decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("settings file error: {0}")]
    Config(#[from] serde_json::Error),
}

impl DashboardError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DashboardError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
