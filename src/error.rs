use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("food not found: {0}")]
    FoodNotFound(String),

    #[error("brand not found: {0}")]
    BrandNotFound(String),

    #[error("meal {meal} not found for brand {brand}")]
    MealNotFound { brand: String, meal: String },

    #[error("invalid serving ratio: {0}")]
    InvalidRatio(f64),

    /// User names become file names under the log directory.
    #[error("invalid user name: {0:?}")]
    InvalidUser(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
