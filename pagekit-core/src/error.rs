//! Error types and result aliases.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Never surfaces from [`crate::config::resolve`]; the resolver recovers
    /// by falling back to the defaults.
    #[error("Config error in {context}: {message}")]
    Config { context: String, message: String },

    #[error("{stage} failed on {}: {message}", path.display())]
    Transform {
        stage: String,
        path: PathBuf,
        message: String,
    },

    #[error("Filesystem error at {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glob pattern '{pattern}': {message}")]
    Glob { pattern: String, message: String },

    #[error("Watch error: {0}")]
    Watch(String),

    #[error("Dev server error: {0}")]
    Server(String),

    #[error("Task '{task}' did not complete: {message}")]
    TaskJoin { task: String, message: String },
}

impl Error {
    pub fn transform(
        stage: impl Into<String>,
        path: impl Into<PathBuf>,
        message: impl std::fmt::Display,
    ) -> Self {
        Error::Transform {
            stage: stage.into(),
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::FileSystem {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
