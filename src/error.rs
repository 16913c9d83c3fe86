//! Error types for locating and reading package manifests

use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Why a manifest's contents were rejected
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("{0}")]
    Syntax(#[from] serde_json::Error),

    #[error("Expected a JSON object at the top level")]
    NotAnObject,

    #[error("name field must be a string.")]
    NameNotString,

    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    #[error("Invalid version: {0:?}")]
    InvalidVersion(String),
}

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Cannot determine current directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("Invalid directory URL '{url}': only file:// URLs can be used")]
    InvalidUrl { url: Url },

    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Manifest {
        path: PathBuf,
        source: ManifestError,
    },
}

impl ReadError {
    /// The manifest path this error refers to, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ReadError::ReadFile { path, .. } | ReadError::Manifest { path, .. } => Some(path),
            ReadError::CurrentDir(_) | ReadError::InvalidUrl { .. } => None,
        }
    }
}
