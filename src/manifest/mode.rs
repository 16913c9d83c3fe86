//! Decoding modes
//!
//! The mode is a type parameter on the read and search options, so the shape
//! of the manifest a call returns is fixed at compile time.

use super::normalize::normalize;
use super::package_json::{NormalizedPackageJson, PackageJson};
use crate::error::ManifestError;
use serde_json::{Map, Value};
use std::fmt;

/// How a decoded `package.json` object becomes the value handed to callers
pub trait ManifestMode: fmt::Debug + Clone + Send + Sync + 'static {
    type Manifest: fmt::Debug + Clone + PartialEq + Send + 'static;

    fn decode(object: Map<String, Value>) -> Result<Self::Manifest, ManifestError>;
}

/// Return the decoded object untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Raw;

/// Apply npm-style field normalization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalized;

impl ManifestMode for Raw {
    type Manifest = PackageJson;

    fn decode(object: Map<String, Value>) -> Result<PackageJson, ManifestError> {
        Ok(PackageJson::from(object))
    }
}

impl ManifestMode for Normalized {
    type Manifest = NormalizedPackageJson;

    fn decode(object: Map<String, Value>) -> Result<NormalizedPackageJson, ManifestError> {
        normalize(object)
    }
}

/// Decode `package.json` text already in memory.
///
/// A leading byte-order mark is ignored. The top-level value must be an object.
pub fn parse_package<M: ManifestMode>(source: &str) -> Result<M::Manifest, ManifestError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    match serde_json::from_str(source)? {
        Value::Object(object) => M::decode(object),
        _ => Err(ManifestError::NotAnObject),
    }
}
