//! Reading `package.json` from a directory

use super::mode::{ManifestMode, Normalized, Raw, parse_package};
use crate::error::ReadError;
use crate::location::{Location, resolve_or_current};
use std::future::Future;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of a package manifest
pub const MANIFEST_FILE: &str = "package.json";

/// Where to read a manifest from and how to decode it
#[derive(Debug, Clone)]
pub struct ReadOptions<M = Normalized> {
    cwd: Option<Location>,
    mode: PhantomData<M>,
}

impl ReadOptions<Normalized> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M> Default for ReadOptions<M> {
    fn default() -> Self {
        Self {
            cwd: None,
            mode: PhantomData,
        }
    }
}

impl<M> ReadOptions<M> {
    /// Directory holding the manifest (default: the working directory)
    pub fn cwd(mut self, dir: impl Into<Location>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn dir(&self) -> Option<&Location> {
        self.cwd.as_ref()
    }

    /// Return the manifest as decoded, without normalization.
    pub fn raw(self) -> ReadOptions<Raw> {
        ReadOptions {
            cwd: self.cwd,
            mode: PhantomData,
        }
    }

    pub fn normalized(self) -> ReadOptions<Normalized> {
        ReadOptions {
            cwd: self.cwd,
            mode: PhantomData,
        }
    }

    /// Absolute path of the manifest these options point at.
    pub fn manifest_path(&self) -> Result<PathBuf, ReadError> {
        Ok(resolve_or_current(self.cwd.as_ref())?.join(MANIFEST_FILE))
    }
}

/// Loads and decodes a manifest
///
/// Implementations must not retry or reinterpret failures; whatever goes wrong
/// is returned as is.
pub trait Reader: Send + Sync {
    fn read<M: ManifestMode>(
        &self,
        options: ReadOptions<M>,
    ) -> impl Future<Output = Result<M::Manifest, ReadError>> + Send;

    fn read_sync<M: ManifestMode>(&self, options: ReadOptions<M>) -> Result<M::Manifest, ReadError>;
}

/// Reads manifests from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl Reader for FsReader {
    async fn read<M: ManifestMode>(&self, options: ReadOptions<M>) -> Result<M::Manifest, ReadError> {
        let path = options.manifest_path()?;
        debug!(path = %path.display(), "reading manifest");
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ReadError::ReadFile {
                path: path.clone(),
                source,
            })?;
        decode::<M>(&content, path)
    }

    fn read_sync<M: ManifestMode>(&self, options: ReadOptions<M>) -> Result<M::Manifest, ReadError> {
        let path = options.manifest_path()?;
        debug!(path = %path.display(), "reading manifest");
        let content = std::fs::read_to_string(&path).map_err(|source| ReadError::ReadFile {
            path: path.clone(),
            source,
        })?;
        decode::<M>(&content, path)
    }
}

fn decode<M: ManifestMode>(content: &str, path: PathBuf) -> Result<M::Manifest, ReadError> {
    parse_package::<M>(content).map_err(|source| ReadError::Manifest { path, source })
}

/// Read `package.json` from `options`' directory.
pub async fn read_package<M: ManifestMode>(options: ReadOptions<M>) -> Result<M::Manifest, ReadError> {
    FsReader.read(options).await
}

/// Blocking form of [`read_package`].
pub fn read_package_sync<M: ManifestMode>(options: ReadOptions<M>) -> Result<M::Manifest, ReadError> {
    FsReader.read_sync(options)
}

/// Directory a located manifest lives in.
pub(crate) fn manifest_dir(path: &Path) -> &Path {
    path.parent().unwrap_or(path)
}
