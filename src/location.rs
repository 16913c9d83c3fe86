//! Directory locations given as filesystem paths or `file://` URLs
//!
//! Relative paths resolve against a base directory (the process working
//! directory unless stated otherwise). `.` and `..` segments are folded
//! lexically; symlinks are left alone.

use crate::error::ReadError;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// A directory, either as a path or as a `file://` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Path(PathBuf),
    Url(Url),
}

impl Location {
    /// Convert to a filesystem path without resolving it.
    pub fn to_path(&self) -> Result<PathBuf, ReadError> {
        match self {
            Location::Path(path) => Ok(path.clone()),
            Location::Url(url) => {
                if url.scheme() != "file" {
                    return Err(ReadError::InvalidUrl { url: url.clone() });
                }
                url.to_file_path()
                    .map_err(|()| ReadError::InvalidUrl { url: url.clone() })
            }
        }
    }

    /// Resolve to an absolute, lexically normalized path relative to `base`.
    pub fn resolve(&self, base: &Path) -> Result<PathBuf, ReadError> {
        let path = self.to_path()?;
        if path.is_absolute() {
            return Ok(normalize_lexically(&path));
        }
        Ok(normalize_lexically(&base.join(path)))
    }
}

impl From<PathBuf> for Location {
    fn from(path: PathBuf) -> Self {
        Location::Path(path)
    }
}

impl From<&Path> for Location {
    fn from(path: &Path) -> Self {
        Location::Path(path.to_path_buf())
    }
}

impl From<&str> for Location {
    fn from(path: &str) -> Self {
        Location::Path(PathBuf::from(path))
    }
}

impl From<String> for Location {
    fn from(path: String) -> Self {
        Location::Path(PathBuf::from(path))
    }
}

impl From<Url> for Location {
    fn from(url: Url) -> Self {
        Location::Url(url)
    }
}

/// The process working directory.
pub fn current_dir() -> Result<PathBuf, ReadError> {
    std::env::current_dir().map_err(ReadError::CurrentDir)
}

/// Resolve an optional location, falling back to the working directory.
///
/// The working directory is only consulted for a missing or relative location.
pub(crate) fn resolve_or_current(location: Option<&Location>) -> Result<PathBuf, ReadError> {
    match location {
        Some(location) => {
            let path = location.to_path()?;
            if path.is_absolute() {
                Ok(normalize_lexically(&path))
            } else {
                Ok(normalize_lexically(&current_dir()?.join(path)))
            }
        }
        None => current_dir().map(|cwd| normalize_lexically(&cwd)),
    }
}

/// Fold `.` and `..` components without touching the filesystem.
///
/// `..` at the root stays at the root.
pub(crate) fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}
