//! Options for the upward manifest search

use crate::error::ReadError;
use crate::locate::SearchBounds;
use crate::location::Location;
use crate::manifest::{Normalized, Raw, ReadOptions};
use std::marker::PhantomData;
use std::path::Path;

/// Options for [`read_package_up`](crate::read_package_up)
///
/// `M` selects the decoding ([`Normalized`] unless changed with
/// [`raw`](Options::raw)) and with it the type of manifest returned.
///
/// ```
/// use pkgup::Options;
///
/// let options = Options::new().cwd("packages/app").stop_at("..").raw();
/// ```
#[derive(Debug, Clone)]
pub struct Options<M = Normalized> {
    cwd: Option<Location>,
    stop_at: Option<Location>,
    mode: PhantomData<M>,
}

impl Options<Normalized> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M> Default for Options<M> {
    fn default() -> Self {
        Self {
            cwd: None,
            stop_at: None,
            mode: PhantomData,
        }
    }
}

impl<M> Options<M> {
    /// Directory to start searching from (default: the working directory)
    pub fn cwd(mut self, dir: impl Into<Location>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Last directory to check (default: the filesystem root)
    ///
    /// Relative paths are resolved against the start directory.
    pub fn stop_at(mut self, dir: impl Into<Location>) -> Self {
        self.stop_at = Some(dir.into());
        self
    }

    pub fn raw(self) -> Options<Raw> {
        self.with_mode()
    }

    pub fn normalized(self) -> Options<Normalized> {
        self.with_mode()
    }

    fn with_mode<N>(self) -> Options<N> {
        Options {
            cwd: self.cwd,
            stop_at: self.stop_at,
            mode: PhantomData,
        }
    }

    pub(crate) fn search_bounds(&self) -> Result<SearchBounds, ReadError> {
        SearchBounds::from_locations(self.cwd.as_ref(), self.stop_at.as_ref())
    }

    /// Reader options for a manifest found in `manifest_dir`.
    ///
    /// The caller's settings are copied first; the directory always ends up
    /// being `manifest_dir`.
    pub(crate) fn read_options(&self, manifest_dir: &Path) -> ReadOptions<M> {
        ReadOptions::from(self).cwd(manifest_dir)
    }
}

impl<M> From<&Options<M>> for ReadOptions<M> {
    fn from(options: &Options<M>) -> Self {
        let read_options = ReadOptions::default();
        match &options.cwd {
            Some(cwd) => read_options.cwd(cwd.clone()),
            None => read_options,
        }
    }
}
