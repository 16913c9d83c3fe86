//! Upward file discovery
//!
//! Walks from a start directory toward the filesystem root, checking each
//! level for a regular file with the given name. The walk ends at the first
//! match, after the stop boundary has been checked, or after the root.

use crate::error::ReadError;
use crate::location::{Location, normalize_lexically, resolve_or_current};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Where an upward search starts and where it gives up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBounds {
    start: PathBuf,
    stop_at: Option<PathBuf>,
}

impl SearchBounds {
    /// Search from `start` up to the filesystem root.
    ///
    /// `start` should be absolute; it is normalized lexically but not resolved
    /// against the working directory.
    pub fn new(start: impl Into<PathBuf>) -> Self {
        Self {
            start: normalize_lexically(&start.into()),
            stop_at: None,
        }
    }

    /// Resolve bounds from caller-facing locations.
    ///
    /// A missing `cwd` means the process working directory. A relative
    /// `stop_at` is resolved against the start directory.
    pub fn from_locations(
        cwd: Option<&Location>,
        stop_at: Option<&Location>,
    ) -> Result<Self, ReadError> {
        let start = resolve_or_current(cwd)?;
        let stop_at = stop_at.map(|location| location.resolve(&start)).transpose()?;
        Ok(Self { start, stop_at })
    }

    /// Stop after checking `dir`, even if the root has not been reached.
    pub fn stop_at(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.stop_at = Some(normalize_lexically(&self.start.join(dir)));
        self
    }

    pub fn start(&self) -> &Path {
        &self.start
    }

    pub fn stop(&self) -> Option<&Path> {
        self.stop_at.as_deref()
    }

    /// Directories to check, nearest first.
    fn levels(&self) -> impl Iterator<Item = &Path> {
        let stop = self.stop_at.as_deref();
        let mut reached_stop = false;
        self.start.ancestors().take_while(move |dir| {
            if reached_stop {
                return false;
            }
            reached_stop = Some(*dir) == stop;
            true
        })
    }
}

/// Find the nearest file called `name`, suspending on each probe.
pub async fn find_up(name: &str, bounds: &SearchBounds) -> Option<PathBuf> {
    for dir in bounds.levels() {
        let candidate = dir.join(name);
        let is_file = tokio::fs::metadata(&candidate)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if let Some(found) = check(candidate, is_file) {
            return Some(found);
        }
    }
    not_found(name, bounds)
}

/// Find the nearest file called `name`, blocking on each probe.
pub fn find_up_sync(name: &str, bounds: &SearchBounds) -> Option<PathBuf> {
    for dir in bounds.levels() {
        let candidate = dir.join(name);
        let is_file = std::fs::metadata(&candidate)
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if let Some(found) = check(candidate, is_file) {
            return Some(found);
        }
    }
    not_found(name, bounds)
}

fn check(candidate: PathBuf, is_file: bool) -> Option<PathBuf> {
    trace!(path = %candidate.display(), found = is_file, "probe");
    if is_file {
        debug!(path = %candidate.display(), "found manifest");
        Some(candidate)
    } else {
        None
    }
}

fn not_found(name: &str, bounds: &SearchBounds) -> Option<PathBuf> {
    debug!(
        name,
        start = %bounds.start.display(),
        "no match between start directory and search boundary"
    );
    None
}
