//! Find the nearest `package.json` by walking up the directory tree, then read it.
//!
//! ```no_run
//! # async fn run() -> Result<(), pkgup::ReadError> {
//! match pkgup::read_package_up(pkgup::Options::new()).await? {
//!     Some(found) => println!("{} in {}", found.package_json.id, found.path.display()),
//!     None => println!("not inside a package"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Passing `Options::new().raw()` returns the file's JSON object as written
//! instead of the normalized form.

pub mod error;
pub mod locate;
pub mod location;
pub mod manifest;
mod options;

pub use error::{ManifestError, ReadError};
pub use locate::{SearchBounds, find_up, find_up_sync};
pub use location::Location;
pub use manifest::{
    FsReader, MANIFEST_FILE, ManifestMode, Normalized, NormalizedPackageJson, PackageJson, Raw,
    ReadOptions, Reader, parse_package, read_package, read_package_sync,
};
pub use options::Options;
pub use url::Url;

use manifest::manifest_dir;
use serde::Serialize;
use std::path::PathBuf;

/// A manifest together with the file it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResult<T> {
    pub package_json: T,
    pub path: PathBuf,
}

pub type RawReadResult = ReadResult<PackageJson>;
pub type NormalizedReadResult = ReadResult<NormalizedPackageJson>;

/// What a search in mode `M` produces: a result, or `None` if no manifest was found
pub type PackageUp<M> = Option<ReadResult<<M as ManifestMode>::Manifest>>;

/// Find and read the nearest `package.json` above `options`' start directory.
pub async fn read_package_up<M: ManifestMode>(options: Options<M>) -> Result<PackageUp<M>, ReadError> {
    read_package_up_with(&FsReader, options).await
}

/// Blocking form of [`read_package_up`].
pub fn read_package_up_sync<M: ManifestMode>(options: Options<M>) -> Result<PackageUp<M>, ReadError> {
    read_package_up_sync_with(&FsReader, options)
}

/// [`read_package_up`] with a caller-supplied reader.
pub async fn read_package_up_with<R: Reader, M: ManifestMode>(
    reader: &R,
    options: Options<M>,
) -> Result<PackageUp<M>, ReadError> {
    let bounds = options.search_bounds()?;
    let Some(path) = find_up(MANIFEST_FILE, &bounds).await else {
        return Ok(None);
    };
    let package_json = reader.read(options.read_options(manifest_dir(&path))).await?;
    Ok(Some(ReadResult { package_json, path }))
}

/// [`read_package_up_sync`] with a caller-supplied reader.
pub fn read_package_up_sync_with<R: Reader, M: ManifestMode>(
    reader: &R,
    options: Options<M>,
) -> Result<PackageUp<M>, ReadError> {
    let bounds = options.search_bounds()?;
    let Some(path) = find_up_sync(MANIFEST_FILE, &bounds) else {
        return Ok(None);
    };
    let package_json = reader.read_sync(options.read_options(manifest_dir(&path)))?;
    Ok(Some(ReadResult { package_json, path }))
}
