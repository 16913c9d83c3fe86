//! `package.json` reading
//!
//! Handles:
//! - Loading the file from a directory (async and blocking)
//! - JSON decoding into a raw object
//! - Optional normalization of the well-known fields

mod mode;
mod normalize;
mod package_json;
mod reader;

pub use mode::{ManifestMode, Normalized, Raw, parse_package};
pub use normalize::MISSING_README;
pub use package_json::{Bugs, NormalizedPackageJson, PackageJson, Person, Repository};
pub use reader::{FsReader, MANIFEST_FILE, ReadOptions, Reader, read_package, read_package_sync};

pub(crate) use reader::manifest_dir;
