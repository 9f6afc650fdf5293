//! Source adapters: dispatch by file extension.

pub mod lua;
pub mod normalize;
pub mod source;
pub mod wiki;

use crate::error::{Error, Result};
use crate::model::ApiCollection;
use std::path::Path;

/// Extensions [`parse_file`] accepts.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["lua", "html", "htm"];

/// Parse a source file into a collection whose entities are valid at `release`.
pub fn parse_file(path: &Path, content: &str, release: &semver::Version) -> Result<ApiCollection> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("lua") => source::parse(content, release),
        Some("html" | "htm") => wiki::parse(content, release),
        _ => Err(Error::UnsupportedFile(path.to_path_buf())),
    }
}

/// True when [`parse_file`] knows the extension of `path`.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e))
}
