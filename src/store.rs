//! Read and write collection snapshots as JSON files.

use crate::error::{Error, Result};
use crate::model::ApiCollection;
use std::fs;
use std::path::Path;
use tracing::info;

/// Load a collection written by [`save`] (or by hand).
pub fn load(path: &Path) -> Result<ApiCollection> {
    let json = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let collection = ApiCollection::from_json(&json)?;
    info!(path = %path.display(), entities = collection.len(), "loaded");
    Ok(collection)
}

/// Write `collection` as pretty JSON, creating parent directories.
pub fn save(path: &Path, collection: &ApiCollection) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let mut json = collection.to_json()?;
    json.push('\n');
    fs::write(path, json).map_err(|e| Error::io(path, e))?;
    info!(path = %path.display(), entities = collection.len(), "saved");
    Ok(())
}
