use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};

/// Load a persisted store. A missing file is an empty store.
pub(crate) fn load<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read_to_string(path)?;
    let items = serde_json::from_str(&data)?;
    Ok(items)
}

pub(crate) fn save<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string(items)?;
    fs::write(path, data)?;
    Ok(())
}
