use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::symbol::{ClassHeader, ClassSymbol};

/// Sidecar file holding the class headers of a source tree, written next to
/// the tree's root so a later session can skip the discovery walk.
pub const CACHE_FILE: &str = "classes_cache.json";

/// One cached class header. Field names stay camelCase on disk so caches
/// written by earlier tool versions keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedClass {
    pub name: String,
    pub parent_class_name: String,
    pub description: String,
    pub file_name: String,
}

impl CachedClass {
    pub fn from_class(class: &ClassSymbol) -> Self {
        Self {
            name: class.name.clone(),
            parent_class_name: class.parent_name.clone(),
            description: class.documentation.clone(),
            file_name: class.file.to_string_lossy().into_owned(),
        }
    }

    pub fn into_header(self) -> ClassHeader {
        ClassHeader {
            name: self.name,
            parent_name: self.parent_class_name.to_lowercase(),
            documentation: self.description,
            file: PathBuf::from(self.file_name),
        }
    }
}

pub fn cache_path(source_root: &Path) -> PathBuf {
    source_root.join(CACHE_FILE)
}

/// Load the cached headers of a source tree. `Ok(None)` when no cache has
/// been written yet; a cache that exists but does not parse is an error, so
/// corruption surfaces instead of silently degrading to a full walk.
///
/// The cache is trusted as-is: headers of files edited since the save are
/// stale until the file is saved again in-session or the cache is deleted.
pub fn load(source_root: &Path) -> Result<Option<Vec<CachedClass>>> {
    let path = cache_path(source_root);
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path)
        .with_context(|| format!("failed to read class cache {}", path.display()))?;
    let classes: Vec<CachedClass> = serde_json::from_str(&text)
        .with_context(|| format!("malformed class cache {}", path.display()))?;
    tracing::debug!(classes = classes.len(), "class cache loaded");
    Ok(Some(classes))
}

/// Write the headers of every on-disk class. Bundled built-ins are skipped;
/// they are re-registered from their embedded sources each session.
pub fn save<'a>(
    source_root: &Path,
    classes: impl Iterator<Item = &'a ClassSymbol>,
) -> Result<()> {
    let cached: Vec<CachedClass> = classes
        .filter(|class| class.builtin_source.is_none())
        .map(CachedClass::from_class)
        .collect();
    let path = cache_path(source_root);
    let text = serde_json::to_string_pretty(&cached).context("failed to serialize class cache")?;
    fs::write(&path, text)
        .with_context(|| format!("failed to write class cache {}", path.display()))?;
    tracing::debug!(classes = cached.len(), path = %path.display(), "class cache saved");
    Ok(())
}
