//! Explicit cache of loaded glyph tables.
//!
//! Renders share one `Arc<GlyphLibrary>` per table file. A reload builds a new
//! library and swaps the `Arc`; renders already holding the old one keep it
//! until they finish.

use crate::library::{GlyphGeometry, GlyphLibrary, GlyphTableError};
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Loaded libraries keyed by table path.
#[derive(Debug)]
pub struct LibraryCache {
    geometry: GlyphGeometry,
    entries: RwLock<HashMap<PathBuf, Arc<GlyphLibrary>>>,
}

impl LibraryCache {
    pub fn new(geometry: GlyphGeometry) -> Self {
        Self {
            geometry,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn geometry(&self) -> GlyphGeometry {
        self.geometry
    }

    /// Cached library for `path`, loading it on first use.
    pub fn get_or_load(&self, path: impl AsRef<Path>) -> Result<Arc<GlyphLibrary>, GlyphTableError> {
        let path = path.as_ref();
        if let Some(lib) = self.get(path) {
            debug!("glyph cache hit: {}", path.display());
            return Ok(lib);
        }
        let lib = Arc::new(GlyphLibrary::load_json(path, self.geometry)?);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        // Another caller may have raced us; keep whichever landed first.
        Ok(entries
            .entry(path.to_path_buf())
            .or_insert(lib)
            .clone())
    }

    /// Load `path` again and replace the cached reference.
    pub fn reload(&self, path: impl AsRef<Path>) -> Result<Arc<GlyphLibrary>, GlyphTableError> {
        let path = path.as_ref();
        let lib = Arc::new(GlyphLibrary::load_json(path, self.geometry)?);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(path.to_path_buf(), Arc::clone(&lib));
        debug!("glyph cache reloaded: {}", path.display());
        Ok(lib)
    }

    /// Already-loaded library, without touching the filesystem.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Arc<GlyphLibrary>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(path.as_ref()).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LibraryCache {
    fn default() -> Self {
        Self::new(GlyphGeometry::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::GlyphKey;
    use std::fs;

    const GEOMETRY: GlyphGeometry = GlyphGeometry {
        rows: 1,
        cols: 1,
        bins: 2,
    };

    #[test]
    fn caches_by_path_and_swaps_on_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("chars.json");
        fs::write(&path, r#"{" ": [[[0.0, 0.0]]]}"#).expect("write table");

        let cache = LibraryCache::new(GEOMETRY);
        assert!(cache.is_empty());
        let first = cache.get_or_load(&path).expect("load");
        let again = cache.get_or_load(&path).expect("cached");
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(cache.len(), 1);

        fs::write(&path, r##"{" ": [[[0.0, 0.0]]], "#": [[[0.5, 0.5]]]}"##).expect("rewrite");
        let reloaded = cache.reload(&path).expect("reload");
        assert!(!Arc::ptr_eq(&first, &reloaded));
        assert_eq!(first.len(), 1, "old holders keep their library");
        assert!(reloaded.contains(&GlyphKey::Single('#')));
        let current = cache.get(&path).expect("cached");
        assert!(Arc::ptr_eq(&current, &reloaded));
    }

    #[test]
    fn missing_file_is_io_error() {
        let cache = LibraryCache::new(GEOMETRY);
        let err = cache.get_or_load("/nonexistent/chars.json").unwrap_err();
        assert!(matches!(err, GlyphTableError::Io(_)));
        assert!(cache.is_empty());
    }
}
