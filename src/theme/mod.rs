//! JSON-backed theme store.
//!
//! One document per theme (`<name>.json`) plus a `themes.json` index for
//! project-wide enumeration, all under the configured themes directory.
//! Themes are curated by an external discovery tool and read-only here.
//!
//! Loaded themes are cached in an explicit per-store map rather than any
//! process-wide state; `invalidate` drops a stale entry after the external
//! tool rewrites a document.

use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, error, warn};

use crate::error::{Error, Result};
use crate::types::{Theme, ThemeIndex};

/// Name of the project-wide index document.
const INDEX_FILE: &str = "themes.json";

/// Read-only store over the themes directory.
#[derive(Debug)]
pub struct ThemeStore {
    themes_dir: PathBuf,
    cache: DashMap<String, Arc<Theme>>,
}

impl ThemeStore {
    /// Create a store over the given themes directory. The directory may
    /// not exist yet; loads will simply find nothing.
    pub fn new(themes_dir: impl Into<PathBuf>) -> Self {
        Self {
            themes_dir: themes_dir.into(),
            cache: DashMap::new(),
        }
    }

    /// Load a theme, failing loudly when it cannot be produced.
    ///
    /// An absent document raises [`Error::ThemeNotFound`]; a malformed one
    /// is error-logged and then treated as absent.
    pub async fn load(&self, name: &str) -> Result<Arc<Theme>> {
        if let Some(cached) = self.cache.get(name) {
            return Ok(cached.clone());
        }

        let path = self.themes_dir.join(format!("{name}.json"));
        let content = match fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::theme_not_found(name));
            }
            Err(e) => {
                warn!("Cannot read theme {:?}: {}", path, e);
                return Err(Error::theme_not_found(name));
            }
        };

        let theme: Theme = match serde_json::from_str(&content) {
            Ok(t) => t,
            Err(e) => {
                error!("Malformed theme document {:?}: {}", path, e);
                return Err(Error::theme_not_found(name));
            }
        };

        let theme = Arc::new(theme);
        self.cache.insert(name.to_string(), theme.clone());
        Ok(theme)
    }

    /// Load a secondary theme, skipping quietly when it cannot be
    /// produced. Linked and project-wide expansion use this so one bad
    /// document never fails a whole context load.
    pub async fn try_load(&self, name: &str) -> Option<Arc<Theme>> {
        match self.load(name).await {
            Ok(theme) => Some(theme),
            Err(e) => {
                debug!("Skipping theme {}: {}", name, e);
                None
            }
        }
    }

    /// The project-wide theme index. Missing or malformed indexes degrade
    /// to an empty map.
    pub async fn index(&self) -> ThemeIndex {
        let path = self.themes_dir.join(INDEX_FILE);
        let content = match fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) => {
                debug!("No theme index at {:?}: {}", path, e);
                return ThemeIndex::new();
            }
        };
        match serde_json::from_str(&content) {
            Ok(index) => index,
            Err(e) => {
                error!("Malformed theme index {:?}: {}", path, e);
                ThemeIndex::new()
            }
        }
    }

    /// Every theme name the store knows about: index entries first, then
    /// any loose `<name>.json` documents the index has not caught up with.
    pub async fn theme_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.index().await.into_keys().collect();

        if let Ok(mut entries) = fs::read_dir(&self.themes_dir).await {
            while let Ok(Some(entry)) = entries.next_entry().await {
                let file_name = entry.file_name();
                let file_name = file_name.to_string_lossy();
                if let Some(stem) = file_name.strip_suffix(".json") {
                    if file_name != INDEX_FILE && !names.iter().any(|n| n == stem) {
                        names.push(stem.to_string());
                    }
                }
            }
        }

        names.sort();
        names
    }

    /// Drop a cached theme so the next load re-reads the document.
    pub fn invalidate(&self, name: &str) {
        self.cache.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::TempDir;

    fn themes_dir_with(docs: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in docs {
            std_fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn test_load_parses_theme_document() {
        let dir = themes_dir_with(&[(
            "billing.json",
            r#"{"files": ["src/billing/invoice.py"], "paths": ["src/billing"], "linkedThemes": ["ui"]}"#,
        )]);
        let store = ThemeStore::new(dir.path());

        let theme = store.load("billing").await.unwrap();

        assert_eq!(theme.files, vec!["src/billing/invoice.py"]);
        assert_eq!(theme.linked_themes, vec!["ui"]);
    }

    #[tokio::test]
    async fn test_load_missing_theme_is_loud() {
        let dir = themes_dir_with(&[]);
        let store = ThemeStore::new(dir.path());

        let err = store.load("ghost").await.unwrap_err();
        assert!(matches!(err, Error::ThemeNotFound(name) if name == "ghost"));
    }

    #[tokio::test]
    async fn test_malformed_theme_treated_as_absent() {
        let dir = themes_dir_with(&[("broken.json", "{not valid json")]);
        let store = ThemeStore::new(dir.path());

        assert!(store.load("broken").await.is_err());
        assert!(store.try_load("broken").await.is_none());
    }

    #[tokio::test]
    async fn test_try_load_skips_missing() {
        let dir = themes_dir_with(&[]);
        let store = ThemeStore::new(dir.path());

        assert!(store.try_load("ghost").await.is_none());
    }

    #[tokio::test]
    async fn test_cache_serves_repeat_loads_and_invalidate_drops() {
        let dir = themes_dir_with(&[("billing.json", r#"{"files": ["a.py"]}"#)]);
        let store = ThemeStore::new(dir.path());

        let first = store.load("billing").await.unwrap();
        assert_eq!(first.files, vec!["a.py"]);

        // Rewrite the document; the cache still serves the old value
        std_fs::write(
            dir.path().join("billing.json"),
            r#"{"files": ["b.py"]}"#,
        )
        .unwrap();
        let cached = store.load("billing").await.unwrap();
        assert_eq!(cached.files, vec!["a.py"]);

        store.invalidate("billing");
        let reloaded = store.load("billing").await.unwrap();
        assert_eq!(reloaded.files, vec!["b.py"]);
    }

    #[tokio::test]
    async fn test_index_missing_degrades_to_empty() {
        let dir = themes_dir_with(&[]);
        let store = ThemeStore::new(dir.path());

        assert!(store.index().await.is_empty());
    }

    #[tokio::test]
    async fn test_theme_names_merges_index_and_documents() {
        let dir = themes_dir_with(&[
            ("themes.json", r#"{"billing": {"fileCount": 3}}"#),
            ("billing.json", "{}"),
            ("ui.json", "{}"),
        ]);
        let store = ThemeStore::new(dir.path());

        let names = store.theme_names().await;
        assert_eq!(names, vec!["billing", "ui"]);
    }
}
