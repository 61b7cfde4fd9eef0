//! Theme data model.
//!
//! Themes are named groupings of project files and directories curated by
//! an external theme-discovery tool. This crate only reads them: one JSON
//! document per theme plus a `themes.json` index for project-wide
//! enumeration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named logical grouping of project files and directories.
///
/// On-disk shape (camelCase keys):
/// `{files: [...], paths: [...], linkedThemes: [...], sharedFiles: {path: {sharedWith: [...]}}}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    /// Files belonging to this theme (workspace-relative)
    #[serde(default)]
    pub files: Vec<String>,
    /// Directories belonging to this theme (workspace-relative)
    #[serde(default)]
    pub paths: Vec<String>,
    /// Names of themes linked to this one
    #[serde(default)]
    pub linked_themes: Vec<String>,
    /// Files shared with other themes, keyed by path
    #[serde(default)]
    pub shared_files: BTreeMap<String, SharedFile>,
}

/// Sharing record for a file that belongs to more than one theme.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedFile {
    /// Themes this file is shared with
    #[serde(default)]
    pub shared_with: Vec<String>,
}

/// Entry in the project-wide theme index (`themes.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeIndexEntry {
    /// Human-readable description of the theme
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Number of files the theme covers
    #[serde(default)]
    pub file_count: usize,
    /// Last update timestamp (ISO 8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// The project-wide theme index: theme name -> metadata.
pub type ThemeIndex = BTreeMap<String, ThemeIndexEntry>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_deserializes_camel_case() {
        let json = r#"{
            "files": ["src/billing/invoice.py"],
            "paths": ["src/billing"],
            "linkedThemes": ["payments", "ui"],
            "sharedFiles": {
                "src/shared/models.py": { "sharedWith": ["payments"] }
            }
        }"#;

        let theme: Theme = serde_json::from_str(json).unwrap();

        assert_eq!(theme.files, vec!["src/billing/invoice.py"]);
        assert_eq!(theme.linked_themes, vec!["payments", "ui"]);
        assert_eq!(
            theme.shared_files["src/shared/models.py"].shared_with,
            vec!["payments"]
        );
    }

    #[test]
    fn test_theme_missing_fields_default_empty() {
        let theme: Theme = serde_json::from_str("{}").unwrap();

        assert!(theme.files.is_empty());
        assert!(theme.paths.is_empty());
        assert!(theme.linked_themes.is_empty());
        assert!(theme.shared_files.is_empty());
    }

    #[test]
    fn test_theme_serializes_camel_case() {
        let mut theme = Theme::default();
        theme.linked_themes.push("ui".to_string());

        let json = serde_json::to_string(&theme).unwrap();
        assert!(json.contains("\"linkedThemes\":[\"ui\"]"));
        assert!(json.contains("\"sharedFiles\""));
    }

    #[test]
    fn test_theme_index_round_trip() {
        let json = r#"{
            "billing": { "description": "Invoicing and payments", "fileCount": 12 },
            "ui": { "fileCount": 30 }
        }"#;

        let index: ThemeIndex = serde_json::from_str(json).unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(
            index["billing"].description.as_deref(),
            Some("Invoicing and payments")
        );
        assert_eq!(index["ui"].file_count, 30);
        assert!(index["ui"].description.is_none());
    }
}
