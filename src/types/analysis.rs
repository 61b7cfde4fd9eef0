//! Analysis types: dependency records, file categories, impact reports,
//! and the file relationship graph.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Source language, dispatched from the file extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Javascript,
    Typescript,
    Java,
    Go,
    Rust,
    /// C, C++, C#, and other brace languages with `#include`-style imports
    Clike,
    #[default]
    Other,
}

impl Language {
    /// Dispatch a file extension to a language.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "py" | "pyi" | "pyw" => Self::Python,
            "js" | "mjs" | "cjs" | "jsx" => Self::Javascript,
            "ts" | "mts" | "cts" | "tsx" => Self::Typescript,
            "java" => Self::Java,
            "go" => Self::Go,
            "rs" => Self::Rust,
            "c" | "h" | "cpp" | "cc" | "cxx" | "hpp" | "hh" | "cs" => Self::Clike,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Python => "python",
            Self::Javascript => "javascript",
            Self::Typescript => "typescript",
            Self::Java => "java",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::Clike => "clike",
            Self::Other => "other",
        };
        write!(f, "{name}")
    }
}

/// Per-file dependency record, derived on demand and never persisted here.
///
/// `dependents` is always empty from single-file analysis; only
/// project-wide relationship mapping populates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyRecord {
    /// Workspace-relative path of the analyzed file
    pub path: String,
    /// Detected language
    pub language: Language,
    /// Import-like tokens pulled from the file text
    pub imports: Vec<String>,
    /// Export/definition-like tokens pulled from the file text
    pub exports: Vec<String>,
    /// Imports resolved to files that exist under the workspace
    pub dependencies: Vec<String>,
    /// Files depending on this one (requires project-wide aggregation)
    pub dependents: Vec<String>,
    /// When the analysis ran (ISO 8601)
    pub analyzed_at: String,
}

impl DependencyRecord {
    /// The empty-but-well-formed record returned on any read failure.
    pub fn empty(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            analyzed_at: chrono::Utc::now().to_rfc3339(),
            ..Self::default()
        }
    }
}

/// The six discovery buckets, in match-priority order.
///
/// Predicates are checked in this order and are not mutually exclusive; a
/// file matching several heuristics lands in the earliest bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Tests,
    Documentation,
    ConfigFiles,
    BuildArtifacts,
    DataFiles,
    SourceFiles,
}

/// Discovery output: one sorted list of relative paths per category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategorizedFiles {
    pub tests: Vec<String>,
    pub documentation: Vec<String>,
    pub config_files: Vec<String>,
    pub build_artifacts: Vec<String>,
    pub data_files: Vec<String>,
    pub source_files: Vec<String>,
}

impl CategorizedFiles {
    /// Push a path into its category bucket.
    pub fn push(&mut self, category: FileCategory, path: String) {
        match category {
            FileCategory::Tests => self.tests.push(path),
            FileCategory::Documentation => self.documentation.push(path),
            FileCategory::ConfigFiles => self.config_files.push(path),
            FileCategory::BuildArtifacts => self.build_artifacts.push(path),
            FileCategory::DataFiles => self.data_files.push(path),
            FileCategory::SourceFiles => self.source_files.push(path),
        }
    }

    /// Sort every bucket for deterministic output.
    pub fn sort(&mut self) {
        self.tests.sort();
        self.documentation.sort();
        self.config_files.sort();
        self.build_artifacts.sort();
        self.data_files.sort();
        self.source_files.sort();
    }

    /// Total number of categorized files.
    pub fn len(&self) -> usize {
        self.tests.len()
            + self.documentation.len()
            + self.config_files.len()
            + self.build_artifacts.len()
            + self.data_files.len()
            + self.source_files.len()
    }

    /// Whether discovery found nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over every discovered path regardless of category.
    pub fn iter_all(&self) -> impl Iterator<Item = &String> {
        self.tests
            .iter()
            .chain(&self.documentation)
            .chain(&self.config_files)
            .chain(&self.build_artifacts)
            .chain(&self.data_files)
            .chain(&self.source_files)
    }
}

/// Coarse low/medium/high heuristic for how disruptive a change is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

impl ImpactLevel {
    /// Threshold an additive score into a level: low <3, medium 3-5, high >=6.
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 6 => Self::High,
            s if s >= 3 => Self::Medium,
            _ => Self::Low,
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Impact assessment for a single file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactReport {
    /// Workspace-relative path of the assessed file
    pub file: String,
    /// Recent modification count (from the file-metadata collaborator)
    pub recent_modifications: u32,
    /// Number of files depending on this one
    pub dependent_count: usize,
    /// Files this one depends on
    pub dependencies: Vec<String>,
    /// Themes whose file lists include this file
    pub affected_themes: Vec<String>,
    /// The raw additive score behind the level
    pub score: i32,
    /// Thresholded impact level
    pub level: ImpactLevel,
}

/// A file with an unusually high number of reverse-dependents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticalFile {
    /// Workspace-relative path
    pub file: String,
    /// Direct reverse-dependent count
    pub dependent_count: usize,
    /// 2x direct + 0.5x transitive dependents, plus naming bonuses
    pub criticality: f64,
}

/// A connected component of the undirected dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileCluster {
    /// Member files, sorted
    pub files: Vec<String>,
    /// Internal edges / (internal + external) edges
    pub cohesion: f64,
    /// Naive pattern label: common path prefix or dominant extension
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Aggregate statistics over the relationship graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub file_count: usize,
    pub edge_count: usize,
    pub cycle_count: usize,
    pub orphan_count: usize,
    pub average_out_degree: f64,
}

/// The project-wide file relationship graph, rebuilt wholesale per call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipMap {
    /// file -> files it depends on
    pub dependency_graph: BTreeMap<String, Vec<String>>,
    /// file -> files depending on it
    pub reverse_dependencies: BTreeMap<String, Vec<String>>,
    /// Cycles, each rotated to start at its lexicographically smallest member
    pub circular_dependencies: Vec<Vec<String>>,
    /// Files with zero in- and zero out-edges
    pub orphaned_files: Vec<String>,
    /// Files with at least five reverse-dependents, ranked by criticality
    pub critical_files: Vec<CriticalFile>,
    /// Connected components of the undirected graph
    pub file_clusters: Vec<FileCluster>,
    pub statistics: GraphStatistics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_extension("py"), Language::Python);
        assert_eq!(Language::from_extension("tsx"), Language::Typescript);
        assert_eq!(Language::from_extension("jsx"), Language::Javascript);
        assert_eq!(Language::from_extension("rs"), Language::Rust);
        assert_eq!(Language::from_extension("hpp"), Language::Clike);
        assert_eq!(Language::from_extension("rb"), Language::Other);
    }

    #[test]
    fn test_language_extension_case_insensitive() {
        assert_eq!(Language::from_extension("PY"), Language::Python);
        assert_eq!(Language::from_extension("Go"), Language::Go);
    }

    #[test]
    fn test_empty_dependency_record_is_well_formed() {
        let record = DependencyRecord::empty("src/missing.py");

        assert_eq!(record.path, "src/missing.py");
        assert_eq!(record.language, Language::Other);
        assert!(record.imports.is_empty());
        assert!(record.exports.is_empty());
        assert!(record.dependencies.is_empty());
        assert!(record.dependents.is_empty());
        assert!(!record.analyzed_at.is_empty());
    }

    #[test]
    fn test_impact_level_thresholds() {
        assert_eq!(ImpactLevel::from_score(0), ImpactLevel::Low);
        assert_eq!(ImpactLevel::from_score(2), ImpactLevel::Low);
        assert_eq!(ImpactLevel::from_score(3), ImpactLevel::Medium);
        assert_eq!(ImpactLevel::from_score(5), ImpactLevel::Medium);
        assert_eq!(ImpactLevel::from_score(6), ImpactLevel::High);
        assert_eq!(ImpactLevel::from_score(10), ImpactLevel::High);
    }

    #[test]
    fn test_categorized_files_push_and_sort() {
        let mut files = CategorizedFiles::default();
        files.push(FileCategory::SourceFiles, "src/b.rs".to_string());
        files.push(FileCategory::SourceFiles, "src/a.rs".to_string());
        files.push(FileCategory::Tests, "tests/test_a.rs".to_string());
        files.sort();

        assert_eq!(files.source_files, vec!["src/a.rs", "src/b.rs"]);
        assert_eq!(files.len(), 3);
        assert_eq!(files.iter_all().count(), 3);
    }

    #[test]
    fn test_file_category_serializes_snake_case() {
        let json = serde_json::to_string(&FileCategory::ConfigFiles).unwrap();
        assert_eq!(json, "\"config_files\"");
    }

    #[test]
    fn test_relationship_map_default_is_empty() {
        let map = RelationshipMap::default();
        assert!(map.dependency_graph.is_empty());
        assert!(map.circular_dependencies.is_empty());
        assert_eq!(map.statistics.file_count, 0);
    }
}
