//! Categorized file discovery.
//!
//! One filesystem walk per call. Every file first passes exclude-glob
//! rejection (the defaults are always appended to caller-supplied
//! excludes), then include-glob acceptance (default accept-all), and is
//! finally assigned to exactly one of six buckets by ordered heuristic
//! predicates: tests, documentation, config, build, data, source. The
//! ordering is policy - a file matching several predicates lands in the
//! earliest bucket.

use glob::Pattern;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::DEFAULT_EXCLUDE_GLOBS;
use crate::error::{Error, Result};
use crate::types::{CategorizedFiles, FileCategory};

/// Walk `root` and categorize every surviving file.
///
/// Paths in the result are workspace-relative with `/` separators and each
/// bucket is sorted for determinism. Invalid glob patterns are the one
/// loud failure here; unreadable directory entries are skipped.
pub fn discover(root: &Path, include: &[String], exclude: &[String]) -> Result<CategorizedFiles> {
    let include = compile_globs(include)?;
    let mut exclude_patterns: Vec<String> = exclude.to_vec();
    exclude_patterns.extend(DEFAULT_EXCLUDE_GLOBS.iter().map(|s| s.to_string()));
    let exclude = compile_globs(&exclude_patterns)?;

    let mut files = CategorizedFiles::default();

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = match entry.path().strip_prefix(root) {
            Ok(r) => r.to_string_lossy().replace('\\', "/"),
            Err(_) => continue,
        };

        if matches_any(&exclude, &relative) {
            continue;
        }
        if !include.is_empty() && !matches_any(&include, &relative) {
            continue;
        }

        files.push(categorize(&relative), relative);
    }

    files.sort();
    debug!("Discovered {} files under {:?}", files.len(), root);
    Ok(files)
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).map_err(|e| Error::Glob(format!("{p}: {e}"))))
        .collect()
}

/// A pattern hits when it matches the relative path or, for basename-style
/// patterns like `*.pyc`, the file name alone.
fn matches_any(patterns: &[Pattern], relative: &str) -> bool {
    let name = relative.rsplit('/').next().unwrap_or(relative);
    patterns
        .iter()
        .any(|p| p.matches(relative) || p.matches(name))
}

/// Ordered categorization: first matching predicate wins.
pub fn categorize(relative: &str) -> FileCategory {
    if is_test(relative) {
        FileCategory::Tests
    } else if is_documentation(relative) {
        FileCategory::Documentation
    } else if is_config(relative) {
        FileCategory::ConfigFiles
    } else if is_build(relative) {
        FileCategory::BuildArtifacts
    } else if is_data(relative) {
        FileCategory::DataFiles
    } else {
        FileCategory::SourceFiles
    }
}

fn name_of(relative: &str) -> &str {
    relative.rsplit('/').next().unwrap_or(relative)
}

fn extension_of(relative: &str) -> String {
    Path::new(relative)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn has_segment(relative: &str, segment: &str) -> bool {
    relative.split('/').any(|s| s == segment)
}

fn is_test(relative: &str) -> bool {
    let name = name_of(relative).to_lowercase();
    has_segment(relative, "tests")
        || has_segment(relative, "test")
        || has_segment(relative, "__tests__")
        || name.starts_with("test_")
        || name.contains("_test.")
        || name.contains(".test.")
        || name.contains(".spec.")
}

fn is_documentation(relative: &str) -> bool {
    let name = name_of(relative).to_uppercase();
    let ext = extension_of(relative);
    has_segment(relative, "docs")
        || has_segment(relative, "doc")
        || matches!(ext.as_str(), "md" | "rst" | "adoc" | "txt")
        || name.starts_with("README")
        || name.starts_with("CHANGELOG")
        || name.starts_with("LICENSE")
}

fn is_config(relative: &str) -> bool {
    let name = name_of(relative);
    let ext = extension_of(relative);
    matches!(
        ext.as_str(),
        "json" | "yaml" | "yml" | "toml" | "ini" | "cfg" | "conf" | "properties"
    ) || name.starts_with(".env")
        || name == ".gitignore"
        || name == ".editorconfig"
}

fn is_build(relative: &str) -> bool {
    let name = name_of(relative);
    matches!(
        name,
        "Makefile"
            | "makefile"
            | "CMakeLists.txt"
            | "Dockerfile"
            | "Containerfile"
            | "Jenkinsfile"
            | "build.gradle"
            | "pom.xml"
            | "setup.py"
    ) || extension_of(relative) == "gradle"
}

fn is_data(relative: &str) -> bool {
    matches!(
        extension_of(relative).as_str(),
        "csv" | "tsv" | "sql" | "db" | "sqlite" | "sqlite3" | "jsonl" | "parquet" | "xml"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, path: &str) {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, "x").unwrap();
    }

    #[test]
    fn test_mixed_tree_categorization() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "tests/test_foo.py");
        touch(&dir, "README.md");
        touch(&dir, "config.json");
        touch(&dir, "src/main.py");

        let files = discover(dir.path(), &[], &[]).unwrap();

        assert_eq!(files.tests, vec!["tests/test_foo.py"]);
        assert_eq!(files.documentation, vec!["README.md"]);
        assert_eq!(files.config_files, vec!["config.json"]);
        assert_eq!(files.source_files, vec!["src/main.py"]);
    }

    #[test]
    fn test_priority_order_tests_before_source() {
        // A .py file under tests/ matches both the test and source
        // heuristics; the earlier bucket wins.
        assert_eq!(categorize("tests/helpers.py"), FileCategory::Tests);
        assert_eq!(categorize("src/api.spec.ts"), FileCategory::Tests);
        // A markdown file under tests/ is still a test by ordering
        assert_eq!(categorize("tests/README.md"), FileCategory::Tests);
    }

    #[test]
    fn test_priority_order_docs_before_config() {
        // .txt wins documentation before any config/name heuristics run
        assert_eq!(categorize("requirements.txt"), FileCategory::Documentation);
        assert_eq!(categorize("docs/setup.json"), FileCategory::Documentation);
    }

    #[test]
    fn test_build_and_data_buckets() {
        assert_eq!(categorize("Dockerfile"), FileCategory::BuildArtifacts);
        assert_eq!(categorize("setup.py"), FileCategory::BuildArtifacts);
        assert_eq!(categorize("data/users.csv"), FileCategory::DataFiles);
        assert_eq!(categorize("schema.sql"), FileCategory::DataFiles);
        assert_eq!(categorize("src/lib.rs"), FileCategory::SourceFiles);
    }

    #[test]
    fn test_default_excludes_always_applied() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "src/main.rs");
        touch(&dir, ".git/HEAD");
        touch(&dir, "node_modules/pkg/index.js");
        touch(&dir, "target/debug/app.d");
        touch(&dir, ".project/themes/billing.json");

        let files = discover(dir.path(), &[], &[]).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files.source_files, vec!["src/main.rs"]);
    }

    #[test]
    fn test_include_globs_filter() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "src/main.rs");
        touch(&dir, "src/app.py");

        let files = discover(dir.path(), &["**/*.py".to_string()], &[]).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files.source_files, vec!["src/app.py"]);
    }

    #[test]
    fn test_caller_excludes_extend_defaults() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "src/main.rs");
        touch(&dir, "src/generated.rs");

        let files = discover(dir.path(), &[], &["**/generated.rs".to_string()]).unwrap();

        assert_eq!(files.source_files, vec!["src/main.rs"]);
    }

    #[test]
    fn test_basename_glob_matches_nested_file() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "src/cache.pyc");
        touch(&dir, "src/app.py");

        let files = discover(dir.path(), &[], &[]).unwrap();

        // *.pyc is a default exclude and must hit nested paths too
        assert_eq!(files.source_files, vec!["src/app.py"]);
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_invalid_glob_is_loud() {
        let dir = TempDir::new().unwrap();
        let err = discover(dir.path(), &["[bad".to_string()], &[]).unwrap_err();
        assert!(matches!(err, Error::Glob(_)));
    }

    #[test]
    fn test_results_are_sorted() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "src/zeta.rs");
        touch(&dir, "src/alpha.rs");
        touch(&dir, "src/mid.rs");

        let files = discover(dir.path(), &[], &[]).unwrap();

        assert_eq!(
            files.source_files,
            vec!["src/alpha.rs", "src/mid.rs", "src/zeta.rs"]
        );
    }
}
