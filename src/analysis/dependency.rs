//! Regex-heuristic extraction of imports and exports from file content.
//!
//! Dispatches on file extension to one of seven extractors (Python, JS,
//! TS, Java, Go, Rust, generic C-like, fallback-empty). Extraction is
//! best-effort: fixed regular expressions over raw text, no AST parsing,
//! so identifiers inside comments or strings may over-match and unusual
//! syntax may under-match. Read failures are absorbed into an
//! empty-but-well-formed record, never raised.

use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;
use tokio::fs;
use tracing::debug;

use crate::types::{DependencyRecord, Language};

static PYTHON_IMPORT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?m)^\s*import\s+([\w\.]+)").unwrap(),
        Regex::new(r"(?m)^\s*from\s+([\w\.]+)\s+import").unwrap(),
    ]
});

static PYTHON_EXPORT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?m)^\s*def\s+(\w+)").unwrap(),
        Regex::new(r"(?m)^\s*class\s+(\w+)").unwrap(),
        Regex::new(r"(?m)^([A-Z][A-Z0-9_]+)\s*=").unwrap(),
    ]
});

static JS_IMPORT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r#"import\s+[^;]*?from\s+['"]([^'"]+)['"]"#).unwrap(),
        Regex::new(r#"import\s*\(\s*['"]([^'"]+)['"]"#).unwrap(),
        Regex::new(r#"require\s*\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap(),
        Regex::new(r#"export\s+[^;]*?from\s+['"]([^'"]+)['"]"#).unwrap(),
    ]
});

static JS_EXPORT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"export\s+(?:default\s+)?(?:async\s+)?(?:function|class)\s+(\w+)").unwrap(),
        Regex::new(r"export\s+(?:const|let|var)\s+(\w+)").unwrap(),
        Regex::new(r"module\.exports\.(\w+)").unwrap(),
    ]
});

static JAVA_IMPORT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![Regex::new(r"(?m)^\s*import\s+(?:static\s+)?([\w\.]+?)(?:\.\*)?\s*;").unwrap()]
});

static JAVA_EXPORT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?:public|protected)\s+(?:abstract\s+)?(?:final\s+)?(?:class|interface|enum|record)\s+(\w+)")
            .unwrap(),
    ]
});

static GO_IMPORT_SINGLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^\s*import\s+(?:\w+\s+)?"([^"]+)""#).unwrap());
static GO_IMPORT_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)import\s*\((.*?)\)").unwrap());
static GO_QUOTED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]+)""#).unwrap());

static GO_EXPORT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?m)^func\s+(?:\([^)]*\)\s*)?([A-Z]\w*)\s*\(").unwrap(),
        Regex::new(r"(?m)^type\s+([A-Z]\w*)\s+").unwrap(),
        Regex::new(r"(?m)^(?:var|const)\s+([A-Z]\w*)").unwrap(),
    ]
});

static RUST_IMPORT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?m)^\s*use\s+([\w:]+)").unwrap(),
        Regex::new(r"(?m)^\s*(?:pub\s+)?mod\s+(\w+)\s*;").unwrap(),
        Regex::new(r"extern\s+crate\s+(\w+)").unwrap(),
    ]
});

static RUST_EXPORT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?m)^\s*pub\s+(?:async\s+)?(?:unsafe\s+)?fn\s+(\w+)").unwrap(),
        Regex::new(r"(?m)^\s*pub\s+(?:struct|enum|trait|type|mod|const|static)\s+(\w+)").unwrap(),
    ]
});

static CLIKE_IMPORT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r#"#include\s*[<"]([^>"]+)[>"]"#).unwrap(),
        Regex::new(r"(?m)^\s*using\s+([\w\.]+)\s*;").unwrap(),
    ]
});

static CLIKE_EXPORT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?:class|struct)\s+(\w+)").unwrap(),
        Regex::new(r"typedef\s+[^;]*?(\w+)\s*;").unwrap(),
    ]
});

/// Analyze a single file's imports and exports.
///
/// `file_path` is workspace-relative. Missing files and decode failures
/// produce an empty record rather than an error; `dependents` is always
/// empty here (project-wide aggregation fills it in).
pub async fn analyze(workspace: &Path, file_path: &str) -> DependencyRecord {
    let absolute = workspace.join(file_path);
    let content = match fs::read_to_string(&absolute).await {
        Ok(c) => c,
        Err(e) => {
            debug!("Cannot read {}: {}", file_path, e);
            return DependencyRecord::empty(file_path);
        }
    };

    let language = language_of(file_path);
    let (imports, exports) = extract(&content, language);
    let dependencies = resolve_dependencies(workspace, file_path, &imports, language);

    DependencyRecord {
        path: file_path.to_string(),
        language,
        imports: imports.into_iter().collect(),
        exports: exports.into_iter().collect(),
        dependencies,
        dependents: Vec::new(),
        analyzed_at: chrono::Utc::now().to_rfc3339(),
    }
}

fn language_of(file_path: &str) -> Language {
    Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .map(Language::from_extension)
        .unwrap_or(Language::Other)
}

/// Run the language's regex lists over the text. Set semantics remove
/// duplicate matches; BTreeSet keeps the output deterministic.
fn extract(content: &str, language: Language) -> (BTreeSet<String>, BTreeSet<String>) {
    match language {
        Language::Python => (
            capture_all(content, &PYTHON_IMPORT_RES),
            capture_all(content, &PYTHON_EXPORT_RES),
        ),
        Language::Javascript | Language::Typescript => (
            capture_all(content, &JS_IMPORT_RES),
            capture_all(content, &JS_EXPORT_RES),
        ),
        Language::Java => (
            capture_all(content, &JAVA_IMPORT_RES),
            capture_all(content, &JAVA_EXPORT_RES),
        ),
        Language::Go => (extract_go_imports(content), capture_all(content, &GO_EXPORT_RES)),
        Language::Rust => (
            capture_all(content, &RUST_IMPORT_RES),
            capture_all(content, &RUST_EXPORT_RES),
        ),
        Language::Clike => (
            capture_all(content, &CLIKE_IMPORT_RES),
            capture_all(content, &CLIKE_EXPORT_RES),
        ),
        Language::Other => (BTreeSet::new(), BTreeSet::new()),
    }
}

fn capture_all(content: &str, patterns: &[Regex]) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for re in patterns {
        for caps in re.captures_iter(content) {
            if let Some(m) = caps.get(1) {
                let token = m.as_str().trim();
                if !token.is_empty() {
                    out.insert(token.to_string());
                }
            }
        }
    }
    out
}

/// Go needs two passes: single-line imports plus quoted paths inside
/// `import ( ... )` blocks.
fn extract_go_imports(content: &str) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for caps in GO_IMPORT_SINGLE_RE.captures_iter(content) {
        out.insert(caps[1].to_string());
    }
    for block in GO_IMPORT_BLOCK_RE.captures_iter(content) {
        for quoted in GO_QUOTED_RE.captures_iter(&block[1]) {
            out.insert(quoted[1].to_string());
        }
    }
    out
}

/// Resolve import tokens to files that exist under the workspace.
///
/// Candidate generation is deliberately naive: join the token against the
/// workspace root, `src/`, and the importing file's directory, with the
/// language's extensions. Unresolved imports stay imports only.
fn resolve_dependencies(
    workspace: &Path,
    file_path: &str,
    imports: &BTreeSet<String>,
    language: Language,
) -> Vec<String> {
    let file_dir = Path::new(file_path)
        .parent()
        .unwrap_or_else(|| Path::new(""));

    let mut resolved = BTreeSet::new();
    for import in imports {
        for candidate in candidates_for(import, file_dir, language) {
            let normalized = normalize(&candidate);
            if normalized.is_empty() || normalized == file_path {
                continue;
            }
            if workspace.join(&normalized).is_file() {
                resolved.insert(normalized);
                break;
            }
        }
    }
    resolved.into_iter().collect()
}

fn candidates_for(import: &str, file_dir: &Path, language: Language) -> Vec<String> {
    let mut out = Vec::new();
    match language {
        Language::Python => {
            let rel = import.replace('.', "/");
            for base in ["", "src/"] {
                out.push(format!("{base}{rel}.py"));
                out.push(format!("{base}{rel}/__init__.py"));
            }
        }
        Language::Javascript | Language::Typescript => {
            // Only relative imports can point at project files
            if import.starts_with('.') {
                let joined = file_dir.join(import);
                let joined = joined.to_string_lossy();
                for ext in ["ts", "tsx", "js", "jsx", "mjs"] {
                    out.push(format!("{joined}.{ext}"));
                    out.push(format!("{joined}/index.{ext}"));
                }
                out.push(joined.to_string());
            }
        }
        Language::Java => {
            let rel = import.replace('.', "/");
            out.push(format!("{rel}.java"));
            out.push(format!("src/main/java/{rel}.java"));
        }
        Language::Go => {
            out.push(format!("{import}.go"));
            // Last path segment as a package directory is not resolvable
            // without module metadata; only same-repo relative paths match.
        }
        Language::Rust => {
            let rel = import
                .trim_start_matches("crate::")
                .trim_start_matches("self::")
                .trim_start_matches("super::")
                .replace("::", "/");
            for base in ["src/", ""] {
                out.push(format!("{base}{rel}.rs"));
                out.push(format!("{base}{rel}/mod.rs"));
            }
            out.push(file_dir.join(format!("{rel}.rs")).to_string_lossy().to_string());
            out.push(
                file_dir
                    .join(&rel)
                    .join("mod.rs")
                    .to_string_lossy()
                    .to_string(),
            );
        }
        Language::Clike => {
            out.push(file_dir.join(import).to_string_lossy().to_string());
            out.push(import.to_string());
            out.push(format!("include/{import}"));
        }
        Language::Other => {}
    }
    out
}

/// Collapse `./` and `a/../b` segments without touching the filesystem.
fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    // Escapes the workspace root; not a project file
                    return String::new();
                }
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}
