//! Configuration management for the Scope Engine.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Exclusions appended to every discovery walk, caller-supplied or not.
/// Management folders, VCS internals, caches, and build output never count
/// as project context.
pub const DEFAULT_EXCLUDE_GLOBS: &[&str] = &[
    ".project/**",
    ".git/**",
    ".svn/**",
    ".hg/**",
    "node_modules/**",
    "target/**",
    "dist/**",
    "build/**",
    "__pycache__/**",
    ".pytest_cache/**",
    ".mypy_cache/**",
    "*.pyc",
    "*.pyo",
    ".DS_Store",
    "*.log",
    "venv/**",
    ".venv/**",
];

/// Paths and files appended to every loaded context when present on disk,
/// regardless of mode.
pub const GLOBAL_CONTEXT_PATHS: &[&str] = &[
    "src",
    "lib",
    "README.md",
    "package.json",
    "Cargo.toml",
    "pyproject.toml",
    "go.mod",
    ".env",
    "Makefile",
    "docker-compose.yml",
];

/// Command-line arguments for the Scope Engine.
#[derive(Parser, Debug, Clone)]
#[command(name = "scope-engine")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Theme-scoped context engine for AI coding assistants")]
pub struct Args {
    /// Workspace root directory
    #[arg(short, long, env = "SCOPE_ENGINE_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Directory holding theme JSON documents (default: <workspace>/.project/themes)
    #[arg(long, env = "SCOPE_ENGINE_THEMES_DIR")]
    pub themes_dir: Option<PathBuf>,

    /// Memory budget for a loaded context, in megabytes
    #[arg(long, default_value = "100.0", env = "SCOPE_ENGINE_MEMORY_BUDGET_MB")]
    pub memory_budget_mb: f64,

    /// Linked-theme count above which a focused load auto-escalates
    #[arg(long, default_value = "2", env = "SCOPE_ENGINE_LINKED_THEME_THRESHOLD")]
    pub linked_theme_threshold: usize,

    /// Shared-file count above which a focused load auto-escalates
    #[arg(long, default_value = "5", env = "SCOPE_ENGINE_SHARED_FILE_THRESHOLD")]
    pub shared_file_threshold: usize,

    /// Enable debug logging
    #[arg(short, long, env = "SCOPE_ENGINE_DEBUG")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands exposing the library surface.
#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Discover and categorize project files
    Discover {
        /// Include globs (default: accept all)
        #[arg(long)]
        include: Vec<String>,
        /// Extra exclude globs (defaults always appended)
        #[arg(long)]
        exclude: Vec<String>,
    },
    /// Extract imports/exports from a single file
    Analyze {
        /// File to analyze, relative to the workspace
        file: String,
    },
    /// Score the blast radius of changing a file
    Impact {
        /// File to assess, relative to the workspace
        file: String,
    },
    /// Map the project-wide file relationship graph
    Relationships,
    /// Load context for a theme
    Context {
        /// Theme name
        theme: String,
        /// Requested context mode
        #[arg(long, default_value = "theme-focused")]
        mode: String,
        /// Pin the requested mode, disabling auto-escalation
        #[arg(long)]
        force: bool,
    },
    /// Assess whether an issue description warrants a wider context
    Escalate {
        /// Current context mode
        mode: String,
        /// Issue description to match against escalation keywords
        issue: String,
    },
    /// List themes known to the project index
    Themes,
}

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Workspace root directory
    pub workspace: PathBuf,
    /// Directory holding theme JSON documents
    pub themes_dir: PathBuf,
    /// Memory budget for a loaded context (MB)
    pub memory_budget_mb: f64,
    /// Linked-theme escalation threshold
    pub linked_theme_threshold: usize,
    /// Shared-file escalation threshold
    pub shared_file_threshold: usize,
    /// README snippet limit (characters)
    pub readme_snippet_limit: usize,
    /// Debug mode
    pub debug: bool,
}

impl From<Args> for EngineConfig {
    fn from(args: Args) -> Self {
        let workspace = args
            .workspace
            .unwrap_or_else(|| std::env::current_dir().expect("Failed to get current directory"));
        let themes_dir = args
            .themes_dir
            .unwrap_or_else(|| workspace.join(".project").join("themes"));

        Self {
            workspace,
            themes_dir,
            memory_budget_mb: args.memory_budget_mb,
            linked_theme_threshold: args.linked_theme_threshold,
            shared_file_threshold: args.shared_file_threshold,
            readme_snippet_limit: crate::README_SNIPPET_LIMIT,
            debug: args.debug,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let workspace = std::env::current_dir().expect("Failed to get current directory");
        let themes_dir = workspace.join(".project").join("themes");
        Self {
            workspace,
            themes_dir,
            memory_budget_mb: 100.0,
            linked_theme_threshold: 2,
            shared_file_threshold: 5,
            readme_snippet_limit: crate::README_SNIPPET_LIMIT,
            debug: false,
        }
    }
}

impl EngineConfig {
    /// Build a configuration rooted at the given workspace with default
    /// thresholds. Used by tests and library callers that bypass the CLI.
    pub fn for_workspace(workspace: impl Into<PathBuf>) -> Self {
        let workspace = workspace.into();
        let themes_dir = workspace.join(".project").join("themes");
        Self {
            workspace,
            themes_dir,
            ..Self::default()
        }
    }
}
