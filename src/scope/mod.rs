//! Scope engine: decides how much project context to load for a task.
//!
//! Three modes form a linear ladder - theme-focused, theme-expanded,
//! project-wide. A focused load auto-escalates one step when the primary
//! theme is heavily linked or shares many files; there is deliberately no
//! automatic second step, `assess_escalation` is the only route from
//! expanded to project-wide. Missing or malformed secondary resources
//! degrade to empty contributions; only an unknown primary theme fails
//! the call.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::analysis::{dependency, impact};
use crate::config::{EngineConfig, GLOBAL_CONTEXT_PATHS};
use crate::error::Result;
use crate::store::{
    EscalationEvent, FileMetadataQueries, NullFileMetadataQueries, NullSessionQueries,
    NullThemeFlowQueries, SessionContextUpdate, SessionQueries, ThemeFlowQueries,
};
use crate::theme::ThemeStore;
use crate::types::{
    ContextMode, ContextResult, EscalationAssessment, ImpactReport, Theme,
};
use crate::{FILE_MEMORY_COST_MB, THEME_MEMORY_COST_MB};

/// Issue-description keywords that suggest a wider context is needed.
const ESCALATION_KEYWORDS: &[&str] = &[
    "import",
    "dependency",
    "dependencies",
    "shared",
    "cross",
    "global",
    "architecture",
    "multiple themes",
    "project-wide",
];

/// The context-loading engine.
pub struct ScopeEngine {
    config: EngineConfig,
    themes: Arc<ThemeStore>,
    flows: Arc<dyn ThemeFlowQueries>,
    metadata: Arc<dyn FileMetadataQueries>,
    sessions: Arc<dyn SessionQueries>,
}

impl ScopeEngine {
    /// Create an engine with no-op collaborators.
    pub fn new(config: EngineConfig) -> Self {
        let themes = Arc::new(ThemeStore::new(config.themes_dir.clone()));
        Self {
            config,
            themes,
            flows: Arc::new(NullThemeFlowQueries),
            metadata: Arc::new(NullFileMetadataQueries),
            sessions: Arc::new(NullSessionQueries),
        }
    }

    /// Attach a flow collaborator.
    pub fn with_flow_queries(mut self, flows: Arc<dyn ThemeFlowQueries>) -> Self {
        self.flows = flows;
        self
    }

    /// Attach a file-metadata collaborator.
    pub fn with_metadata_queries(mut self, metadata: Arc<dyn FileMetadataQueries>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attach a session collaborator.
    pub fn with_session_queries(mut self, sessions: Arc<dyn SessionQueries>) -> Self {
        self.sessions = sessions;
        self
    }

    /// The theme store backing this engine.
    pub fn theme_store(&self) -> &ThemeStore {
        &self.themes
    }

    /// Load context for a theme.
    ///
    /// Fails only when the primary theme is unknown. Unless `force` is
    /// set, a focused request auto-escalates to theme-expanded when the
    /// primary theme has more linked themes or shared files than the
    /// configured thresholds. Escalation within a call is one-way and at
    /// most one step.
    pub async fn load_context(
        &self,
        theme_name: &str,
        requested_mode: ContextMode,
        force: bool,
    ) -> Result<ContextResult> {
        let primary = self.themes.load(theme_name).await?;

        let mut mode = requested_mode;
        let mut escalated = false;
        if !force
            && requested_mode == ContextMode::ThemeFocused
            && (primary.linked_themes.len() > self.config.linked_theme_threshold
                || primary.shared_files.len() > self.config.shared_file_threshold)
        {
            mode = ContextMode::ThemeExpanded;
            escalated = true;
            info!(
                "Auto-escalating {} to {} ({} linked themes, {} shared files)",
                theme_name,
                mode,
                primary.linked_themes.len(),
                primary.shared_files.len()
            );
        }

        let mut result = ContextResult::new(theme_name, mode);
        result.escalated = escalated;

        // Each theme contributes at most once; the visited set doubles as
        // the guard against link cycles between themes.
        let mut visited: BTreeSet<String> = BTreeSet::new();
        visited.insert(theme_name.to_string());
        result.loaded_themes.push(theme_name.to_string());
        merge_theme(&mut result, &primary);

        match mode {
            ContextMode::ThemeFocused => {}
            ContextMode::ThemeExpanded => {
                for linked in &primary.linked_themes {
                    if !visited.insert(linked.clone()) {
                        continue;
                    }
                    if let Some(theme) = self.themes.try_load(linked).await {
                        result.loaded_themes.push(linked.clone());
                        merge_theme(&mut result, &theme);
                    }
                }
            }
            ContextMode::ProjectWide => {
                for name in self.themes.theme_names().await {
                    if !visited.insert(name.clone()) {
                        continue;
                    }
                    if let Some(theme) = self.themes.try_load(&name).await {
                        result.loaded_themes.push(name.clone());
                        merge_theme(&mut result, &theme);
                    }
                }
            }
        }

        dedup(&mut result.files);
        dedup(&mut result.paths);
        for shared_with in result.shared_files.values_mut() {
            shared_with.sort();
            shared_with.dedup();
        }
        self.append_global_paths(&mut result);
        self.attach_readmes(&mut result).await;

        let readme_bytes: usize = result.readmes.values().map(String::len).sum();
        result.memory_estimate_mb = result.files.len() as f64 * FILE_MEMORY_COST_MB
            + readme_bytes as f64 / (1024.0 * 1024.0)
            + result.loaded_themes.len() as f64 * THEME_MEMORY_COST_MB;

        self.add_recommendations(&mut result, &primary).await;

        let update = SessionContextUpdate {
            theme: theme_name.to_string(),
            mode,
            loaded_themes: result.loaded_themes.clone(),
            memory_estimate_mb: result.memory_estimate_mb,
        };
        if let Err(e) = self.sessions.update_session_context(update).await {
            warn!("Session collaborator failed to record context load: {}", e);
        }

        info!(
            "Loaded context for {} in {} mode: {} themes, {} files, {:.1}MB estimated",
            theme_name,
            mode,
            result.loaded_themes.len(),
            result.files.len(),
            result.memory_estimate_mb
        );
        Ok(result)
    }

    /// Match an issue description against the escalation keyword list and
    /// propose at most one step up the ladder.
    pub async fn assess_escalation(
        &self,
        current_mode: ContextMode,
        issue_text: &str,
    ) -> EscalationAssessment {
        let lowered = issue_text.to_lowercase();
        let matched: Vec<String> = ESCALATION_KEYWORDS
            .iter()
            .filter(|kw| lowered.contains(*kw))
            .map(|kw| kw.to_string())
            .collect();

        let assessment = if matched.is_empty() {
            EscalationAssessment {
                current_mode,
                proposed_mode: None,
                matched_keywords: matched,
                reason: "no escalation keywords matched; current scope looks sufficient"
                    .to_string(),
            }
        } else if let Some(next) = current_mode.escalate() {
            EscalationAssessment {
                current_mode,
                proposed_mode: Some(next),
                reason: format!(
                    "issue mentions {}; proposing one step up to {}",
                    matched.join(", "),
                    next
                ),
                matched_keywords: matched,
            }
        } else {
            EscalationAssessment {
                current_mode,
                proposed_mode: None,
                matched_keywords: matched,
                reason: "already at project-wide scope; no further escalation available"
                    .to_string(),
            }
        };

        let event = EscalationEvent {
            from_mode: current_mode,
            to_mode: assessment.proposed_mode,
            reason: assessment.reason.clone(),
            at: chrono::Utc::now().to_rfc3339(),
        };
        if let Err(e) = self.sessions.log_context_escalation(event).await {
            debug!("Session collaborator failed to record escalation: {}", e);
        }

        assessment
    }

    /// Score the blast radius of changing a file, combining the rebuilt
    /// relationship graph with collaborator modification history and
    /// theme membership.
    pub async fn file_impact(&self, file: &str) -> Result<ImpactReport> {
        let map = impact::map_relationships(&self.config.workspace).await?;

        let dependent_count = map
            .reverse_dependencies
            .get(file)
            .map(Vec::len)
            .unwrap_or(0);
        let dependencies = match map.dependency_graph.get(file) {
            Some(deps) => deps.clone(),
            // Not a graph node (excluded or non-code file): analyze directly
            None => {
                dependency::analyze(&self.config.workspace, file)
                    .await
                    .dependencies
            }
        };

        let recent_modifications = match self.metadata.get_file_relationships(file).await {
            Ok(meta) => meta.modification_count,
            Err(e) => {
                warn!("Metadata collaborator failed for {}: {}", file, e);
                0
            }
        };

        let mut affected_themes = Vec::new();
        for name in self.themes.theme_names().await {
            if let Some(theme) = self.themes.try_load(&name).await {
                if theme_covers(&theme, file) {
                    affected_themes.push(name);
                }
            }
        }

        Ok(impact::assess_impact(
            file,
            dependencies,
            dependent_count,
            recent_modifications,
            affected_themes,
        ))
    }

    /// Append the fixed global allow-list entries that exist on disk,
    /// regardless of mode.
    fn append_global_paths(&self, result: &mut ContextResult) {
        for entry in GLOBAL_CONTEXT_PATHS {
            let on_disk = self.config.workspace.join(entry);
            if on_disk.is_dir() {
                if !result.paths.iter().any(|p| p == entry) {
                    result.paths.push(entry.to_string());
                }
            } else if on_disk.is_file() && !result.files.iter().any(|f| f == entry) {
                result.files.push(entry.to_string());
            }
        }
    }

    /// Attach a descriptive snippet per loaded path, preferring
    /// collaborator metadata over on-disk README content.
    async fn attach_readmes(&self, result: &mut ContextResult) {
        let mut targets: Vec<String> = vec![".".to_string()];
        targets.extend(result.paths.iter().cloned());

        for path in targets {
            match self.metadata.get_directory_metadata(&path).await {
                Ok(Some(meta)) => {
                    result
                        .readmes
                        .insert(path, truncate(&meta.description, self.config.readme_snippet_limit));
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    debug!("Metadata collaborator failed for {}: {}", path, e);
                }
            }

            let readme = if path == "." {
                self.config.workspace.join("README.md")
            } else {
                self.config.workspace.join(&path).join("README.md")
            };
            match tokio::fs::read_to_string(&readme).await {
                Ok(content) => {
                    result
                        .readmes
                        .insert(path, truncate(&content, self.config.readme_snippet_limit));
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => debug!("Cannot read {:?}: {}", readme, e),
            }
        }
    }

    /// Threshold checks that turn into free-text advisories.
    async fn add_recommendations(&self, result: &mut ContextResult, primary: &Theme) {
        if result.memory_estimate_mb > self.config.memory_budget_mb {
            result.recommendations.push(format!(
                "Memory estimate {:.1}MB exceeds the {:.1}MB budget; consider a narrower mode or fewer themes",
                result.memory_estimate_mb, self.config.memory_budget_mb
            ));
        }

        if result.escalated {
            result.recommendations.push(format!(
                "Context was escalated to {} because the theme has {} linked themes and {} shared files",
                result.mode,
                primary.linked_themes.len(),
                primary.shared_files.len()
            ));
        }

        if result.shared_files.len() > 10 {
            result.recommendations.push(format!(
                "{} files are shared across themes; changes here ripple widely",
                result.shared_files.len()
            ));
        }

        if !result.paths.is_empty() {
            let covered = result
                .paths
                .iter()
                .filter(|p| result.readmes.contains_key(*p))
                .count();
            if covered * 2 < result.paths.len() {
                result.recommendations.push(format!(
                    "Only {} of {} loaded paths have descriptions; README coverage is low",
                    covered,
                    result.paths.len()
                ));
            }
        }

        match self.flows.get_flows_for_theme(&result.primary_theme).await {
            Ok(flow_refs) => {
                let mut in_progress = 0usize;
                for flow in &flow_refs {
                    match self.flows.get_flow_status(&flow.id).await {
                        Ok(Some(status)) if !status.is_complete() => in_progress += 1,
                        Ok(_) => {}
                        Err(e) => debug!("Flow status lookup failed for {}: {}", flow.id, e),
                    }
                }
                if in_progress > 0 {
                    result.recommendations.push(format!(
                        "{} flow(s) for theme {} are still in progress",
                        in_progress, result.primary_theme
                    ));
                }
            }
            Err(e) => {
                warn!(
                    "Flow collaborator failed for {}: {}",
                    result.primary_theme, e
                );
            }
        }
    }
}

fn merge_theme(result: &mut ContextResult, theme: &Theme) {
    result.files.extend(theme.files.iter().cloned());
    result.paths.extend(theme.paths.iter().cloned());
    for (path, shared) in &theme.shared_files {
        result
            .shared_files
            .entry(path.clone())
            .or_default()
            .extend(shared.shared_with.iter().cloned());
    }
}

fn dedup(items: &mut Vec<String>) {
    let set: BTreeSet<String> = std::mem::take(items).into_iter().collect();
    *items = set.into_iter().collect();
}

fn theme_covers(theme: &Theme, file: &str) -> bool {
    theme.files.iter().any(|f| f == file)
        || theme.shared_files.contains_key(file)
        || theme
            .paths
            .iter()
            .any(|p| Path::new(file).starts_with(Path::new(p)))
}

fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}
