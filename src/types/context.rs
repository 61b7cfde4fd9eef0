//! Context loading types: modes, results, and escalation assessments.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// How widely the engine gathers theme data for a task.
///
/// The three modes form a linear escalation ladder. Escalation within a
/// single load is one-way: a load never downgrades from the mode it was
/// requested (or escalated) into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextMode {
    /// Only the primary theme's files and paths
    #[default]
    ThemeFocused,
    /// The primary theme plus every theme it links to
    ThemeExpanded,
    /// Every theme in the project index
    ProjectWide,
}

impl ContextMode {
    /// The next mode up the ladder, or `None` at the top.
    pub fn escalate(self) -> Option<Self> {
        match self {
            Self::ThemeFocused => Some(Self::ThemeExpanded),
            Self::ThemeExpanded => Some(Self::ProjectWide),
            Self::ProjectWide => None,
        }
    }
}

impl fmt::Display for ContextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThemeFocused => write!(f, "theme-focused"),
            Self::ThemeExpanded => write!(f, "theme-expanded"),
            Self::ProjectWide => write!(f, "project-wide"),
        }
    }
}

impl FromStr for ContextMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "theme-focused" | "focused" => Ok(Self::ThemeFocused),
            "theme-expanded" | "expanded" => Ok(Self::ThemeExpanded),
            "project-wide" | "project" => Ok(Self::ProjectWide),
            other => Err(format!("unknown context mode: {other}")),
        }
    }
}

/// The assembled context for one `load_context` call.
///
/// Transient and in-memory only; created fresh per call, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextResult {
    /// Mode the load actually ran in (after any auto-escalation)
    pub mode: ContextMode,
    /// The theme the load was requested for
    pub primary_theme: String,
    /// Every theme that contributed files/paths
    pub loaded_themes: Vec<String>,
    /// Deduplicated workspace-relative file list
    pub files: Vec<String>,
    /// Deduplicated workspace-relative directory list
    pub paths: Vec<String>,
    /// Short descriptive snippet per loaded path (`"."` for project root)
    pub readmes: BTreeMap<String, String>,
    /// Shared files and the themes they are shared with
    pub shared_files: BTreeMap<String, Vec<String>>,
    /// Free-text advisories generated from threshold checks
    pub recommendations: Vec<String>,
    /// Flat linear memory estimate (MB); a proxy, not a measurement
    pub memory_estimate_mb: f64,
    /// Whether the mode was auto-escalated past the requested one
    pub escalated: bool,
    /// When the context was assembled (ISO 8601)
    pub loaded_at: String,
}

impl ContextResult {
    /// Start an empty result for the given theme and mode.
    pub fn new(primary_theme: impl Into<String>, mode: ContextMode) -> Self {
        Self {
            mode,
            primary_theme: primary_theme.into(),
            loaded_themes: Vec::new(),
            files: Vec::new(),
            paths: Vec::new(),
            readmes: BTreeMap::new(),
            shared_files: BTreeMap::new(),
            recommendations: Vec::new(),
            memory_estimate_mb: 0.0,
            escalated: false,
            loaded_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Outcome of matching an issue description against escalation keywords.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationAssessment {
    /// Mode the assessment started from
    pub current_mode: ContextMode,
    /// Proposed mode, one step up, if escalation is warranted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_mode: Option<ContextMode>,
    /// Keywords from the issue text that triggered the proposal
    pub matched_keywords: Vec<String>,
    /// Human-readable explanation of the outcome
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_escalation_ladder() {
        assert_eq!(
            ContextMode::ThemeFocused.escalate(),
            Some(ContextMode::ThemeExpanded)
        );
        assert_eq!(
            ContextMode::ThemeExpanded.escalate(),
            Some(ContextMode::ProjectWide)
        );
        assert_eq!(ContextMode::ProjectWide.escalate(), None);
    }

    #[test]
    fn test_mode_ordering_is_linear() {
        assert!(ContextMode::ThemeFocused < ContextMode::ThemeExpanded);
        assert!(ContextMode::ThemeExpanded < ContextMode::ProjectWide);
    }

    #[test]
    fn test_mode_display_and_parse_round_trip() {
        for mode in [
            ContextMode::ThemeFocused,
            ContextMode::ThemeExpanded,
            ContextMode::ProjectWide,
        ] {
            let parsed: ContextMode = mode.to_string().parse().unwrap();
            assert_eq!(parsed, mode);
        }
    }

    #[test]
    fn test_mode_parse_accepts_short_forms() {
        assert_eq!(
            "focused".parse::<ContextMode>().unwrap(),
            ContextMode::ThemeFocused
        );
        assert_eq!(
            "project".parse::<ContextMode>().unwrap(),
            ContextMode::ProjectWide
        );
        assert!("comprehensive".parse::<ContextMode>().is_err());
    }

    #[test]
    fn test_mode_serializes_kebab_case() {
        let json = serde_json::to_string(&ContextMode::ThemeExpanded).unwrap();
        assert_eq!(json, "\"theme-expanded\"");

        let parsed: ContextMode = serde_json::from_str("\"project-wide\"").unwrap();
        assert_eq!(parsed, ContextMode::ProjectWide);
    }

    #[test]
    fn test_context_result_starts_empty() {
        let result = ContextResult::new("billing", ContextMode::ThemeFocused);

        assert_eq!(result.primary_theme, "billing");
        assert_eq!(result.mode, ContextMode::ThemeFocused);
        assert!(result.files.is_empty());
        assert!(result.recommendations.is_empty());
        assert!(!result.escalated);
        assert!(!result.loaded_at.is_empty());
    }

    #[test]
    fn test_escalation_assessment_omits_empty_proposal() {
        let assessment = EscalationAssessment {
            current_mode: ContextMode::ProjectWide,
            proposed_mode: None,
            matched_keywords: vec!["import".to_string()],
            reason: "already project-wide".to_string(),
        };

        let json = serde_json::to_string(&assessment).unwrap();
        assert!(!json.contains("proposed_mode"));
    }
}
