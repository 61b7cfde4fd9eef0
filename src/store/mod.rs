//! Collaborator query interfaces.
//!
//! The persistent side of the system (themes, file metadata, sessions)
//! lives behind an external SQLite-backed store. This core only depends
//! on the documented return shapes, so each collaborator is a trait with
//! typed results plus a `Null*` implementation that contributes nothing.
//! Call sites catch collaborator errors, log them, and continue with an
//! empty contribution - a failing backend never fails a context load.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::ContextMode;

/// Reference to a flow attached to a theme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowRef {
    /// Flow identifier
    pub id: String,
    /// Human-readable flow name
    pub name: String,
}

/// Completion state of a flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowStatus {
    /// Flow identifier
    pub id: String,
    /// Completed step count
    pub completed_steps: usize,
    /// Total step count
    pub total_steps: usize,
}

impl FlowStatus {
    /// Whether every step has completed.
    pub fn is_complete(&self) -> bool {
        self.total_steps > 0 && self.completed_steps >= self.total_steps
    }
}

/// Descriptive metadata for a directory, maintained externally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryMetadata {
    /// Workspace-relative directory path (`"."` for the root)
    pub path: String,
    /// Short description; preferred over on-disk README content
    pub description: String,
}

/// Modification and relationship metadata for a single file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileRelationshipMeta {
    /// Workspace-relative file path
    pub path: String,
    /// Recent modification count
    pub modification_count: u32,
    /// Last analysis timestamp (ISO 8601), if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_analyzed: Option<String>,
}

/// Summary written back to the session after a context load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContextUpdate {
    /// Primary theme of the load
    pub theme: String,
    /// Mode the load ran in
    pub mode: ContextMode,
    /// Every theme that contributed
    pub loaded_themes: Vec<String>,
    /// Flat memory estimate (MB)
    pub memory_estimate_mb: f64,
}

/// Record of a proposed or applied context escalation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationEvent {
    /// Mode before escalation
    pub from_mode: ContextMode,
    /// Proposed mode, if any step up was available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_mode: Option<ContextMode>,
    /// Why the escalation was proposed
    pub reason: String,
    /// When the assessment happened (ISO 8601)
    pub at: String,
}

/// Queries over theme-attached flows.
#[async_trait]
pub trait ThemeFlowQueries: Send + Sync {
    /// Flows attached to a theme.
    async fn get_flows_for_theme(&self, theme: &str) -> Result<Vec<FlowRef>>;

    /// Completion state of a flow, if known.
    async fn get_flow_status(&self, flow_id: &str) -> Result<Option<FlowStatus>>;
}

/// Queries over externally-maintained file and directory metadata.
#[async_trait]
pub trait FileMetadataQueries: Send + Sync {
    /// Descriptive metadata for a directory, if any.
    async fn get_directory_metadata(&self, path: &str) -> Result<Option<DirectoryMetadata>>;

    /// Modification/relationship metadata for a file.
    async fn get_file_relationships(&self, path: &str) -> Result<FileRelationshipMeta>;
}

/// Session bookkeeping hooks.
#[async_trait]
pub trait SessionQueries: Send + Sync {
    /// Record the outcome of a context load on the active session.
    async fn update_session_context(&self, update: SessionContextUpdate) -> Result<()>;

    /// Record an escalation assessment.
    async fn log_context_escalation(&self, event: EscalationEvent) -> Result<()>;
}

/// No-op flow collaborator.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullThemeFlowQueries;

#[async_trait]
impl ThemeFlowQueries for NullThemeFlowQueries {
    async fn get_flows_for_theme(&self, _theme: &str) -> Result<Vec<FlowRef>> {
        Ok(Vec::new())
    }

    async fn get_flow_status(&self, _flow_id: &str) -> Result<Option<FlowStatus>> {
        Ok(None)
    }
}

/// No-op metadata collaborator.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFileMetadataQueries;

#[async_trait]
impl FileMetadataQueries for NullFileMetadataQueries {
    async fn get_directory_metadata(&self, _path: &str) -> Result<Option<DirectoryMetadata>> {
        Ok(None)
    }

    async fn get_file_relationships(&self, path: &str) -> Result<FileRelationshipMeta> {
        Ok(FileRelationshipMeta {
            path: path.to_string(),
            ..FileRelationshipMeta::default()
        })
    }
}

/// No-op session collaborator.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSessionQueries;

#[async_trait]
impl SessionQueries for NullSessionQueries {
    async fn update_session_context(&self, _update: SessionContextUpdate) -> Result<()> {
        Ok(())
    }

    async fn log_context_escalation(&self, _event: EscalationEvent) -> Result<()> {
        Ok(())
    }
}
