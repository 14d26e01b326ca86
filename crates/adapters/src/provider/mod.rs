// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote workspace provider binding.
//!
//! A deliberately narrow surface: only the operations the engine consumes,
//! not the vendor's full API. The engine treats every call as a suspension
//! point and maps per-operation failures to result values; only workspace
//! creation errors propagate.

pub mod daytona;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub mod fake;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport: {0}")]
    Transport(String),
    #[error("api {status}: {message}")]
    Api { status: u16, message: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("session already exists: {0}")]
    SessionExists(String),
}

impl ProviderError {
    /// True for the duplicate-session error that idempotent default-session
    /// creation tolerates.
    pub fn is_session_exists(&self) -> bool {
        matches!(self, Self::SessionExists(_))
    }
}

/// Options for workspace creation.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Minutes of inactivity before the provider stops the workspace.
    /// 0 disables auto-stop.
    pub auto_stop_interval: u32,
}

/// A command submitted to a remote session.
#[derive(Debug, Clone, Default)]
pub struct SessionCommand {
    pub command: String,
    /// When true the remote returns immediately with a command id.
    pub run_async: bool,
    /// Whole seconds; `None` leaves the remote default in place.
    pub timeout_secs: Option<u64>,
}

/// Response from a one-shot or session command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutcome {
    pub output: String,
    pub error: Option<String>,
    pub exit_code: i32,
    /// Present when the remote buffered output out-of-band; logs for the
    /// command can be fetched by this id.
    pub cmd_id: Option<String>,
}

/// A public URL forwarding to a TCP port inside the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewLink {
    pub url: String,
    pub token: String,
}

/// Creates and destroys remote workspaces.
#[async_trait]
pub trait SandboxProvider: Clone + Send + Sync + 'static {
    type Workspace: SandboxWorkspace;

    /// Create a fresh workspace.
    async fn create(&self, opts: &CreateOptions) -> Result<Self::Workspace, ProviderError>;

    /// Destroy a workspace and everything in it.
    async fn remove(&self, workspace: &Self::Workspace) -> Result<(), ProviderError>;
}

/// Filesystem and process operations on one remote workspace.
#[async_trait]
pub trait SandboxWorkspace: Clone + Send + Sync + 'static {
    /// Opaque provider-assigned workspace id.
    fn id(&self) -> &str;

    /// Absolute path under which all mapped paths live.
    async fn user_root_dir(&self) -> Result<String, ProviderError>;

    async fn create_folder(&self, path: &str) -> Result<(), ProviderError>;

    async fn upload_file(&self, path: &str, content: &[u8]) -> Result<(), ProviderError>;

    async fn download_file(&self, path: &str) -> Result<Vec<u8>, ProviderError>;

    async fn delete_file(&self, path: &str) -> Result<(), ProviderError>;

    /// Run a one-shot command outside any session.
    async fn execute_command(
        &self,
        command: &str,
        cwd: Option<&str>,
        timeout_secs: Option<u64>,
    ) -> Result<CommandOutcome, ProviderError>;

    /// Create a stateful shell session.
    async fn create_session(&self, session_id: &str) -> Result<(), ProviderError>;

    /// Run a command inside a session; commands on one session are
    /// serialized by the remote.
    async fn execute_session_command(
        &self,
        session_id: &str,
        command: SessionCommand,
    ) -> Result<CommandOutcome, ProviderError>;

    /// Fetch buffered logs for a session command.
    async fn session_command_logs(
        &self,
        session_id: &str,
        cmd_id: &str,
    ) -> Result<String, ProviderError>;

    async fn delete_session(&self, session_id: &str) -> Result<(), ProviderError>;

    /// Provider-issued preview URL for a port inside the workspace.
    async fn preview_link(&self, port: u16) -> Result<PreviewLink, ProviderError>;
}
