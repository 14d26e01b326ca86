// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake provider for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{
    CommandOutcome, CreateOptions, PreviewLink, ProviderError, SandboxProvider, SandboxWorkspace,
    SessionCommand,
};

/// Recorded provider call
#[derive(Debug, Clone)]
pub enum ProviderCall {
    Create,
    Remove {
        workspace_id: String,
    },
    UserRootDir,
    CreateFolder {
        path: String,
    },
    UploadFile {
        path: String,
        bytes: usize,
    },
    DownloadFile {
        path: String,
    },
    DeleteFile {
        path: String,
    },
    ExecuteCommand {
        command: String,
        cwd: Option<String>,
    },
    CreateSession {
        session_id: String,
    },
    SessionCommand {
        session_id: String,
        command: String,
        timeout_secs: Option<u64>,
    },
    SessionCommandLogs {
        session_id: String,
        cmd_id: String,
    },
    DeleteSession {
        session_id: String,
    },
    PreviewLink {
        port: u16,
    },
}

struct FakeState {
    calls: Vec<ProviderCall>,
    files: HashMap<String, Vec<u8>>,
    folders: Vec<String>,
    sessions: Vec<String>,
    scripted: VecDeque<CommandOutcome>,
    logs: HashMap<String, String>,
    root_dir: String,
    created: usize,
    removed: usize,
    preview: Option<PreviewLink>,
    fail_create: bool,
    fail_session_create: bool,
    fail_session_commands: bool,
    fail_upload: bool,
    drop_uploads: bool,
    hang_session_commands: bool,
    empty_root_dir: bool,
}

impl FakeState {
    fn record(&mut self, call: ProviderCall) {
        self.calls.push(call);
    }
}

/// Fake provider with an in-memory filesystem and scripted outcomes.
///
/// One shared state backs the provider and every workspace it creates, so
/// tests inspect recorded calls and file contents through the provider
/// handle regardless of which side performed the operation.
#[derive(Clone)]
pub struct FakeProvider {
    state: Arc<Mutex<FakeState>>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                calls: Vec::new(),
                files: HashMap::new(),
                folders: Vec::new(),
                sessions: Vec::new(),
                scripted: VecDeque::new(),
                logs: HashMap::new(),
                root_dir: "/home/daytona".to_string(),
                created: 0,
                removed: 0,
                preview: None,
                fail_create: false,
                fail_session_create: false,
                fail_session_commands: false,
                fail_upload: false,
                drop_uploads: false,
                hang_session_commands: false,
                empty_root_dir: false,
            })),
        }
    }
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    // --- configuration -----------------------------------------------------

    pub fn set_root_dir(&self, dir: &str) {
        self.state.lock().root_dir = dir.to_string();
    }

    /// Queue an outcome returned ahead of the built-in command semantics.
    pub fn script_outcome(&self, outcome: CommandOutcome) {
        self.state.lock().scripted.push_back(outcome);
    }

    pub fn set_log(&self, cmd_id: &str, text: &str) {
        self.state.lock().logs.insert(cmd_id.to_string(), text.to_string());
    }

    pub fn set_preview(&self, url: &str, token: &str) {
        self.state.lock().preview = Some(PreviewLink {
            url: url.to_string(),
            token: token.to_string(),
        });
    }

    pub fn fail_create(&self, fail: bool) {
        self.state.lock().fail_create = fail;
    }

    pub fn fail_session_create(&self, fail: bool) {
        self.state.lock().fail_session_create = fail;
    }

    pub fn fail_session_commands(&self, fail: bool) {
        self.state.lock().fail_session_commands = fail;
    }

    pub fn fail_upload(&self, fail: bool) {
        self.state.lock().fail_upload = fail;
    }

    /// Pretend uploads succeed without storing anything, so `test -f`
    /// verification reports the file missing.
    pub fn drop_uploads(&self, drop: bool) {
        self.state.lock().drop_uploads = drop;
    }

    /// Make session commands never resolve, for cancellation tests.
    pub fn hang_session_commands(&self, hang: bool) {
        self.state.lock().hang_session_commands = hang;
    }

    pub fn empty_root_dir(&self, empty: bool) {
        self.state.lock().empty_root_dir = empty;
    }

    // --- inspection --------------------------------------------------------

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state.lock().calls.clone()
    }

    /// Number of workspace create RPCs observed.
    pub fn create_calls(&self) -> usize {
        self.state.lock().created
    }

    /// Number of workspace remove RPCs observed.
    pub fn remove_calls(&self) -> usize {
        self.state.lock().removed
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().files.get(path).cloned()
    }

    pub fn folders(&self) -> Vec<String> {
        self.state.lock().folders.clone()
    }

    /// Session ids currently live on the remote.
    pub fn sessions(&self) -> Vec<String> {
        self.state.lock().sessions.clone()
    }
}

#[async_trait]
impl SandboxProvider for FakeProvider {
    type Workspace = FakeWorkspace;

    async fn create(&self, _opts: &CreateOptions) -> Result<Self::Workspace, ProviderError> {
        let mut state = self.state.lock();
        state.record(ProviderCall::Create);
        if state.fail_create {
            return Err(ProviderError::Transport("workspace create refused".into()));
        }
        state.created += 1;
        let id = format!("sandbox-{}", state.created);
        Ok(FakeWorkspace {
            id,
            state: Arc::clone(&self.state),
        })
    }

    async fn remove(&self, workspace: &Self::Workspace) -> Result<(), ProviderError> {
        let mut state = self.state.lock();
        state.record(ProviderCall::Remove {
            workspace_id: workspace.id.clone(),
        });
        state.removed += 1;
        state.sessions.clear();
        Ok(())
    }
}

/// Workspace handle sharing the provider's state.
#[derive(Clone)]
pub struct FakeWorkspace {
    id: String,
    state: Arc<Mutex<FakeState>>,
}

#[async_trait]
impl SandboxWorkspace for FakeWorkspace {
    fn id(&self) -> &str {
        &self.id
    }

    async fn user_root_dir(&self) -> Result<String, ProviderError> {
        let mut state = self.state.lock();
        state.record(ProviderCall::UserRootDir);
        if state.empty_root_dir {
            return Ok(String::new());
        }
        Ok(state.root_dir.clone())
    }

    async fn create_folder(&self, path: &str) -> Result<(), ProviderError> {
        let mut state = self.state.lock();
        state.record(ProviderCall::CreateFolder {
            path: path.to_string(),
        });
        if !state.folders.iter().any(|f| f == path) {
            state.folders.push(path.to_string());
        }
        Ok(())
    }

    async fn upload_file(&self, path: &str, content: &[u8]) -> Result<(), ProviderError> {
        let mut state = self.state.lock();
        state.record(ProviderCall::UploadFile {
            path: path.to_string(),
            bytes: content.len(),
        });
        if state.fail_upload {
            return Err(ProviderError::Transport("upload refused".into()));
        }
        if !state.drop_uploads {
            state.files.insert(path.to_string(), content.to_vec());
        }
        Ok(())
    }

    async fn download_file(&self, path: &str) -> Result<Vec<u8>, ProviderError> {
        let mut state = self.state.lock();
        state.record(ProviderCall::DownloadFile {
            path: path.to_string(),
        });
        state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(path.to_string()))
    }

    async fn delete_file(&self, path: &str) -> Result<(), ProviderError> {
        let mut state = self.state.lock();
        state.record(ProviderCall::DeleteFile {
            path: path.to_string(),
        });
        state
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| ProviderError::NotFound(path.to_string()))
    }

    async fn execute_command(
        &self,
        command: &str,
        cwd: Option<&str>,
        _timeout_secs: Option<u64>,
    ) -> Result<CommandOutcome, ProviderError> {
        let mut state = self.state.lock();
        state.record(ProviderCall::ExecuteCommand {
            command: command.to_string(),
            cwd: cwd.map(str::to_string),
        });
        Ok(run_command(&mut state, command))
    }

    async fn create_session(&self, session_id: &str) -> Result<(), ProviderError> {
        let mut state = self.state.lock();
        state.record(ProviderCall::CreateSession {
            session_id: session_id.to_string(),
        });
        if state.fail_session_create {
            return Err(ProviderError::Transport("session create refused".into()));
        }
        if state.sessions.iter().any(|s| s == session_id) {
            return Err(ProviderError::SessionExists(session_id.to_string()));
        }
        state.sessions.push(session_id.to_string());
        Ok(())
    }

    async fn execute_session_command(
        &self,
        session_id: &str,
        command: SessionCommand,
    ) -> Result<CommandOutcome, ProviderError> {
        let hang = {
            let mut state = self.state.lock();
            state.record(ProviderCall::SessionCommand {
                session_id: session_id.to_string(),
                command: command.command.clone(),
                timeout_secs: command.timeout_secs,
            });
            if state.fail_session_commands {
                return Err(ProviderError::Transport("session command refused".into()));
            }
            if !state.sessions.iter().any(|s| s == session_id) {
                return Err(ProviderError::NotFound(session_id.to_string()));
            }
            state.hang_session_commands
        };
        if hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        let mut state = self.state.lock();
        Ok(run_command(&mut state, &command.command))
    }

    async fn session_command_logs(
        &self,
        session_id: &str,
        cmd_id: &str,
    ) -> Result<String, ProviderError> {
        let mut state = self.state.lock();
        state.record(ProviderCall::SessionCommandLogs {
            session_id: session_id.to_string(),
            cmd_id: cmd_id.to_string(),
        });
        Ok(state.logs.get(cmd_id).cloned().unwrap_or_default())
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), ProviderError> {
        let mut state = self.state.lock();
        state.record(ProviderCall::DeleteSession {
            session_id: session_id.to_string(),
        });
        state.sessions.retain(|s| s != session_id);
        Ok(())
    }

    async fn preview_link(&self, port: u16) -> Result<PreviewLink, ProviderError> {
        let mut state = self.state.lock();
        state.record(ProviderCall::PreviewLink { port });
        state
            .preview
            .clone()
            .ok_or_else(|| ProviderError::NotFound(format!("no preview for port {}", port)))
    }
}

// ---------------------------------------------------------------------------
// Built-in command semantics
// ---------------------------------------------------------------------------

/// Run a command against the in-memory state: scripted outcomes first, then
/// a small interpreter for the probes and fallbacks the engine emits
/// (`test -f`/`test -d`, `cat`, `echo`, `echo ... > file`).
fn run_command(state: &mut FakeState, command: &str) -> CommandOutcome {
    if let Some(outcome) = state.scripted.pop_front() {
        return outcome;
    }
    let cmd = peel(command);

    if let Some(rest) = cmd.strip_prefix("test -f ") {
        let path = probe_target(rest);
        return probe_outcome(state.files.contains_key(&path));
    }
    if let Some(rest) = cmd.strip_prefix("test -d ") {
        let path = probe_target(rest);
        let exists = state.root_dir == path
            || state.folders.iter().any(|f| f == &path)
            || state.files.keys().any(|f| f.starts_with(&format!("{}/", path)));
        return probe_outcome(exists);
    }
    if let Some(rest) = cmd.strip_prefix("cat ") {
        let path = unquote(rest.trim());
        return match state.files.get(&path) {
            Some(content) => CommandOutcome {
                output: String::from_utf8_lossy(content).into_owned(),
                exit_code: 0,
                ..Default::default()
            },
            None => CommandOutcome {
                output: String::new(),
                error: Some(format!("cat: {}: No such file or directory", path)),
                exit_code: 1,
                ..Default::default()
            },
        };
    }
    if let Some(rest) = cmd.strip_prefix("echo ") {
        // Redirection writes into the in-memory filesystem.
        if let Some((payload, target)) = rest.split_once(" > ") {
            let path = unquote(target.trim());
            let mut content = unquote(payload.trim()).replace("'\\''", "'");
            content.push('\n');
            state.files.insert(path, content.into_bytes());
            return CommandOutcome::default();
        }
        let mut output = unquote(rest.trim()).replace("'\\''", "'");
        output.push('\n');
        return CommandOutcome {
            output,
            exit_code: 0,
            ..Default::default()
        };
    }

    CommandOutcome::default()
}

/// Strip the `cd <dir> && ` prefix and `/bin/sh -c '...'` wrapper the
/// preparer adds, so the interpreter sees the logical command.
fn peel(command: &str) -> String {
    let mut s = command;
    if s.starts_with("cd ") {
        if let Some((_, rest)) = s.split_once(" && ") {
            s = rest;
        }
    }
    if let Some(inner) = s.strip_prefix("/bin/sh -c '") {
        if let Some(inner) = inner.strip_suffix('\'') {
            return inner.replace("'\\''", "'");
        }
    }
    s.to_string()
}

/// Extract the path from a `test -x <path> && ...` probe.
fn probe_target(rest: &str) -> String {
    let path = rest.split(" && ").next().unwrap_or(rest).trim();
    unquote(path)
}

fn probe_outcome(exists: bool) -> CommandOutcome {
    CommandOutcome {
        output: if exists { "exists\n" } else { "missing\n" }.to_string(),
        exit_code: 0,
        ..Default::default()
    }
}

/// Strip one layer of matching single or double quotes.
fn unquote(s: &str) -> String {
    let trimmed = s.trim();
    for quote in ['\'', '"'] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return trimmed[1..trimmed.len() - 1].to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
