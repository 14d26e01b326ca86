// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session-oriented command execution.
//!
//! One long-lived remote session per distinct working directory preserves
//! environment and cwd across calls in the same logical context. Commands on
//! one session key are serialized; distinct keys run concurrently subject to
//! the remote's own scheduling.

use std::collections::HashMap;
use std::sync::Arc;

use sbx_adapters::{SandboxProvider, SandboxWorkspace, SessionCommand};
use sbx_core::{Clock, ExecInput, ExecResult};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::SandboxError;
use crate::lifecycle::{Ready, Sandbox};
use crate::{prepare, preview};

/// Session key used when no working directory is supplied.
const DEFAULT_SESSION_KEY: &str = "default";

/// Shared fallback session when per-key creation fails.
const DEFAULT_SESSION_ID: &str = "default-exec-session";

/// Workspace path probed before commands that mention it.
const WORKSPACE_HOME: &str = "/home/daytona";

type Slot = Arc<tokio::sync::Mutex<Option<String>>>;

/// Session-key to remote-session bookkeeping.
///
/// Each key owns a slot whose async lock provides both create-once semantics
/// (at most one create RPC per key) and per-key command serialization.
pub(crate) struct SessionMap {
    slots: parking_lot::Mutex<HashMap<String, Slot>>,
}

impl SessionMap {
    pub(crate) fn new() -> Self {
        Self {
            slots: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: &str) -> Slot {
        self.slots
            .lock()
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    /// Remove and return every established session id.
    ///
    /// Slots busy with an in-flight command are skipped; those sessions are
    /// left for the workspace auto-stop to reap.
    pub(crate) fn drain(&self) -> Vec<String> {
        let slots: Vec<Slot> = self.slots.lock().drain().map(|(_, slot)| slot).collect();
        let mut ids = Vec::new();
        for slot in slots {
            if let Ok(guard) = slot.try_lock() {
                if let Some(id) = guard.as_ref() {
                    ids.push(id.clone());
                }
            }
        }
        ids.sort();
        ids.dedup();
        ids
    }
}

impl<P: SandboxProvider, C: Clock> Sandbox<P, C> {
    /// Run a command in the remote workspace.
    ///
    /// Returns `Err` only for configuration or initialization failures;
    /// every steady-state remote failure becomes an `ExecResult` with a
    /// non-zero exit code.
    pub async fn exec(&self, input: ExecInput) -> Result<ExecResult, SandboxError> {
        self.exec_with_cancel(input, CancellationToken::new()).await
    }

    /// [`Sandbox::exec`] with a cancellation signal.
    ///
    /// On cancellation the call stops waiting and reports `cancelled`; the
    /// remote command is left to the remote's own timeout.
    pub async fn exec_with_cancel(
        &self,
        input: ExecInput,
        cancel: CancellationToken,
    ) -> Result<ExecResult, SandboxError> {
        if input.cmd.is_empty() {
            return Ok(ExecResult::failure("empty command"));
        }
        let ready = self.ensure_ready().await?;
        Ok(self.exec_ready(&ready, input, cancel).await)
    }

    async fn exec_ready(
        &self,
        ready: &Ready<P::Workspace>,
        input: ExecInput,
        cancel: CancellationToken,
    ) -> ExecResult {
        self.preflight_workspace_home(ready, &input.cmd).await;

        let remote_workdir = match input.workdir.as_deref() {
            Some(dir) => ready.paths.map(dir),
            None => ready.root_dir.clone(),
        };
        let prepared = prepare::prepare(&input.cmd, &ready.root_dir, &remote_workdir);
        let key = input
            .workdir
            .clone()
            .unwrap_or_else(|| DEFAULT_SESSION_KEY.to_string());

        // The slot lock is held through submission: it gates session
        // creation to one RPC per key and serializes same-key commands.
        let slot = ready.sessions.slot(&key);
        let mut guard = slot.lock().await;
        let session_id = match guard.as_ref() {
            Some(id) => id.clone(),
            None => {
                let id = self.acquire_session(ready, &key).await;
                *guard = Some(id.clone());
                id
            }
        };

        let command = SessionCommand {
            command: prepared.clone(),
            run_async: false,
            timeout_secs: timeout_secs(input.timeout_ms),
        };
        let submitted = ready.workspace.execute_session_command(&session_id, command);
        let outcome = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(session_id = %session_id, "exec cancelled while awaiting remote");
                return ExecResult::failure("cancelled");
            }
            outcome = submitted => outcome,
        };

        let mut result = match outcome {
            Ok(outcome) => {
                let mut stdout = outcome.output;
                if stdout.is_empty() {
                    if let Some(cmd_id) = outcome.cmd_id.as_deref() {
                        match ready.workspace.session_command_logs(&session_id, cmd_id).await {
                            Ok(logs) => stdout = logs,
                            Err(e) => debug!(cmd_id, error = %e, "session log fetch failed"),
                        }
                    }
                }
                ExecResult {
                    stdout,
                    stderr: outcome.error.unwrap_or_default(),
                    exit_code: outcome.exit_code,
                }
            }
            Err(e) => ExecResult::failure(e.to_string()),
        };
        drop(guard);

        preview::annotate(&ready.workspace, &prepared, &mut result).await;
        result
    }

    /// Create the session for a key, degrading to the shared default
    /// session on failure. Creation failures never bubble out; a session
    /// that could not be created at all surfaces on submission as a
    /// transient error.
    async fn acquire_session(&self, ready: &Ready<P::Workspace>, key: &str) -> String {
        let id = format!(
            "exec-session-{}-{}",
            sanitize_key(key),
            self.inner.clock.epoch_ms()
        );
        match ready.workspace.create_session(&id).await {
            Ok(()) => id,
            Err(e) => {
                warn!(session_id = %id, error = %e, "session create failed; using shared default");
                match ready.workspace.create_session(DEFAULT_SESSION_ID).await {
                    Ok(()) => {}
                    Err(e) if e.is_session_exists() => {}
                    Err(e) => {
                        warn!(error = %e, "default session create failed");
                    }
                }
                DEFAULT_SESSION_ID.to_string()
            }
        }
    }

    /// Commands that mention the workspace home get a best-effort existence
    /// probe and folder create first.
    async fn preflight_workspace_home(&self, ready: &Ready<P::Workspace>, cmd: &[String]) {
        if !cmd.iter().any(|arg| arg.contains(WORKSPACE_HOME)) {
            return;
        }
        let probe = format!("test -d {WORKSPACE_HOME} && echo exists || echo missing");
        match ready.workspace.execute_command(&probe, None, None).await {
            Ok(outcome) if outcome.output.contains("exists") => {}
            Ok(_) => {
                if let Err(e) = ready.workspace.create_folder(WORKSPACE_HOME).await {
                    debug!(error = %e, "create_folder failed; trying mkdir");
                    let mkdir = format!("mkdir -p {WORKSPACE_HOME}");
                    if let Err(e) = ready.workspace.execute_command(&mkdir, None, None).await {
                        debug!(error = %e, "mkdir fallback failed");
                    }
                }
            }
            Err(e) => debug!(error = %e, "workspace home probe failed"),
        }
    }
}

/// Whole seconds for the remote; zero or absent forwards nothing.
fn timeout_secs(timeout_ms: Option<u64>) -> Option<u64> {
    timeout_ms.filter(|&ms| ms > 0).map(|ms| ms / 1000)
}

fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
