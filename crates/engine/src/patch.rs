// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal add/delete patch grammar and its application.
//!
//! A patch opens with `*** Begin Patch` and closes with `*** End Patch`.
//! Between them: `*** Add File: <path>` blocks of `+`-prefixed content
//! lines, standalone `*** Delete File: <path>` directives, and terminators
//! (`*** End of File`, the next directive). `*** Update File:` is parsed as
//! a terminator only; update semantics are out of scope.
//!
//! Malformed outer markers fail the whole patch; per-file failures are
//! reported as lines in the success log and do not fail the rest.

use sbx_adapters::{ProviderError, SandboxProvider, SandboxWorkspace};
use sbx_core::{Clock, ExecResult};
use thiserror::Error;
use tracing::debug;

use crate::error::SandboxError;
use crate::files::parent_dir;
use crate::lifecycle::{Ready, Sandbox};

const PATCH_BEGIN: &str = "*** Begin Patch";
const PATCH_END: &str = "*** End Patch";
const ADD_FILE: &str = "*** Add File: ";
const DELETE_FILE: &str = "*** Delete File: ";
const UPDATE_FILE: &str = "*** Update File: ";
const END_OF_FILE: &str = "*** End of File";

/// One parsed patch operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOp {
    Add { path: String, content: String },
    Delete { path: String },
}

/// Malformed outer markers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("patch must start with \"*** Begin Patch\"")]
    MissingBegin,

    #[error("patch must end with \"*** End Patch\"")]
    MissingEnd,
}

/// Parse a patch into its operations.
pub fn parse_patch(text: &str) -> Result<Vec<PatchOp>, PatchError> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.first().map(|l| l.trim_end()) != Some(PATCH_BEGIN) {
        return Err(PatchError::MissingBegin);
    }
    if lines.last().map(|l| l.trim_end()) != Some(PATCH_END) {
        return Err(PatchError::MissingEnd);
    }

    let mut ops = Vec::new();
    let mut open: Option<(String, String)> = None;

    for line in &lines[1..lines.len() - 1] {
        if let Some(path) = line.strip_prefix(ADD_FILE) {
            close_open(&mut open, &mut ops);
            open = Some((path.trim().to_string(), String::new()));
        } else if let Some(path) = line.strip_prefix(DELETE_FILE) {
            close_open(&mut open, &mut ops);
            ops.push(PatchOp::Delete {
                path: path.trim().to_string(),
            });
        } else if line.trim_end() == END_OF_FILE || line.starts_with(UPDATE_FILE) {
            // Update directives only terminate the preceding add.
            close_open(&mut open, &mut ops);
        } else if let Some(body) = line.strip_prefix('+') {
            if let Some((_, content)) = open.as_mut() {
                content.push_str(body);
                content.push('\n');
            }
        }
        // Anything else between operations is ignored.
    }
    close_open(&mut open, &mut ops);
    Ok(ops)
}

fn close_open(open: &mut Option<(String, String)>, ops: &mut Vec<PatchOp>) {
    if let Some((path, content)) = open.take() {
        ops.push(PatchOp::Add { path, content });
    }
}

impl<P: SandboxProvider, C: Clock> Sandbox<P, C> {
    /// Apply a patch against the remote filesystem.
    ///
    /// A well-formed patch always exits 0; per-file failures are reported
    /// as `Error creating/deleting` lines in stdout. Malformed outer
    /// markers exit 1 with the parse error in stderr.
    pub async fn apply_patch(&self, patch: &str) -> Result<ExecResult, SandboxError> {
        let ready = self.ensure_ready().await?;
        let ops = match parse_patch(patch) {
            Ok(ops) => ops,
            Err(e) => return Ok(ExecResult::failure(e.to_string())),
        };

        let mut log = String::new();
        for op in ops {
            match op {
                PatchOp::Add { path, content } => {
                    self.apply_add(&ready, &path, &content, &mut log).await;
                }
                PatchOp::Delete { path } => {
                    let remote = ready.paths.map(&path);
                    match ready.workspace.delete_file(&remote).await {
                        Ok(()) => log.push_str(&format!("Deleted {}\n", path)),
                        Err(e) => log.push_str(&format!("Error deleting {}: {}\n", path, e)),
                    }
                }
            }
        }
        if log.is_empty() {
            log.push_str("Patch applied successfully");
        }
        Ok(ExecResult::ok(log))
    }

    async fn apply_add(
        &self,
        ready: &Ready<P::Workspace>,
        path: &str,
        content: &str,
        log: &mut String,
    ) {
        let remote = ready.paths.map(path);
        if let Some(dir) = parent_dir(&remote) {
            if let Err(e) = ready.workspace.create_folder(dir).await {
                debug!(dir, error = %e, "parent folder create skipped");
            }
        }
        match self.upload_and_verify(ready, &remote, content).await {
            Ok(true) => log.push_str(&format!("Created {}\n", path)),
            Ok(false) => {
                // Upload landed nowhere the shell can see; push the bytes
                // through the session shell instead.
                let escaped = content.trim_end_matches('\n').replace('\'', "'\\''");
                let fallback = format!("echo '{}' > \"{}\"", escaped, remote);
                match ready.workspace.execute_command(&fallback, None, None).await {
                    Ok(_) => log.push_str(&format!("Created {} (using echo fallback)\n", path)),
                    Err(e) => log.push_str(&format!("Error creating {}: {}\n", path, e)),
                }
            }
            Err(e) => log.push_str(&format!("Error creating {}: {}\n", path, e)),
        }
    }

    async fn upload_and_verify(
        &self,
        ready: &Ready<P::Workspace>,
        remote: &str,
        content: &str,
    ) -> Result<bool, ProviderError> {
        ready.workspace.upload_file(remote, content.as_bytes()).await?;
        Ok(self.verify_file_exists(ready, remote).await)
    }

    /// Shell-level existence check for a just-written file.
    pub(crate) async fn verify_file_exists(
        &self,
        ready: &Ready<P::Workspace>,
        remote: &str,
    ) -> bool {
        let probe = format!("test -f \"{}\" && echo exists || echo missing", remote);
        match ready.workspace.execute_command(&probe, None, None).await {
            Ok(outcome) => outcome.output.contains("exists"),
            Err(e) => {
                debug!(remote, error = %e, "existence probe failed");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "patch_tests.rs"]
mod tests;
