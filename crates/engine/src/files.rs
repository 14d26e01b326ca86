// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File transfer operations between host paths and the remote workspace.

use sbx_adapters::{PreviewLink, SandboxProvider, SandboxWorkspace};
use sbx_core::Clock;
use tracing::{debug, warn};

use crate::error::SandboxError;
use crate::lifecycle::Sandbox;
use crate::preview;

impl<P: SandboxProvider, C: Clock> Sandbox<P, C> {
    /// Write `content` to the workspace path mapped from `host_path`.
    ///
    /// Best-effort: the parent directory is created if missing and the
    /// write is verified with `test -f`. Returns whether the file is
    /// observably present afterwards.
    pub async fn upload_file(&self, host_path: &str, content: &str) -> Result<bool, SandboxError> {
        let ready = self.ensure_ready().await?;
        let remote = ready.paths.map(host_path);
        if let Some(dir) = parent_dir(&remote) {
            if let Err(e) = ready.workspace.create_folder(dir).await {
                debug!(dir, error = %e, "parent folder create skipped");
            }
        }
        if let Err(e) = ready.workspace.upload_file(&remote, content.as_bytes()).await {
            warn!(path = %remote, error = %e, "upload failed");
            return Ok(false);
        }
        Ok(self.verify_file_exists(&ready, &remote).await)
    }

    /// Read a workspace file through `cat`.
    ///
    /// Returns the empty string when the file is absent or unreadable.
    pub async fn download_file(&self, path: &str) -> Result<String, SandboxError> {
        let ready = self.ensure_ready().await?;
        let remote = ready.paths.map(path);
        let command = format!("cat \"{}\"", remote);
        match ready.workspace.execute_command(&command, None, None).await {
            Ok(outcome) if outcome.exit_code == 0 => Ok(outcome.output),
            Ok(_) => Ok(String::new()),
            Err(e) => {
                debug!(path = %remote, error = %e, "download failed");
                Ok(String::new())
            }
        }
    }

    /// Public URL for a port inside the workspace, synthesized from the
    /// workspace id when the provider offers none.
    pub async fn preview_link(&self, port: u16) -> Result<PreviewLink, SandboxError> {
        let ready = self.ensure_ready().await?;
        Ok(match ready.workspace.preview_link(port).await {
            Ok(link) => link,
            Err(e) => {
                debug!(port, error = %e, "provider preview link unavailable; synthesizing");
                preview::synthesize(ready.workspace.id(), port)
            }
        })
    }
}

/// Directory component of a workspace path, if it has one.
pub(crate) fn parent_dir(remote: &str) -> Option<&str> {
    let (dir, _) = remote.rsplit_once('/')?;
    if dir.is_empty() {
        return None;
    }
    Some(dir)
}

#[cfg(test)]
#[path = "files_tests.rs"]
mod tests;
