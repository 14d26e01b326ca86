// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sandbox lifecycle: lazy single-flight init, cleanup, shutdown wiring.

use std::sync::Arc;

use sbx_adapters::{CreateOptions, SandboxProvider, SandboxWorkspace};
use sbx_core::{Clock, PathMapper, SystemClock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::env::Settings;
use crate::error::{InitError, SandboxError};
use crate::session::SessionMap;

/// Directories created under the workspace root after init, in the
/// background; failures are logged and swallowed.
const BOOTSTRAP_DIRS: &[&str] = &["src", "tests", "docs", "config"];

/// Handle to one lazily-created remote workspace.
///
/// Cheap to clone; all clones share the workspace. The caller owns exit
/// wiring: either call [`Sandbox::cleanup`] directly or spawn
/// [`Sandbox::cleanup_on_shutdown`].
pub struct Sandbox<P: SandboxProvider, C: Clock = SystemClock> {
    pub(crate) inner: Arc<Inner<P, C>>,
}

impl<P: SandboxProvider, C: Clock> Clone for Sandbox<P, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

pub(crate) struct Inner<P: SandboxProvider, C> {
    pub(crate) provider: P,
    pub(crate) settings: Settings,
    pub(crate) clock: C,
    /// `None` until first use and again after cleanup. Init runs while the
    /// lock is held, so concurrent callers share one in-flight create.
    state: Mutex<Option<Ready<P::Workspace>>>,
}

/// State of an initialized workspace, shared by all in-flight operations.
pub(crate) struct Ready<W> {
    pub(crate) workspace: W,
    pub(crate) root_dir: String,
    pub(crate) paths: Arc<PathMapper>,
    pub(crate) sessions: Arc<SessionMap>,
}

impl<W: Clone> Clone for Ready<W> {
    fn clone(&self) -> Self {
        Self {
            workspace: self.workspace.clone(),
            root_dir: self.root_dir.clone(),
            paths: Arc::clone(&self.paths),
            sessions: Arc::clone(&self.sessions),
        }
    }
}

impl<P: SandboxProvider> Sandbox<P, SystemClock> {
    pub fn new(provider: P, settings: Settings) -> Self {
        Self::with_clock(provider, settings, SystemClock)
    }
}

impl<P: SandboxProvider, C: Clock> Sandbox<P, C> {
    pub fn with_clock(provider: P, settings: Settings, clock: C) -> Self {
        Self {
            inner: Arc::new(Inner {
                provider,
                settings,
                clock,
                state: Mutex::new(None),
            }),
        }
    }

    /// Id of the remote workspace, creating it if needed.
    pub async fn workspace_id(&self) -> Result<String, SandboxError> {
        Ok(self.ensure_ready().await?.workspace.id().to_string())
    }

    /// Workspace path under which all mapped paths live.
    pub async fn root_dir(&self) -> Result<String, SandboxError> {
        Ok(self.ensure_ready().await?.root_dir)
    }

    /// Return the ready workspace, initializing it on first call.
    ///
    /// Initialization runs while the state lock is held: under N concurrent
    /// callers exactly one create RPC fires and the rest observe the stored
    /// result. A failed init leaves the state empty, so the next caller
    /// retries from scratch.
    pub(crate) async fn ensure_ready(&self) -> Result<Ready<P::Workspace>, SandboxError> {
        let mut state = self.inner.state.lock().await;
        if let Some(ready) = state.as_ref() {
            return Ok(ready.clone());
        }
        let ready = self.initialize().await?;
        *state = Some(ready.clone());
        drop(state);
        self.spawn_bootstrap(ready.clone());
        Ok(ready)
    }

    async fn initialize(&self) -> Result<Ready<P::Workspace>, SandboxError> {
        let opts = CreateOptions {
            auto_stop_interval: self.inner.settings.auto_stop_interval,
        };
        info!(
            region = self.inner.settings.target.as_str(),
            auto_stop_interval = opts.auto_stop_interval,
            "creating remote workspace"
        );
        let workspace = self
            .inner
            .provider
            .create(&opts)
            .await
            .map_err(InitError::Create)?;
        let root_dir = workspace
            .user_root_dir()
            .await
            .map_err(InitError::RootDir)?;
        if root_dir.is_empty() {
            return Err(InitError::EmptyRootDir.into());
        }
        info!(workspace_id = workspace.id(), root_dir = %root_dir, "workspace ready");
        Ok(Ready {
            paths: Arc::new(PathMapper::new(&root_dir)),
            sessions: Arc::new(SessionMap::new()),
            workspace,
            root_dir,
        })
    }

    /// Create the common project directories without blocking the caller.
    fn spawn_bootstrap(&self, ready: Ready<P::Workspace>) {
        tokio::spawn(async move {
            for dir in BOOTSTRAP_DIRS {
                let path = format!("{}/{}", ready.root_dir.trim_end_matches('/'), dir);
                if let Err(e) = ready.workspace.create_folder(&path).await {
                    debug!(path = %path, error = %e, "bootstrap folder skipped");
                }
            }
        });
    }

    /// Tear down the remote workspace.
    ///
    /// Idempotent and safe on a never-initialized sandbox; individual
    /// failures are logged and swallowed so shutdown always completes. A
    /// subsequent operation creates a fresh workspace.
    pub async fn cleanup(&self) {
        let taken = self.inner.state.lock().await.take();
        let Some(ready) = taken else {
            return;
        };
        for session_id in ready.sessions.drain() {
            if let Err(e) = ready.workspace.delete_session(&session_id).await {
                warn!(session_id = %session_id, error = %e, "failed to delete remote session");
            }
        }
        if let Err(e) = self.inner.provider.remove(&ready.workspace).await {
            warn!(error = %e, "failed to remove remote workspace");
        }
        info!(workspace_id = ready.workspace.id(), "sandbox cleanup complete");
    }

    /// Wait for ctrl-c or SIGTERM, then tear the workspace down.
    ///
    /// Spawn this alongside the main loop when the process should release
    /// the workspace on termination.
    pub async fn cleanup_on_shutdown(&self) {
        shutdown_signal().await;
        info!("termination signal received; cleaning up sandbox");
        self.cleanup().await;
    }
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            warn!(error = %e, "SIGTERM handler unavailable; waiting on ctrl-c only");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
