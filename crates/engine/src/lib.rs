// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote sandbox execution engine.
//!
//! Turns locally-shaped operations (argv + working directory, patches, file
//! reads/writes) into a safe sequence of RPCs against a remote workspace:
//! lazy single-flight workspace creation, host-to-workspace path mapping,
//! command preparation for the remote shell, per-working-directory session
//! reuse, preview-link annotation, and guaranteed teardown.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod env;
mod error;
mod files;
mod lifecycle;
mod patch;
mod prepare;
mod preview;
mod session;
#[cfg(test)]
mod test_helpers;

pub use env::Settings;
pub use error::{ConfigError, InitError, SandboxError};
pub use lifecycle::Sandbox;
pub use patch::{parse_patch, PatchError, PatchOp};

use sbx_adapters::{DaytonaConfig, DaytonaProvider, DEFAULT_API_URL};

/// Build a sandbox against the Daytona provider from the environment
/// contract (`DAYTONA_API_KEY` et al).
///
/// The workspace itself is created lazily on first use.
pub fn connect_from_env() -> Result<Sandbox<DaytonaProvider>, SandboxError> {
    let settings = env::load()?;
    let provider = DaytonaProvider::new(DaytonaConfig {
        api_key: settings.api_key.clone(),
        api_url: settings
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        target: settings.target.as_str().to_string(),
    })
    .map_err(InitError::Client)?;
    Ok(Sandbox::new(provider, settings))
}
