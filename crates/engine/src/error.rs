// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error taxonomy.
//!
//! Only configuration and initialization failures propagate as errors; every
//! steady-state remote failure is folded into an `ExecResult` value so the
//! tool-call surface stays uniform.

use sbx_adapters::ProviderError;
use thiserror::Error;

/// Environment contract violations, raised only from init.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("DAYTONA_API_KEY is not set")]
    MissingApiKey,

    #[error("DAYTONA_API_KEY may only contain letters, digits, '_', '-' and '.'")]
    InvalidApiKey,

    #[error("DAYTONA_TARGET must be \"us\" or \"eu\", got {0:?}")]
    InvalidTarget(String),
}

/// Remote workspace bring-up failures, raised only from init.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to construct provider client: {0}")]
    Client(#[source] ProviderError),

    #[error("workspace create failed: {0}")]
    Create(#[source] ProviderError),

    #[error("workspace root dir query failed: {0}")]
    RootDir(#[source] ProviderError),

    #[error("workspace returned an empty root directory")]
    EmptyRootDir,
}

/// The only error type surfaced by sandbox operations.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Init(#[from] InitError),
}
