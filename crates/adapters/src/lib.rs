// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapters binding the sandbox engine to remote workspace providers.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod provider;

pub use provider::daytona::{DaytonaConfig, DaytonaProvider, DaytonaWorkspace, DEFAULT_API_URL};
pub use provider::{
    CommandOutcome, CreateOptions, PreviewLink, ProviderError, SandboxProvider, SandboxWorkspace,
    SessionCommand,
};

#[cfg(any(test, feature = "test-support"))]
pub use provider::fake::{FakeProvider, FakeWorkspace, ProviderCall};
