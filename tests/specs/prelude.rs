// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the integration specs.

use sbx_adapters::FakeProvider;
use sbx_core::FakeClock;
use sbx_engine::{env::Target, Sandbox, Settings};

pub fn settings() -> Settings {
    Settings {
        api_key: "spec-key".to_string(),
        api_url: None,
        target: Target::Us,
        auto_stop_interval: 30,
    }
}

/// Sandbox over a fresh fake provider with a pinned clock.
pub fn sandbox() -> (Sandbox<FakeProvider, FakeClock>, FakeProvider) {
    let provider = FakeProvider::new();
    let sandbox = Sandbox::with_clock(provider.clone(), settings(), FakeClock::new());
    (sandbox, provider)
}
