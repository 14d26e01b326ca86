// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures for the engine crate.

use sbx_adapters::FakeProvider;
use sbx_core::FakeClock;

use crate::env::{Settings, Target};
use crate::lifecycle::Sandbox;

pub(crate) fn settings() -> Settings {
    Settings {
        api_key: "test-key".to_string(),
        api_url: None,
        target: Target::Us,
        auto_stop_interval: 30,
    }
}

pub(crate) fn sandbox() -> (Sandbox<FakeProvider, FakeClock>, FakeProvider) {
    let provider = FakeProvider::new();
    let sandbox = Sandbox::with_clock(provider.clone(), settings(), FakeClock::new());
    (sandbox, provider)
}
