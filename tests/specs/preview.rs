// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Preview specs
//!
//! Server launches come back annotated with a preview link, in stdout and
//! duplicated into stderr.

use crate::prelude::sandbox;
use sbx_adapters::ProviderCall;
use sbx_core::ExecInput;

/// Flask-style launch: backgrounded, annotated with the synthesized
/// preview URL for the framework default port.
#[tokio::test]
async fn flask_launch_gets_a_preview_banner() {
    let (sandbox, provider) = sandbox();
    let result = sandbox.exec(ExecInput::new(["python", "app.py"])).await.unwrap();

    assert!(result.stdout.contains("====== PREVIEW LINK ======"));
    assert!(result.stdout.contains("https://5000-sandbox-1.sandbo.daytona.work"));
    assert!(result.stdout.contains("========================="));
    assert!(result.stderr.contains("\nPREVIEW LINK: https://5000-sandbox-1.sandbo.daytona.work"));
    assert!(result.stderr.contains("LOCAL ACCESS: http://localhost:5000"));

    // The launch itself was backgrounded with output captured to a log.
    let launched = provider.calls().iter().any(|c| matches!(
        c,
        ProviderCall::SessionCommand { command, .. }
            if command.contains("nohup python /home/daytona/app.py > flask.log 2>&1 &")
    ));
    assert!(launched);
}

/// An explicit port flag beats the framework default.
#[tokio::test]
async fn port_flag_overrides_default() {
    let (sandbox, _provider) = sandbox();
    let result = sandbox
        .exec(ExecInput::new(["http-server", "--port=9090"]))
        .await
        .unwrap();
    assert!(result.stderr.contains("LOCAL ACCESS: http://localhost:9090"));
}

/// Provider-issued preview links are used verbatim when available.
#[tokio::test]
async fn provider_link_wins() {
    let (sandbox, provider) = sandbox();
    provider.set_preview("https://issued.example.test", "tok");
    let result = sandbox.exec(ExecInput::new(["flask", "run"])).await.unwrap();
    assert!(result.stdout.contains("https://issued.example.test"));
}

/// Ordinary commands get no annotation.
#[tokio::test]
async fn non_server_commands_are_untouched() {
    let (sandbox, _provider) = sandbox();
    let result = sandbox.exec(ExecInput::new(["cargo", "build"])).await.unwrap();
    assert!(!result.stdout.contains("PREVIEW LINK"));
    assert!(result.stderr.is_empty());
}
