// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exec specs
//!
//! End-to-end command execution: preparation, session routing, and failure
//! mapping as seen through the public API.

use crate::prelude::sandbox;
use sbx_adapters::ProviderCall;
use sbx_core::{ExecInput, ExecResult};
use tokio_util::sync::CancellationToken;

fn submitted_commands(provider: &sbx_adapters::FakeProvider) -> Vec<String> {
    provider
        .calls()
        .iter()
        .filter_map(|call| match call {
            ProviderCall::SessionCommand { command, .. } => Some(command.clone()),
            _ => None,
        })
        .collect()
}

/// Simple rooted run: `echo hello` comes back with its output and the
/// prepared command pins cwd to the workspace root and wraps the echo.
#[tokio::test]
async fn simple_rooted_run() {
    let (sandbox, provider) = sandbox();
    let result = sandbox.exec(ExecInput::new(["echo", "hello"])).await.unwrap();
    assert_eq!(
        result,
        ExecResult {
            stdout: "hello\n".to_string(),
            stderr: String::new(),
            exit_code: 0,
        }
    );
    let commands = submitted_commands(&provider);
    assert_eq!(commands, vec![
        "cd /home/daytona && /bin/sh -c 'echo hello'".to_string()
    ]);
}

/// Host-home workdirs map into the workspace and key the session.
#[tokio::test]
async fn host_home_workdir_maps_and_keys_session() {
    let (sandbox, provider) = sandbox();
    sandbox
        .exec(ExecInput::new(["ls"]).workdir("/Users/alice/project"))
        .await
        .unwrap();

    let commands = submitted_commands(&provider);
    assert!(commands[0].starts_with("cd /home/daytona/project && "));

    let session_creates: Vec<String> = provider
        .calls()
        .iter()
        .filter_map(|c| match c {
            ProviderCall::CreateSession { session_id } => Some(session_id.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(session_creates.len(), 1);
    assert!(session_creates[0].starts_with("exec-session--Users-alice-project-"));
}

#[tokio::test]
async fn empty_argv_is_rejected_locally() {
    let (sandbox, provider) = sandbox();
    let result = sandbox.exec(ExecInput::new(Vec::<String>::new())).await.unwrap();
    assert_eq!(result, ExecResult::failure("empty command"));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn remote_failures_surface_as_nonzero_exit() {
    let (sandbox, provider) = sandbox();
    provider.fail_session_commands(true);
    let result = sandbox.exec(ExecInput::new(["true"])).await.unwrap();
    assert_eq!(result.exit_code, 1);
    assert!(!result.stderr.is_empty());
}

#[tokio::test]
async fn cancellation_reports_cancelled() {
    let (sandbox, provider) = sandbox();
    provider.hang_session_commands(true);
    let cancel = CancellationToken::new();

    let pending = tokio::spawn({
        let sandbox = sandbox.clone();
        let cancel = cancel.clone();
        async move { sandbox.exec_with_cancel(ExecInput::new(["true"]), cancel).await }
    });
    tokio::task::yield_now().await;
    cancel.cancel();

    let result = pending.await.unwrap().unwrap();
    assert_eq!(result, ExecResult::failure("cancelled"));
}

/// The timeout rewrite backgrounds the command, sleeps, and kills the pid.
#[tokio::test]
async fn timeout_rewrite_shape() {
    let (sandbox, provider) = sandbox();
    let result = sandbox
        .exec(ExecInput::new(["timeout", "2", "sleep", "10"]))
        .await
        .unwrap();
    assert_eq!(result.exit_code, 0);

    let commands = submitted_commands(&provider);
    assert_eq!(
        commands[0],
        "cd /home/daytona && /bin/sh -c 'sleep 10 & pid=$!; sleep 2; \
         kill $pid 2>/dev/null || true; wait $pid 2>/dev/null || true'"
    );
}
