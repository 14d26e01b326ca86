// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle specs
//!
//! Verify single-flight creation under concurrency and that cleanup fully
//! resets the sandbox.

use crate::prelude::sandbox;
use sbx_core::ExecInput;

/// Five concurrent execs on a fresh process: the create RPC is observed
/// exactly once and every call lands in the same workspace.
#[tokio::test]
async fn concurrent_execs_share_one_workspace() {
    let (sandbox, provider) = sandbox();
    let mut handles = Vec::new();
    for i in 0..5 {
        let sandbox = sandbox.clone();
        handles.push(tokio::spawn(async move {
            sandbox
                .exec(ExecInput::new(["echo".to_string(), format!("caller-{i}")]))
                .await
        }));
    }
    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.exit_code, 0);
    }
    assert_eq!(provider.create_calls(), 1);
    assert_eq!(sandbox.workspace_id().await.unwrap(), "sandbox-1");
}

/// Cleanup deletes every session, removes the workspace, and the next
/// operation starts from scratch.
#[tokio::test]
async fn cleanup_then_reinitialize() {
    let (sandbox, provider) = sandbox();
    sandbox
        .exec(ExecInput::new(["true"]).workdir("/Users/alice/a"))
        .await
        .unwrap();
    sandbox
        .exec(ExecInput::new(["true"]).workdir("/Users/alice/b"))
        .await
        .unwrap();
    assert_eq!(provider.sessions().len(), 2);

    sandbox.cleanup().await;
    assert!(provider.sessions().is_empty());
    assert_eq!(provider.remove_calls(), 1);

    sandbox.exec(ExecInput::new(["true"])).await.unwrap();
    assert_eq!(provider.create_calls(), 2);
    assert_eq!(provider.sessions().len(), 1);
}

/// Cleanup on a sandbox that never initialized performs no remote calls.
#[tokio::test]
async fn cleanup_without_init_is_silent() {
    let (sandbox, provider) = sandbox();
    sandbox.cleanup().await;
    assert!(provider.calls().is_empty());
}
