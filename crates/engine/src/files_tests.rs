// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for file transfer operations.

use sbx_adapters::ProviderCall;

use super::parent_dir;
use crate::test_helpers::sandbox;

#[yare::parameterized(
    nested = { "/home/daytona/src/main.rs", Some("/home/daytona/src") },
    top_level = { "/file.txt", None },
    no_separator = { "file.txt", None },
)]
fn parent_dir_cases(path: &str, expected: Option<&str>) {
    assert_eq!(parent_dir(path), expected);
}

#[tokio::test]
async fn upload_creates_parent_and_verifies() {
    let (sandbox, provider) = sandbox();
    let uploaded = sandbox
        .upload_file("project/notes.txt", "remember\n")
        .await
        .unwrap();
    assert!(uploaded);
    assert_eq!(
        provider.file("/home/daytona/project/notes.txt").unwrap(),
        b"remember\n"
    );
    assert!(provider.calls().iter().any(|c| matches!(
        c,
        ProviderCall::CreateFolder { path } if path == "/home/daytona/project"
    )));
}

#[tokio::test]
async fn upload_reports_false_when_write_is_lost() {
    let (sandbox, provider) = sandbox();
    provider.drop_uploads(true);
    let uploaded = sandbox.upload_file("a.txt", "x").await.unwrap();
    assert!(!uploaded);
}

#[tokio::test]
async fn upload_reports_false_on_remote_error() {
    let (sandbox, provider) = sandbox();
    provider.fail_upload(true);
    let uploaded = sandbox.upload_file("a.txt", "x").await.unwrap();
    assert!(!uploaded);
}

#[tokio::test]
async fn download_round_trips_uploaded_content() {
    let (sandbox, _provider) = sandbox();
    sandbox.upload_file("data.txt", "payload").await.unwrap();
    let content = sandbox.download_file("/home/daytona/data.txt").await.unwrap();
    assert_eq!(content, "payload");
}

#[tokio::test]
async fn download_of_absent_file_is_empty() {
    let (sandbox, _provider) = sandbox();
    let content = sandbox.download_file("nope.txt").await.unwrap();
    assert_eq!(content, "");
}

#[tokio::test]
async fn preview_link_synthesizes_when_provider_has_none() {
    let (sandbox, _provider) = sandbox();
    let link = sandbox.preview_link(8080).await.unwrap();
    assert_eq!(link.url, "https://8080-sandbox-1.sandbo.daytona.work");
    assert_eq!(link.token, "auth-required");
}

#[tokio::test]
async fn preview_link_uses_provider_issued_url() {
    let (sandbox, provider) = sandbox();
    provider.set_preview("https://issued.example.test", "tok-1");
    let link = sandbox.preview_link(3000).await.unwrap();
    assert_eq!(link.url, "https://issued.example.test");
    assert_eq!(link.token, "tok-1");
}
