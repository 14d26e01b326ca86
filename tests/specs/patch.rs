// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Patch specs
//!
//! Add-file patches round-trip through the remote filesystem and per-file
//! failures never fail the whole patch.

use crate::prelude::sandbox;
use similar_asserts::assert_eq;

const HELLO_PATCH: &str = "*** Begin Patch\n\
                           *** Add File: hello.py\n\
                           +print(\"hi\")\n\
                           *** End of File\n\
                           *** End Patch";

/// The spec's add-file scenario: `Created hello.py` and the exact content
/// lands at the mapped workspace path.
#[tokio::test]
async fn add_file_patch() {
    let (sandbox, provider) = sandbox();
    let result = sandbox.apply_patch(HELLO_PATCH).await.unwrap();
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout, "Created hello.py\n");
    assert_eq!(result.stderr, "");
    assert_eq!(
        provider.file("/home/daytona/hello.py").unwrap(),
        b"print(\"hi\")\n".to_vec()
    );
}

/// A patch of only add blocks round-trips: downloading each target
/// reproduces the added content.
#[tokio::test]
async fn add_patch_round_trips_through_download() {
    let (sandbox, _provider) = sandbox();
    let patch = "*** Begin Patch\n\
                 *** Add File: a.txt\n\
                 +first file\n\
                 *** Add File: nested/b.txt\n\
                 +second\n\
                 +file\n\
                 *** End of File\n\
                 *** End Patch";
    let result = sandbox.apply_patch(patch).await.unwrap();
    assert_eq!(result.stdout, "Created a.txt\nCreated nested/b.txt\n");

    assert_eq!(sandbox.download_file("a.txt").await.unwrap(), "first file\n");
    assert_eq!(
        sandbox.download_file("nested/b.txt").await.unwrap(),
        "second\nfile\n"
    );
}

/// Uploading then downloading through the public API returns the content
/// unchanged.
#[tokio::test]
async fn upload_download_round_trip() {
    let (sandbox, _provider) = sandbox();
    let content = "line one\nline two\n";
    assert!(sandbox.upload_file("notes/today.md", content).await.unwrap());
    assert_eq!(
        sandbox.download_file("notes/today.md").await.unwrap(),
        content
    );
}

#[tokio::test]
async fn malformed_patch_reports_parse_error() {
    let (sandbox, _provider) = sandbox();
    let result = sandbox.apply_patch("*** Begin Patch\nno end marker").await.unwrap();
    assert_eq!(result.exit_code, 1);
    assert!(result.stderr.contains("End Patch"));
}

#[tokio::test]
async fn failed_file_is_reported_but_patch_succeeds() {
    let (sandbox, provider) = sandbox();
    provider.fail_upload(true);
    let result = sandbox.apply_patch(HELLO_PATCH).await.unwrap();
    assert_eq!(result.exit_code, 0);
    assert!(result.stdout.starts_with("Error creating hello.py:"));
}
