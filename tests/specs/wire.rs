// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire specs
//!
//! Exec and patch results serialize into the tool-call envelope and decode
//! back, including the raw patch-echo fallback.

use crate::prelude::sandbox;
use sbx_core::ExecInput;
use sbx_wire::{decode, encode};

#[tokio::test]
async fn exec_result_round_trips_through_the_envelope() {
    let (sandbox, _provider) = sandbox();
    let result = sandbox.exec(ExecInput::new(["echo", "hello"])).await.unwrap();

    let json = encode(&result, 0.1);
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["output"], "hello\n");
    assert_eq!(parsed["metadata"]["exit_code"], 0);

    let decoded = decode(&json);
    assert_eq!(decoded.output, result.stdout);
    assert_eq!(decoded.metadata.exit_code, result.exit_code);
}

#[tokio::test]
async fn patch_success_log_decodes_as_a_patch_echo() {
    let (sandbox, _provider) = sandbox();
    let patch = "*** Begin Patch\n\
                 *** Add File: hello.py\n\
                 +print(\"hi\")\n\
                 *** End of File\n\
                 *** End Patch";
    let result = sandbox.apply_patch(patch).await.unwrap();

    // A consumer that receives the raw success log still decodes it.
    let decoded = decode(&result.stdout);
    assert_eq!(decoded.metadata.exit_code, 0);
    assert_eq!(decoded.output, "Created hello.py\n");
}

#[test]
fn unrecognized_payloads_decode_to_a_bounded_report() {
    let decoded = decode("?!");
    assert_eq!(decoded.metadata.exit_code, 1);
    assert!(decoded.output.starts_with("Failed to parse output:"));
}
