// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for envelope encoding and the tolerant decoder.

use super::{decode, encode};
use sbx_core::ExecResult;

#[test]
fn encode_success_omits_error() {
    let json = encode(&ExecResult::ok("hello\n"), 0.25);
    assert_eq!(
        json,
        r#"{"output":"hello\n","metadata":{"exit_code":0,"duration_seconds":0.25}}"#
    );
}

#[test]
fn encode_failure_carries_stderr_as_error() {
    let json = encode(&ExecResult::failure("boom"), 1.5);
    let decoded = decode(&json);
    assert_eq!(decoded.metadata.exit_code, 1);
    assert_eq!(decoded.metadata.error.as_deref(), Some("boom"));
}

#[test]
fn decode_round_trips_encoded_envelopes() {
    let result = ExecResult {
        stdout: "out".to_string(),
        stderr: "err".to_string(),
        exit_code: 7,
    };
    let decoded = decode(&encode(&result, 2.0));
    assert_eq!(decoded.output, "out");
    assert_eq!(decoded.metadata.exit_code, 7);
    assert_eq!(decoded.metadata.duration_seconds, 2.0);
    assert_eq!(decoded.metadata.error.as_deref(), Some("err"));
}

#[yare::parameterized(
    begin_patch = { "*** Begin Patch\n*** End Patch" },
    add_file = { "*** Add File: a.txt" },
    created = { "Created hello.py\n" },
)]
fn patch_echoes_decode_as_success(raw: &str) {
    let decoded = decode(raw);
    assert_eq!(decoded.metadata.exit_code, 0);
    assert_eq!(decoded.output, raw);
}

#[test]
fn unrecognized_input_decodes_to_a_failure_report() {
    let decoded = decode("garbage output");
    assert_eq!(decoded.metadata.exit_code, 1);
    assert_eq!(decoded.output, "Failed to parse output: garbage output…");
}

#[test]
fn long_unrecognized_input_is_truncated_to_100_chars() {
    let raw = "x".repeat(500);
    let decoded = decode(&raw);
    assert_eq!(
        decoded.output,
        format!("Failed to parse output: {}…", "x".repeat(100))
    );
}

#[test]
fn json_without_the_envelope_shape_is_not_an_envelope() {
    let decoded = decode(r#"{"stdout": "hi"}"#);
    assert_eq!(decoded.metadata.exit_code, 1);
    assert!(decoded.output.starts_with("Failed to parse output:"));
}
