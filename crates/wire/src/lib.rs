// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tool-call result envelope shared with the outer assistant.
//!
//! Wire format: `{"output": string, "metadata": {"exit_code": int,
//! "duration_seconds": number, "error"?: string}}`. Decoding also accepts a
//! raw patch echo, so a consumer never sees an undecodable result.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod envelope;

pub use envelope::{decode, encode, ToolEnvelope, ToolMetadata};
