// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Envelope encoding and the tolerant decoder.

use sbx_core::ExecResult;
use serde::{Deserialize, Serialize};

/// Raw strings starting with one of these are a patch echo: treated as a
/// successful result rather than a decode failure.
const PATCH_ECHO_PREFIXES: &[&str] = &["*** Begin Patch", "*** Add File:", "Created "];

/// Unrecognized input is truncated to this many characters in the report.
const PARSE_SNIPPET_LEN: usize = 100;

/// The serialized result shape consumed by the outer assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolEnvelope {
    pub output: String,
    pub metadata: ToolMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub exit_code: i32,
    pub duration_seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolEnvelope {
    fn success(output: String) -> Self {
        Self {
            output,
            metadata: ToolMetadata {
                exit_code: 0,
                duration_seconds: 0.0,
                error: None,
            },
        }
    }
}

/// Serialize an exec result into the envelope JSON.
pub fn encode(result: &ExecResult, duration_seconds: f64) -> String {
    let envelope = ToolEnvelope {
        output: result.stdout.clone(),
        metadata: ToolMetadata {
            exit_code: result.exit_code,
            duration_seconds,
            error: (!result.stderr.is_empty()).then(|| result.stderr.clone()),
        },
    };
    match serde_json::to_string(&envelope) {
        Ok(json) => json,
        // String/number serialization cannot fail; keep the surface total anyway.
        Err(_) => String::from(
            r#"{"output":"","metadata":{"exit_code":1,"duration_seconds":0.0,"error":"encode failed"}}"#,
        ),
    }
}

/// Decode a tool-call result: envelope JSON, a recognized raw patch echo,
/// or a decode-failure report. Never errors.
pub fn decode(raw: &str) -> ToolEnvelope {
    if let Ok(envelope) = serde_json::from_str::<ToolEnvelope>(raw) {
        return envelope;
    }
    if PATCH_ECHO_PREFIXES.iter().any(|p| raw.starts_with(p)) {
        return ToolEnvelope::success(raw.to_string());
    }
    let snippet: String = raw.chars().take(PARSE_SNIPPET_LEN).collect();
    ToolEnvelope {
        output: format!("Failed to parse output: {}…", snippet),
        metadata: ToolMetadata {
            exit_code: 1,
            duration_seconds: 0.0,
            error: None,
        },
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "property_tests.rs"]
mod property_tests;
