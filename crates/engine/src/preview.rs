// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Web-server detection and preview-link annotation.
//!
//! A backgrounded server returns no useful stdout of its own, so results
//! that look like a server launch are annotated with a public preview URL:
//! a banner in stdout and a one-line summary duplicated into stderr so the
//! annotation survives stdout truncation.

use std::sync::LazyLock;

use regex::Regex;
use sbx_adapters::{PreviewLink, SandboxWorkspace};
use sbx_core::ExecResult;
use tracing::debug;

/// Token reported when the provider did not issue one.
const FALLBACK_TOKEN: &str = "auth-required";

#[allow(clippy::expect_used)]
fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("static pattern compiles")
}

static RUNNING_ON: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"Running on http://[^\s:]+:(\d+)"));

static LISTENING: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)(?:listening|started|running|server)[^\n]*?(?:port|:)\s*(\d+)")
});

static PORT_FLAG: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?:--port[= ]|-p\s+)(\d+)"));

/// Annotate a server-launch result with its preview link.
pub(crate) async fn annotate<W: SandboxWorkspace>(
    workspace: &W,
    command: &str,
    result: &mut ExecResult,
) {
    if !looks_like_server(command) {
        return;
    }
    let port = resolve_port(command, &result.stdout);
    let link = match workspace.preview_link(port).await {
        Ok(link) => link,
        Err(e) => {
            debug!(port, error = %e, "provider preview link unavailable; synthesizing");
            synthesize(workspace.id(), port)
        }
    };
    result.stdout.push_str(&format!(
        "\n\n====== PREVIEW LINK ======\n{}\n=========================\n",
        link.url
    ));
    result.stderr.push_str(&format!(
        "\nPREVIEW LINK: {}\nLOCAL ACCESS: http://localhost:{}\n",
        link.url, port
    ));
}

/// Heuristic: does the prepared command look like a web-server launch?
fn looks_like_server(command: &str) -> bool {
    const MARKERS: &[&str] = &["server", "serve", "express", "http-server", "live-server"];
    command.contains("flask run")
        || (command.contains("python") && command.contains("app.py"))
        || command.contains("node ")
        || command.contains("npm start")
        || command.contains("npm run dev")
        || command.contains("npx")
        || command.contains("rails server")
        || command.contains("rails s")
        || MARKERS.iter().any(|m| command.contains(m))
}

/// Resolve the server port: stdout's own URL first, then listening
/// banners, then an explicit flag, then framework defaults.
fn resolve_port(command: &str, stdout: &str) -> u16 {
    if let Some(port) = capture_port(&RUNNING_ON, stdout) {
        return port;
    }
    if let Some(port) = capture_port(&LISTENING, stdout) {
        return port;
    }
    if let Some(port) = capture_port(&PORT_FLAG, command) {
        return port;
    }
    default_port(command)
}

fn capture_port(re: &Regex, haystack: &str) -> Option<u16> {
    re.captures(haystack)?.get(1)?.as_str().parse().ok()
}

fn default_port(command: &str) -> u16 {
    if command.contains("flask") || (command.contains("python") && command.contains("app.py")) {
        5000
    } else if command.contains("rails") || command.contains("next") || command.contains("vite") {
        3000
    } else {
        8000
    }
}

/// Provider-shaped preview URL built from the workspace id.
pub(crate) fn synthesize(workspace_id: &str, port: u16) -> PreviewLink {
    let prefix = workspace_id.get(..6).unwrap_or(workspace_id);
    PreviewLink {
        url: format!("https://{}-{}.{}.daytona.work", port, workspace_id, prefix),
        token: FALLBACK_TOKEN.to_string(),
    }
}

#[cfg(test)]
#[path = "preview_tests.rs"]
mod tests;
