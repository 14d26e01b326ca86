// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command preparation: argv to a single shell string for the remote.
//!
//! The remote process API takes one string, and several quoting,
//! redirection, and process-lifetime patterns round-trip badly when that
//! string is re-split remotely. A finite table of rewrites produces explicit
//! `/bin/sh -c` forms for the known-misbehaving patterns (`timeout` has no
//! reliable remote binary; `nohup` and server launches otherwise block the
//! RPC and return nothing). Anything unrecognized passes through untouched.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("static pattern compiles")
}

/// Commands whose bare-filename argument is rooted under the workspace.
static ROOT_ARG: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"^(rm|ls|cat|chmod|python|python3|head|tail|mkdir)\s+([^/\\\s-]+)(\s|$)")
});

static PYTHON_INLINE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^python3?\s+-c\s+(?s)(.+)$"));

static TIMEOUT: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^timeout\s+(?:-t\s+)?(\d+(?:\.\d+)?)\s+(?s)(.+)$"));

static SLEEP: LazyLock<Regex> = LazyLock::new(|| pattern(r"^sleep\s+(\d+(?:\.\d+)?)$"));

/// Bare tokens that need shell semantics on the remote.
const SHELL_BUILTINS: &[&str] = &["echo", "which", "find", "grep", "nohup"];

/// Prepare an argv for submission: join, root bare filenames, apply the
/// rewrite table or the generic wrap, then pin the working directory.
pub(crate) fn prepare(cmd: &[String], root_dir: &str, remote_workdir: &str) -> String {
    let joined = cmd.join(" ");
    let rooted = root_simple_filename(&joined, root_dir);
    let shaped = shape(&rooted);
    format!("cd {} && {}", remote_workdir, shaped)
}

/// Apply the first matching rewrite, or the generic wrap decision.
/// Strings already starting with `/bin/sh -c` are never reshaped.
fn shape(s: &str) -> String {
    if s.starts_with("/bin/sh -c") {
        return s.to_string();
    }
    for (name, rewrite) in REWRITES {
        if let Some(rewritten) = rewrite(s) {
            tracing::debug!(rewrite = name, "command rewritten for remote shell");
            return rewritten;
        }
    }
    if needs_shell(s) {
        return wrap(s);
    }
    s.to_string()
}

// ---------------------------------------------------------------------------
// Rewrite table
// ---------------------------------------------------------------------------

type Rewrite = fn(&str) -> Option<String>;

/// Ordered, auditable list of targeted rewrites. Each is a no-op unless its
/// pattern matches; earlier entries win.
const REWRITES: &[(&str, Rewrite)] = &[
    ("python-inline", rewrite_python_inline),
    ("timeout", rewrite_timeout),
    ("sleep", rewrite_sleep),
    ("nohup", rewrite_nohup),
    ("server-launch", rewrite_server_launch),
];

/// `python -c '<code>'` → `/bin/sh -c 'python3 -c "<code>"'`.
///
/// Inline code carries quoting the remote re-split mangles; normalizing to
/// python3 with double-quoted code inside a wrapped shell keeps it intact.
fn rewrite_python_inline(s: &str) -> Option<String> {
    let caps = PYTHON_INLINE.captures(s)?;
    let code = unquote(caps.get(1)?.as_str());
    let escaped = code.replace('\\', "\\\\").replace('"', "\\\"");
    Some(wrap(&format!("python3 -c \"{}\"", escaped)))
}

/// `timeout N rest` → background `rest`, sleep N, kill.
/// The remote lacks a reliable `timeout` binary.
fn rewrite_timeout(s: &str) -> Option<String> {
    let caps = TIMEOUT.captures(s)?;
    let secs = caps.get(1)?.as_str();
    let rest = caps.get(2)?.as_str();
    Some(wrap(&format!(
        "{rest} & pid=$!; sleep {secs}; kill $pid 2>/dev/null || true; wait $pid 2>/dev/null || true"
    )))
}

/// Bare `sleep N` runs under the shell so the remote does not try to exec a
/// `sleep` argv directly.
fn rewrite_sleep(s: &str) -> Option<String> {
    SLEEP.is_match(s).then(|| wrap(s))
}

fn rewrite_nohup(s: &str) -> Option<String> {
    s.starts_with("nohup ").then(|| wrap(s))
}

/// Foreground server launches (`flask run`, `python … app.py`) block the
/// RPC forever; background them with output captured to a log file.
fn rewrite_server_launch(s: &str) -> Option<String> {
    if s.ends_with('&') || s.contains(" & ") {
        return None;
    }
    let is_flask = s.contains("flask run");
    let is_python_app = (s.starts_with("python ") || s.starts_with("python3 ")) && s.contains("app.py");
    if !is_flask && !is_python_app {
        return None;
    }
    let last = s.split_whitespace().last()?;
    Some(wrap(&format!(
        "cd $(dirname {last}); nohup {s} > flask.log 2>&1 & echo \"Flask app started with PID: $!\""
    )))
}

// ---------------------------------------------------------------------------
// Generic wrap decision
// ---------------------------------------------------------------------------

/// True when the string needs `/bin/sh -c` to keep its meaning remotely.
fn needs_shell(s: &str) -> bool {
    if s.contains('>') || s.contains('|') || s.contains("&&") || s.contains(';') || s.contains(" & ")
    {
        return true;
    }
    if s.contains('"') || s.contains('\'') || s.contains('`') || s.contains('$') {
        return true;
    }
    if s.split_whitespace().any(|tok| SHELL_BUILTINS.contains(&tok)) {
        return true;
    }
    let python = s.starts_with("python ") || s.starts_with("python3 ");
    if python && s.split_whitespace().any(|tok| tok == "-c" || tok == "-m") {
        return true;
    }
    false
}

fn wrap(s: &str) -> String {
    format!("/bin/sh -c '{}'", s.replace('\'', "'\\''"))
}

/// Root a bare second token of known file commands under the workspace.
fn root_simple_filename(s: &str, root_dir: &str) -> String {
    let Some(caps) = ROOT_ARG.captures(s) else {
        return s.to_string();
    };
    let Some(token) = caps.get(2) else {
        return s.to_string();
    };
    format!(
        "{}{}/{}{}",
        &s[..token.start()],
        root_dir.trim_end_matches('/'),
        token.as_str(),
        &s[token.end()..]
    )
}

/// Strip one layer of matching single or double quotes.
fn unquote(s: &str) -> &str {
    let trimmed = s.trim();
    for quote in ['\'', '"'] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

#[cfg(test)]
#[path = "prepare_tests.rs"]
mod tests;
