// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host-to-workspace path translation.
//!
//! Tool calls arrive with host-shaped paths: bare filenames relative to the
//! host cwd, absolute paths under the host home, or system paths that have
//! no meaning inside the workspace. Every variant must land somewhere
//! sensible under the workspace root. Results are cached per exact input
//! string; the translation is deterministic, so racing writers converge on
//! the same value.

use parking_lot::Mutex;
use std::collections::HashMap;

/// Leading components with no remote counterpart, dropped from absolute
/// paths that are neither home-relative nor already workspace-shaped.
const SYSTEM_PREFIXES: &[&str] = &["Users", "usr", "var", "Library", "System", "Applications"];

/// Paths containing this segment are treated as already-remote and passed
/// through unchanged. Callers own the risk of host paths that happen to
/// contain the segment.
const WORKSPACE_HOME: &str = "/home/daytona";

/// Translates host paths into workspace paths rooted under `root_dir`.
pub struct PathMapper {
    root_dir: String,
    host_home: Option<String>,
    cache: Mutex<HashMap<String, String>>,
}

impl PathMapper {
    /// Mapper using the current user's home directory for home-relative
    /// translation.
    pub fn new(root_dir: impl Into<String>) -> Self {
        let host_home = dirs::home_dir().map(|p| p.to_string_lossy().into_owned());
        Self::with_home(root_dir, host_home)
    }

    /// Mapper with an explicit host home, for tests and embedding.
    pub fn with_home(root_dir: impl Into<String>, host_home: Option<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            host_home,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn root_dir(&self) -> &str {
        &self.root_dir
    }

    /// Number of cached translations.
    pub fn cache_len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Translate a host path into a workspace path.
    ///
    /// Stable: repeated calls return identical strings, and the first
    /// result is cached under the exact input.
    pub fn map(&self, host: &str) -> String {
        if let Some(hit) = self.cache.lock().get(host) {
            return hit.clone();
        }
        let mapped = self.translate(host);
        self.cache
            .lock()
            .insert(host.to_string(), mapped.clone());
        mapped
    }

    fn translate(&self, host: &str) -> String {
        let is_absolute = host.starts_with('/');
        let has_separator = host.contains('/') || host.contains('\\');

        // Bare filename: root it directly.
        if !is_absolute && !has_separator {
            return self.join(host);
        }

        if is_absolute {
            if let Some(rel) = self.strip_host_home(host) {
                return self.join(rel);
            }
            if host.contains(WORKSPACE_HOME) {
                return host.to_string();
            }
            let mut parts: Vec<&str> = host.split('/').filter(|p| !p.is_empty()).collect();
            while let Some(first) = parts.first() {
                if SYSTEM_PREFIXES.contains(first) {
                    parts.remove(0);
                } else {
                    break;
                }
            }
            return self.join(&parts.join("/"));
        }

        // Relative path with separators: resolve against the root.
        self.join(host)
    }

    /// Strip the host home prefix, respecting component boundaries.
    fn strip_host_home<'a>(&self, host: &'a str) -> Option<&'a str> {
        let home = self.host_home.as_deref()?;
        let rest = host.strip_prefix(home.trim_end_matches('/'))?;
        if rest.is_empty() {
            return Some("");
        }
        rest.strip_prefix('/')
    }

    fn join(&self, rel: &str) -> String {
        if rel.is_empty() {
            return self.root_dir.clone();
        }
        format!("{}/{}", self.root_dir.trim_end_matches('/'), rel)
    }
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
