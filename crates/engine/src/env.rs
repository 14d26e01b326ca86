// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the engine crate.

use crate::error::ConfigError;

pub const API_KEY: &str = "DAYTONA_API_KEY";
pub const API_URL: &str = "DAYTONA_API_URL";
pub const TARGET: &str = "DAYTONA_TARGET";
pub const AUTO_STOP_INTERVAL: &str = "DAYTONA_AUTO_STOP_INTERVAL";

/// Minutes of inactivity before the provider stops an idle workspace.
pub const DEFAULT_AUTO_STOP_MINUTES: u32 = 30;

/// Region the workspace is scheduled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    Us,
    Eu,
}

impl Target {
    pub fn as_str(self) -> &'static str {
        match self {
            Target::Us => "us",
            Target::Eu => "eu",
        }
    }
}

/// Resolved environment contract.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub api_url: Option<String>,
    pub target: Target,
    /// Minutes; 0 disables auto-stop.
    pub auto_stop_interval: u32,
}

/// Read settings from the process environment.
pub fn load() -> Result<Settings, ConfigError> {
    from_lookup(|name| std::env::var(name).ok())
}

/// Read settings through a lookup function, for tests and embedding.
pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Settings, ConfigError> {
    let api_key = lookup(API_KEY).ok_or(ConfigError::MissingApiKey)?;
    if api_key.is_empty() || !api_key.chars().all(valid_key_char) {
        return Err(ConfigError::InvalidApiKey);
    }

    let api_url = lookup(API_URL).filter(|url| !url.is_empty());

    let target = match lookup(TARGET).as_deref() {
        None | Some("") => Target::Us,
        Some("us") => Target::Us,
        Some("eu") => Target::Eu,
        Some(other) => return Err(ConfigError::InvalidTarget(other.to_string())),
    };

    // Unparseable intervals fall back to the default rather than failing init.
    let auto_stop_interval = lookup(AUTO_STOP_INTERVAL)
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(DEFAULT_AUTO_STOP_MINUTES);

    Ok(Settings {
        api_key,
        api_url,
        target,
        auto_stop_interval,
    })
}

fn valid_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
