// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daytona REST binding.
//!
//! Speaks to the sandbox API (`/sandbox`) and the per-workspace toolbox API
//! (`/toolbox/{id}/toolbox/...`) with bearer-token authentication. Only the
//! operations in the provider trait are bound; the vendor surface beyond
//! them is deliberately ignored.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    CommandOutcome, CreateOptions, PreviewLink, ProviderError, SandboxProvider, SandboxWorkspace,
    SessionCommand,
};

/// Default API endpoint when `DAYTONA_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "https://app.daytona.io/api";

/// Label attached to created workspaces so stale ones can be identified.
const CREATOR_LABEL: &str = "sandbox-exec";

/// Connection parameters for the Daytona API.
#[derive(Debug, Clone)]
pub struct DaytonaConfig {
    pub api_key: String,
    pub api_url: String,
    /// Region the workspace is scheduled into (`us` or `eu`).
    pub target: String,
}

/// Provider handle; cheap to clone.
#[derive(Clone)]
pub struct DaytonaProvider {
    http: Arc<Http>,
}

impl DaytonaProvider {
    pub fn new(config: DaytonaConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self {
            http: Arc::new(Http { client, config }),
        })
    }
}

#[async_trait]
impl SandboxProvider for DaytonaProvider {
    type Workspace = DaytonaWorkspace;

    async fn create(&self, opts: &CreateOptions) -> Result<Self::Workspace, ProviderError> {
        let mut labels = HashMap::new();
        labels.insert("creator".to_string(), CREATOR_LABEL.to_string());
        let body = CreateSandboxRequest {
            target: &self.http.config.target,
            auto_stop_interval: opts.auto_stop_interval,
            labels,
        };
        let sandbox: SandboxDto = self
            .http
            .json_response(self.http.post("/sandbox").json(&body))
            .await?;
        debug!(sandbox_id = %sandbox.id, "created sandbox");
        Ok(DaytonaWorkspace {
            id: sandbox.id,
            http: Arc::clone(&self.http),
        })
    }

    async fn remove(&self, workspace: &Self::Workspace) -> Result<(), ProviderError> {
        self.http
            .send(self.http.delete(&format!("/sandbox/{}", workspace.id)))
            .await?;
        debug!(sandbox_id = %workspace.id, "removed sandbox");
        Ok(())
    }
}

/// One remote workspace, addressed through the toolbox API.
#[derive(Clone)]
pub struct DaytonaWorkspace {
    id: String,
    http: Arc<Http>,
}

impl DaytonaWorkspace {
    fn toolbox(&self, path: &str) -> String {
        format!("/toolbox/{}/toolbox{}", self.id, path)
    }
}

#[async_trait]
impl SandboxWorkspace for DaytonaWorkspace {
    fn id(&self) -> &str {
        &self.id
    }

    async fn user_root_dir(&self) -> Result<String, ProviderError> {
        let dir: ProjectDirDto = self
            .http
            .json_response(self.http.get(&self.toolbox("/project-dir")))
            .await?;
        Ok(dir.dir)
    }

    async fn create_folder(&self, path: &str) -> Result<(), ProviderError> {
        let req = self
            .http
            .post(&self.toolbox("/files/folder"))
            .query(&[("path", path), ("mode", "0755")]);
        self.http.send(req).await?;
        Ok(())
    }

    async fn upload_file(&self, path: &str, content: &[u8]) -> Result<(), ProviderError> {
        let req = self
            .http
            .post(&self.toolbox("/files/upload"))
            .query(&[("path", path)])
            .body(content.to_vec());
        self.http.send(req).await?;
        Ok(())
    }

    async fn download_file(&self, path: &str) -> Result<Vec<u8>, ProviderError> {
        let req = self
            .http
            .get(&self.toolbox("/files/download"))
            .query(&[("path", path)]);
        let resp = self.http.send(req).await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn delete_file(&self, path: &str) -> Result<(), ProviderError> {
        let req = self
            .http
            .delete(&self.toolbox("/files"))
            .query(&[("path", path)]);
        self.http.send(req).await?;
        Ok(())
    }

    async fn execute_command(
        &self,
        command: &str,
        cwd: Option<&str>,
        timeout_secs: Option<u64>,
    ) -> Result<CommandOutcome, ProviderError> {
        let body = ExecuteRequest {
            command,
            cwd,
            timeout: timeout_secs,
        };
        let resp: ExecuteDto = self
            .http
            .json_response(self.http.post(&self.toolbox("/process/execute")).json(&body))
            .await?;
        Ok(CommandOutcome {
            output: resp.result.unwrap_or_default(),
            error: None,
            exit_code: resp.exit_code.unwrap_or(0),
            cmd_id: None,
        })
    }

    async fn create_session(&self, session_id: &str) -> Result<(), ProviderError> {
        let body = CreateSessionRequest { session_id };
        self.http
            .send(self.http.post(&self.toolbox("/process/session")).json(&body))
            .await?;
        Ok(())
    }

    async fn execute_session_command(
        &self,
        session_id: &str,
        command: SessionCommand,
    ) -> Result<CommandOutcome, ProviderError> {
        let body = SessionExecuteRequest {
            command: &command.command,
            run_async: command.run_async,
            timeout: command.timeout_secs,
        };
        let path = self.toolbox(&format!("/process/session/{}/exec", session_id));
        let resp: SessionExecuteDto = self
            .http
            .json_response(self.http.post(&path).json(&body))
            .await?;
        Ok(CommandOutcome {
            output: resp.output.unwrap_or_default(),
            error: resp.error,
            exit_code: resp.exit_code.unwrap_or(0),
            cmd_id: resp.cmd_id,
        })
    }

    async fn session_command_logs(
        &self,
        session_id: &str,
        cmd_id: &str,
    ) -> Result<String, ProviderError> {
        let path = self.toolbox(&format!(
            "/process/session/{}/command/{}/logs",
            session_id, cmd_id
        ));
        let resp = self.http.send(self.http.get(&path)).await?;
        resp.text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), ProviderError> {
        let path = self.toolbox(&format!("/process/session/{}", session_id));
        self.http.send(self.http.delete(&path)).await?;
        Ok(())
    }

    async fn preview_link(&self, port: u16) -> Result<PreviewLink, ProviderError> {
        let path = format!("/sandbox/{}/ports/{}/preview-url", self.id, port);
        let dto: PreviewDto = self.http.json_response(self.http.get(&path)).await?;
        Ok(PreviewLink {
            url: dto.url,
            token: dto.token.unwrap_or_default(),
        })
    }
}

// ---------------------------------------------------------------------------
// HTTP plumbing
// ---------------------------------------------------------------------------

struct Http {
    client: reqwest::Client,
    config: DaytonaConfig,
}

impl Http {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path))
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path))
    }

    fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.delete(self.url(path))
    }

    /// Send with auth, translating non-success statuses into typed errors.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ProviderError> {
        let resp = req
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        if status.as_u16() == 404 {
            return Err(ProviderError::NotFound(message));
        }
        if status.as_u16() == 409 || message.to_ascii_lowercase().contains("already exists") {
            return Err(ProviderError::SessionExists(message));
        }
        Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn json_response<T: serde::de::DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, ProviderError> {
        let resp = self.send(req).await?;
        resp.json::<T>()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Wire DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSandboxRequest<'a> {
    target: &'a str,
    auto_stop_interval: u32,
    labels: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SandboxDto {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ProjectDirDto {
    dir: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteRequest<'a> {
    command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cwd: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteDto {
    result: Option<String>,
    exit_code: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionRequest<'a> {
    session_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionExecuteRequest<'a> {
    command: &'a str,
    run_async: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionExecuteDto {
    output: Option<String>,
    error: Option<String>,
    exit_code: Option<i32>,
    cmd_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PreviewDto {
    url: String,
    token: Option<String>,
}

#[cfg(test)]
#[path = "daytona_tests.rs"]
mod tests;
