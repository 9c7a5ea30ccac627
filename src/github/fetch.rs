// src/github/fetch.rs
// =============================================================================
// This module fetches go.mod files through the GitHub contents API.
//
// Request:
//   GET {api_base}/repos/{owner}/{repo}/contents/go.mod
//
// Response (200):
//   { "content": "bW9kdWxl...\nZ2l0aHVi...", "encoding": "base64", ... }
//
// The content is base64 with line breaks every 60 characters, so we strip
// whitespace before decoding.
//
// Outcomes (see ManifestSource):
//   - 200 + decodable envelope -> Ok(Some(text))
//   - 404 / 410                -> Ok(None), the repo has no go.mod
//   - anything else            -> Err(Transport)
// =============================================================================

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, trace};

use super::{ManifestSource, RepoRef};
use crate::config::GitHubConfig;
use crate::error::CrawlError;

// The part of the contents API response we care about
#[derive(Debug, Deserialize)]
struct ContentsEnvelope {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

/// Looks up manifests on GitHub
#[derive(Debug, Clone)]
pub struct GitHubSource {
    client: Client,
    config: GitHubConfig,
}

impl GitHubSource {
    // Creates the HTTP client once; it is shared (connection pooling) by
    // every fetch task
    pub fn new(config: GitHubConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, config })
    }

    fn contents_url(&self, repo: &RepoRef) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.api_base.trim_end_matches('/'),
            repo.owner,
            repo.repo,
            self.config.manifest_path.trim_start_matches('/'),
        )
    }
}

#[async_trait]
impl ManifestSource for GitHubSource {
    async fn fetch_manifest(&self, repo: &RepoRef) -> Result<Option<String>, CrawlError> {
        let url = self.contents_url(repo);
        trace!(%url, "requesting manifest");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| CrawlError::transport(repo.to_string(), e))?;

        let status = response.status();
        if matches!(status, StatusCode::NOT_FOUND | StatusCode::GONE) {
            debug!(%repo, "no manifest");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(CrawlError::transport(
                repo.to_string(),
                format!("HTTP {} from {}", status.as_u16(), url),
            ));
        }

        let envelope: ContentsEnvelope = response
            .json()
            .await
            .map_err(|e| CrawlError::transport(repo.to_string(), format!("bad envelope: {}", e)))?;

        decode_content(&envelope)
            .map(Some)
            .map_err(|message| CrawlError::transport(repo.to_string(), message))
    }
}

// Decodes the base64 body of a contents envelope into text
fn decode_content(envelope: &ContentsEnvelope) -> Result<String, String> {
    if let Some(encoding) = envelope.encoding.as_deref() {
        if encoding != "base64" {
            return Err(format!("unsupported content encoding '{}'", encoding));
        }
    }

    let cleaned: String = envelope
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = STANDARD
        .decode(cleaned)
        .map_err(|e| format!("could not decode content: {}", e))?;

    String::from_utf8(bytes).map_err(|e| format!("manifest is not UTF-8: {}", e))
}
