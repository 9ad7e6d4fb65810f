//! HTTP client for the subtitle-search API.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProviderConfig;

use super::archive::{extract_subtitle, remove_scratch_file};
use super::{Candidate, ProviderError, SubtitleProvider, SubtitleQuery};

/// HTTP implementation of [`SubtitleProvider`].
pub struct HttpSubtitleProvider {
    client: Client,
    base_url: String,
}

impl HttpSubtitleProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| ProviderError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    fn map_send_error(e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout
        } else if e.is_connect() {
            ProviderError::ConnectionFailed(e.to_string())
        } else {
            ProviderError::ApiError {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                message: e.to_string(),
            }
        }
    }

    async fn check_status(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ProviderError::RateLimited { retry_after });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl SubtitleProvider for HttpSubtitleProvider {
    fn name(&self) -> &str {
        "http"
    }

    async fn search(&self, query: &SubtitleQuery) -> Result<Vec<Candidate>, ProviderError> {
        let url = format!("{}/search", self.base_url);

        debug!(query = %query.query, language = %query.language, "Searching subtitles");

        let response = self
            .client
            .post(&url)
            .json(&SearchRequest {
                query: &query.query,
                language: &query.language,
            })
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let response = Self::check_status(response).await?;
        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        debug!(results = body.results.len(), "Search complete");

        Ok(body
            .results
            .into_iter()
            .map(|r| Candidate {
                release_name: r.release_name,
                language: r.language,
                forced: r.forced,
                hearing_impaired: r.hearing_impaired,
                download_ref: r.download_ref,
                rating: r.rating,
                uploader: r.uploader,
                pattern_priority: query.pattern_priority,
            })
            .collect())
    }

    async fn download(
        &self,
        candidate: &Candidate,
        dest_dir: &Path,
    ) -> Result<PathBuf, ProviderError> {
        let url = format!("{}/download/{}", self.base_url, candidate.download_ref);

        debug!(release = %candidate.release_name, "Downloading subtitle archive");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let response = Self::check_status(response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::ConnectionFailed(e.to_string()))?;

        tokio::fs::create_dir_all(dest_dir).await?;
        let archive_path = dest_dir.join(format!("download-{}.zip", candidate.download_ref));
        tokio::fs::write(&archive_path, &bytes).await?;

        let extracted = extract_subtitle(&archive_path, dest_dir);
        remove_scratch_file(&archive_path);
        extracted
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    language: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResultRecord>,
}

#[derive(Debug, Deserialize)]
struct SearchResultRecord {
    release_name: String,
    language: String,
    #[serde(default)]
    forced: bool,
    #[serde(default)]
    hearing_impaired: bool,
    download_ref: String,
    #[serde(default)]
    rating: Option<f32>,
    #[serde(default)]
    uploader: Option<String>,
}
