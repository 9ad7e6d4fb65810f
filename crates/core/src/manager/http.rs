//! HTTP client for the media-management API.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use reqwest::multipart;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ManagerConfig;

use super::{Item, ItemKind, LanguageSpec, ManagerError, MediaManager};

/// HTTP implementation of [`MediaManager`].
///
/// Authenticates with an API key header; optional basic auth covers
/// reverse-proxy deployments.
pub struct HttpMediaManager {
    client: Client,
    base_url: String,
    api_key: String,
    basic_auth: Option<(String, String)>,
}

impl HttpMediaManager {
    pub fn new(config: ManagerConfig) -> Result<Self, ManagerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| ManagerError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            basic_auth: match (config.username, config.password) {
                (Some(user), Some(pass)) if !user.is_empty() => Some((user, pass)),
                _ => None,
            },
        })
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("X-API-KEY", &self.api_key);
        match &self.basic_auth {
            Some((user, pass)) => request.basic_auth(user, Some(pass)),
            None => request,
        }
    }

    fn map_send_error(e: reqwest::Error) -> ManagerError {
        if e.is_timeout() {
            ManagerError::Timeout
        } else if e.is_connect() {
            ManagerError::ConnectionFailed(e.to_string())
        } else {
            ManagerError::ApiError {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                message: e.to_string(),
            }
        }
    }

    /// Check the response status, converting auth and API failures.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ManagerError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ManagerError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ManagerError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ManagerError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .apply_auth(self.client.get(&url))
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ManagerError::ParseError(e.to_string()))
    }

    /// Fetch series titles for the given series ids, one lookup per id.
    ///
    /// A failed lookup degrades to the episode's own title rather than
    /// dropping the episode.
    async fn series_titles(&self, ids: &[String]) -> HashMap<String, SeriesRecord> {
        let mut titles = HashMap::new();
        for id in ids {
            match self
                .get_json::<WantedResponse<SeriesRecord>>(&format!("/api/series?id={}", id))
                .await
            {
                Ok(response) => {
                    if let Some(series) = response.data.into_iter().find(|s| &s.id == id) {
                        titles.insert(id.clone(), series);
                    }
                }
                Err(e) => {
                    warn!(series_id = %id, "Failed to fetch series info: {}", e);
                }
            }
        }
        titles
    }
}

#[async_trait::async_trait]
impl MediaManager for HttpMediaManager {
    fn name(&self) -> &str {
        "http"
    }

    async fn wanted_movies(&self) -> Result<Vec<Item>, ManagerError> {
        let response: WantedResponse<WantedMovie> = self.get_json("/api/movies/wanted").await?;

        debug!(count = response.data.len(), "Fetched wanted movies");

        Ok(response
            .data
            .into_iter()
            .map(|m| Item {
                kind: ItemKind::Movie,
                id: m.id,
                title: m.title,
                year: m.year,
                series_title: None,
                season: None,
                episode: None,
                episode_title: None,
                scene_name: m.scene_name,
                wanted_languages: m.missing_subtitles,
            })
            .collect())
    }

    async fn wanted_episodes(&self) -> Result<Vec<Item>, ManagerError> {
        let response: WantedResponse<WantedEpisode> = self.get_json("/api/episodes/wanted").await?;

        // Deduplicated series lookups before building items.
        let mut series_ids: Vec<String> = response
            .data
            .iter()
            .map(|e| e.series_id.clone())
            .collect();
        series_ids.sort();
        series_ids.dedup();
        let series = self.series_titles(&series_ids).await;

        debug!(
            episodes = response.data.len(),
            series = series.len(),
            "Fetched wanted episodes"
        );

        Ok(response
            .data
            .into_iter()
            .map(|e| {
                let series_title = series
                    .get(&e.series_id)
                    .map(|s| s.title.clone())
                    .unwrap_or_else(|| e.title.clone());
                Item {
                    kind: ItemKind::Episode,
                    id: e.id,
                    title: e.title.clone(),
                    year: None,
                    series_title: Some(series_title),
                    season: Some(e.season),
                    episode: Some(e.episode),
                    episode_title: Some(e.title).filter(|t| !t.is_empty()),
                    scene_name: e.scene_name,
                    wanted_languages: e.missing_subtitles,
                }
            })
            .collect())
    }

    async fn search_interval_hours(&self) -> Result<Option<u32>, ManagerError> {
        let settings: SystemSettings = self.get_json("/api/system/settings").await?;
        Ok(settings
            .search
            .and_then(|s| s.interval_hours)
            .map(|h| h.max(1)))
    }

    async fn upload_subtitle(
        &self,
        item: &Item,
        language: &LanguageSpec,
        subtitle_file: &Path,
    ) -> Result<(), ManagerError> {
        let path = match item.kind {
            ItemKind::Movie => "/api/movies/subtitles",
            ItemKind::Episode => "/api/episodes/subtitles",
        };
        let url = format!("{}{}", self.base_url, path);

        let contents = tokio::fs::read(subtitle_file).await?;
        let filename = subtitle_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "subtitle.srt".to_string());

        let form = multipart::Form::new().part(
            "file",
            multipart::Part::bytes(contents)
                .file_name(filename)
                .mime_str("text/plain")
                .map_err(|e| ManagerError::ParseError(e.to_string()))?,
        );

        let response = self
            .apply_auth(self.client.post(&url))
            .query(&[
                ("id", item.id.as_str()),
                ("language", language.code.as_str()),
                ("forced", if language.forced { "true" } else { "false" }),
                (
                    "hi",
                    if language.hearing_impaired {
                        "true"
                    } else {
                        "false"
                    },
                ),
            ])
            .multipart(form)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        Self::check_status(response).await?;

        debug!(item = %item.describe(), language = %language, "Uploaded subtitle");
        Ok(())
    }
}

// Wire DTOs.

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct WantedResponse<T> {
    #[serde(default)]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct WantedMovie {
    id: String,
    title: String,
    #[serde(default)]
    year: Option<u32>,
    #[serde(default)]
    scene_name: Option<String>,
    #[serde(default)]
    missing_subtitles: Vec<LanguageSpec>,
}

#[derive(Debug, Deserialize)]
struct WantedEpisode {
    id: String,
    series_id: String,
    title: String,
    season: u32,
    episode: u32,
    #[serde(default)]
    scene_name: Option<String>,
    #[serde(default)]
    missing_subtitles: Vec<LanguageSpec>,
}

#[derive(Debug, Deserialize)]
struct SeriesRecord {
    id: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct SystemSettings {
    #[serde(default)]
    search: Option<SearchSettings>,
}

#[derive(Debug, Deserialize)]
struct SearchSettings {
    #[serde(default)]
    interval_hours: Option<u32>,
}
