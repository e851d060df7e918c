use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::fs;
use tracing::{debug, warn};

use crate::{
    cache::{get_transcript_dir, get_transcript_path, is_fresh},
    error::{KstudyError, Result},
    types::CaptionEntry,
};

const TIMEDTEXT_URL: &str = "https://www.youtube.com/api/timedtext";

/// Source of timed captions for a video.
///
/// A video without captions in the requested language yields an empty list.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Result<Vec<CaptionEntry>>;
}

/// Fetches captions from YouTube's timedtext endpoint in `json3` format.
pub struct TimedTextClient {
    http: reqwest::Client,
    language: String,
    base_url: String,
}

impl TimedTextClient {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            language: language.into(),
            base_url: TIMEDTEXT_URL.to_string(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

#[async_trait]
impl TranscriptSource for TimedTextClient {
    async fn fetch(&self, video_id: &str) -> Result<Vec<CaptionEntry>> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("v", video_id), ("lang", self.language.as_str()), ("fmt", "json3")])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(video_id, lang = %self.language, "no captions published");
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(KstudyError::ApiStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        parse_json3(&response.text().await?)
    }
}

#[derive(Debug, Deserialize)]
struct Json3 {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Vec<Json3Seg>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Parse a `json3` caption document. An empty body means no captions.
pub fn parse_json3(body: &str) -> Result<Vec<CaptionEntry>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let doc: Json3 = serde_json::from_str(body)?;

    let entries = doc
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            let text = text.replace('\n', " ").trim().to_string();
            (!text.is_empty())
                .then(|| CaptionEntry::from_millis(text, event.t_start_ms, event.d_duration_ms))
        })
        .collect();
    Ok(entries)
}

/// Memoizes another source's transcripts on disk for `ttl`.
pub struct CachedTranscripts<S> {
    inner: S,
    cache_dir: PathBuf,
    language: String,
    ttl: Duration,
}

impl<S: TranscriptSource> CachedTranscripts<S> {
    pub fn new(inner: S, cache_dir: &Path, language: impl Into<String>, ttl: Duration) -> Self {
        Self {
            inner,
            cache_dir: cache_dir.to_path_buf(),
            language: language.into(),
            ttl,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn load(path: &Path) -> Result<Vec<CaptionEntry>> {
        let json_content = fs::read_to_string(path).await?;
        let entries: Vec<CaptionEntry> = serde_json::from_str(&json_content)?;
        Ok(entries)
    }

    async fn save(&self, path: &Path, entries: &[CaptionEntry]) -> Result<()> {
        fs::create_dir_all(get_transcript_dir(&self.cache_dir)).await?;
        fs::write(path, serde_json::to_string(entries)?).await?;
        Ok(())
    }
}

#[async_trait]
impl<S: TranscriptSource> TranscriptSource for CachedTranscripts<S> {
    async fn fetch(&self, video_id: &str) -> Result<Vec<CaptionEntry>> {
        let path = get_transcript_path(&self.cache_dir, video_id, &self.language);

        if is_fresh(&path, self.ttl).await {
            match Self::load(&path).await {
                Ok(entries) => {
                    debug!(video_id, "transcript served from cache");
                    return Ok(entries);
                }
                Err(e) => warn!(video_id, error = %e, "unreadable transcript cache, refetching"),
            }
        }

        let entries = self.inner.fetch(video_id).await?;
        if let Err(e) = self.save(&path, &entries).await {
            warn!(video_id, error = %e, "could not write transcript cache");
        }
        Ok(entries)
    }
}
