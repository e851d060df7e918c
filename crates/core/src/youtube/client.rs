use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    error::{KstudyError, Result},
    provider::KeyRing,
    types::VideoSummary,
};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const MAX_PAGE_SIZE: u32 = 50;
/// 403 reasons that mean the key's quota is spent rather than the request being refused.
const QUOTA_REASONS: [&str; 2] = ["quotaExceeded", "dailyLimitExceeded"];

/// Video listing and statistics for a set of channels.
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    /// Up to `limit` of the channel's videos, most viewed first as the service orders them
    async fn channel_videos(&self, channel_id: &str, limit: u32) -> Result<Vec<VideoSummary>>;

    async fn view_count(&self, video_id: &str) -> Result<u64>;
}

pub struct YoutubeClient {
    http: reqwest::Client,
    keys: KeyRing,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    channel_title: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    statistics: Statistics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorReason>,
}

#[derive(Debug, Deserialize)]
struct ErrorReason {
    #[serde(default)]
    reason: String,
}

/// Whether a 403 body reports an exhausted quota.
fn is_quota_refusal(body: &str) -> bool {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|response| {
            response
                .error
                .errors
                .iter()
                .any(|e| QUOTA_REASONS.contains(&e.reason.as_str()))
        })
        .unwrap_or(false)
}

impl YoutubeClient {
    pub fn new(keys: KeyRing) -> Self {
        Self::with_base_url(keys, API_BASE)
    }

    pub fn with_base_url(keys: KeyRing, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            keys,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// GET `endpoint` with the current key, rotating to the next key when the
    /// service reports the key's quota as spent.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut attempts = 0;

        while let Some(key) = self.keys.current() {
            attempts += 1;
            debug!(endpoint, attempt = attempts, "calling YouTube Data API");

            let response = self
                .http
                .get(&url)
                .query(params)
                .query(&[("key", key)])
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                if status == StatusCode::FORBIDDEN && is_quota_refusal(&body) {
                    warn!(endpoint, "API key quota exhausted");
                    self.keys.rotate(key);
                    continue;
                }
                return Err(KstudyError::ApiStatus {
                    status: status.as_u16(),
                    body,
                });
            }
            return Ok(response.json::<T>().await?);
        }

        Err(KstudyError::QuotaExhausted {
            attempts: self.keys.len(),
        })
    }
}

#[async_trait]
impl VideoCatalog for YoutubeClient {
    async fn channel_videos(&self, channel_id: &str, limit: u32) -> Result<Vec<VideoSummary>> {
        let mut videos = Vec::new();
        let mut page_token: Option<String> = None;

        while (videos.len() as u32) < limit {
            let page_size = (limit - videos.len() as u32).min(MAX_PAGE_SIZE);
            let mut params = vec![
                ("part", "id,snippet".to_string()),
                ("channelId", channel_id.to_string()),
                ("maxResults", page_size.to_string()),
                ("order", "viewCount".to_string()),
                ("type", "video".to_string()),
            ];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let page: SearchListResponse = self.get_json("search", &params).await?;
            videos.extend(page.items.into_iter().filter_map(|item| {
                item.id.video_id.map(|video_id| VideoSummary {
                    video_id,
                    title: item.snippet.title,
                    channel_title: item.snippet.channel_title,
                })
            }));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        videos.truncate(limit as usize);
        debug!(channel_id, count = videos.len(), "listed channel videos");
        Ok(videos)
    }

    async fn view_count(&self, video_id: &str) -> Result<u64> {
        let params = [
            ("part", "statistics".to_string()),
            ("id", video_id.to_string()),
        ];
        let response: VideoListResponse = self.get_json("videos", &params).await?;
        parse_view_count(video_id, response)
    }
}

fn parse_view_count(video_id: &str, response: VideoListResponse) -> Result<u64> {
    let raw = response
        .items
        .into_iter()
        .next()
        .and_then(|item| item.statistics.view_count)
        .ok_or_else(|| KstudyError::ApiStatus {
            status: 404,
            body: format!("no view statistics for video {video_id}"),
        })?;
    raw.parse::<u64>().map_err(|e| KstudyError::ApiStatus {
        status: 200,
        body: format!("unreadable view count {raw:?} for video {video_id}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_page_skips_non_video_items() {
        let page: SearchListResponse = serde_json::from_str(
            r#"{
                "nextPageToken": "CAUQAA",
                "items": [
                    {"id": {"kind": "youtube#video", "videoId": "dQw4w9WgXcQ"},
                     "snippet": {"title": "런닝맨", "channelTitle": "SBS Running Man"}},
                    {"id": {"kind": "youtube#playlist", "playlistId": "PL1"},
                     "snippet": {"title": "playlist", "channelTitle": "SBS Running Man"}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(page.next_page_token.as_deref(), Some("CAUQAA"));
        let ids: Vec<_> = page.items.iter().filter_map(|i| i.id.video_id.clone()).collect();
        assert_eq!(ids, ["dQw4w9WgXcQ"]);
    }

    #[test]
    fn view_count_is_parsed_from_string() {
        let response: VideoListResponse = serde_json::from_str(
            r#"{"items": [{"statistics": {"viewCount": "1234567", "likeCount": "10"}}]}"#,
        )
        .unwrap();
        assert_eq!(parse_view_count("v", response).unwrap(), 1_234_567);
    }

    #[test]
    fn only_quota_reasons_count_as_exhausted() {
        let quota = r#"{"error": {"code": 403, "errors": [
            {"domain": "youtube.quota", "reason": "quotaExceeded"}]}}"#;
        let daily = r#"{"error": {"code": 403, "errors": [
            {"domain": "usageLimits", "reason": "dailyLimitExceeded"}]}}"#;
        let forbidden = r#"{"error": {"code": 403, "errors": [
            {"domain": "global", "reason": "forbidden"}]}}"#;

        assert!(is_quota_refusal(quota));
        assert!(is_quota_refusal(daily));
        assert!(!is_quota_refusal(forbidden));
        assert!(!is_quota_refusal("Forbidden"));
    }

    #[test]
    fn missing_statistics_is_an_error() {
        let response: VideoListResponse = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert!(parse_view_count("v", response).is_err());

        let hidden: VideoListResponse =
            serde_json::from_str(r#"{"items": [{"statistics": {}}]}"#).unwrap();
        assert!(parse_view_count("v", hidden).is_err());
    }
}
