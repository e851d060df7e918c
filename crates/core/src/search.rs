use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::{
    captions::CaptionMatcher,
    config::SearchConfig,
    error::{KstudyError, Result},
    ranking::ViewRanker,
    transcript::TranscriptSource,
    types::{CaptionMatch, VideoMatches, VideoSummary},
    youtube::VideoCatalog,
};

/// Search one video's captions. A video without captions has no matches.
pub async fn search_video<T>(
    transcripts: &T,
    video_id: &str,
    query: &str,
    matcher: &CaptionMatcher,
) -> Result<Vec<CaptionMatch>>
where
    T: TranscriptSource + ?Sized,
{
    let entries = transcripts.fetch(video_id).await?;
    if entries.is_empty() {
        info!(video_id, "no captions available");
    }
    Ok(matcher.matches(&entries, query).collect())
}

/// Search the most viewed videos of the given channels for `query`.
///
/// Videos are listed per channel and ranked together by view count. The top
/// `config.top_k` have their captions searched in rank order until
/// `config.result_limit` videos with at least one match are found. A channel
/// that cannot be listed or a video whose captions cannot be fetched is
/// skipped with a warning.
pub async fn search_channels<C, T>(
    catalog: &C,
    transcripts: &T,
    channel_ids: &[String],
    query: &str,
    config: &SearchConfig,
) -> Result<Vec<VideoMatches>>
where
    C: VideoCatalog + ?Sized,
    T: TranscriptSource + ?Sized,
{
    let ranker = ViewRanker::new(config.top_k)?;
    if config.result_limit == 0 {
        return Err(KstudyError::invalid_input("result limit must be at least 1"));
    }
    let matcher = CaptionMatcher::new(config.context_window);

    let mut videos: Vec<VideoSummary> = Vec::new();
    for channel_id in channel_ids {
        match catalog.channel_videos(channel_id, config.channel_limit).await {
            Ok(listed) => videos.extend(listed),
            Err(e) => warn!(channel_id = %channel_id, error = %e, "skipping channel"),
        }
    }
    dedup_videos(&mut videos);

    let view_counts = resolve_view_counts(catalog, &videos).await;
    let lookup = |id: &str| -> std::result::Result<u64, String> {
        view_counts
            .get(id)
            .cloned()
            .unwrap_or_else(|| Err(format!("no view count fetched for {id}")))
    };
    let ranked = ranker.rank_by(videos, |v| v.video_id.as_str(), &lookup);
    debug!(kept = ranked.len(), "ranked channel videos by views");

    let mut results = Vec::new();
    for entry in ranked {
        if results.len() >= config.result_limit {
            break;
        }
        let video_id = entry.item.video_id.clone();
        let matches = match search_video(transcripts, &video_id, query, &matcher).await {
            Ok(matches) => matches,
            Err(e) => {
                warn!(video_id = %video_id, error = %e, "captions unavailable");
                continue;
            }
        };
        if !matches.is_empty() {
            results.push(VideoMatches {
                video: entry.item,
                view_count: entry.metric,
                matches,
            });
        }
    }

    info!(query, videos = results.len(), "channel search finished");
    Ok(results)
}

/// Fetch each video's view count once, keeping failures for the ranker to zero out.
async fn resolve_view_counts<C>(
    catalog: &C,
    videos: &[VideoSummary],
) -> HashMap<String, std::result::Result<u64, String>>
where
    C: VideoCatalog + ?Sized,
{
    let mut counts = HashMap::with_capacity(videos.len());
    for video in videos {
        if counts.contains_key(&video.video_id) {
            continue;
        }
        let count = catalog
            .view_count(&video.video_id)
            .await
            .map_err(|e| e.to_string());
        counts.insert(video.video_id.clone(), count);
    }
    counts
}

fn dedup_videos(videos: &mut Vec<VideoSummary>) {
    let mut seen = std::collections::HashSet::new();
    videos.retain(|v| seen.insert(v.video_id.clone()));
}
