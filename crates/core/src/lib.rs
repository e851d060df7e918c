//! kstudy core library
//!
//! Caption search with context windows, view-count ranking and availability
//! overlap checks, plus the YouTube, transcript and translation collaborators
//! the study tools call around them.

pub mod availability;
pub mod cache;
pub mod captions;
pub mod config;
pub mod error;
pub mod format;
pub mod provider;
pub mod ranking;
pub mod search;
pub mod transcript;
pub mod translate;
pub mod types;
pub mod youtube;

// Re-export commonly used items at crate root
pub use availability::{AvailabilityRecord, Overlap, find_overlaps, overlaps, split_by_role};
pub use cache::{get_root_cache_dir, get_transcript_path};
pub use captions::{CaptionMatcher, CaptionMatches, ContextWindow, search_captions};
pub use config::{CHANNEL_PRESETS, SearchConfig, preset_channel_id};
pub use error::{KstudyError, Result};
pub use format::{embed_url, format_match, format_timestamp, format_video_matches, watch_url};
pub use provider::KeyRing;
pub use ranking::{MetricResolver, ViewRanker};
pub use search::{search_channels, search_video};
pub use transcript::{CachedTranscripts, TimedTextClient, TranscriptSource};
pub use translate::{GoogleTranslator, Translation, Translator, translate_or_unavailable};
pub use types::{
    AvailabilityInterval, CaptionEntry, CaptionMatch, RankableItem, Ranked, Role, VideoMatches,
    VideoSummary,
};
pub use youtube::{VideoCatalog, YoutubeClient, extract_video_id};
