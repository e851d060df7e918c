mod client;
mod url;

pub use client::{VideoCatalog, YoutubeClient};
pub use url::extract_video_id;
