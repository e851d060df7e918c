use std::{
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

pub fn get_root_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("kstudy")
}

pub fn get_transcript_dir(cache_dir: &Path) -> PathBuf {
    cache_dir.join("transcripts")
}

/// Get the path for a cached transcript file (language aware)
pub fn get_transcript_path(cache_dir: &Path, video_id: &str, lang: &str) -> PathBuf {
    get_transcript_dir(cache_dir).join(format!("{}_{}.json", video_id, lang))
}

/// Whether the file exists and was written less than `ttl` ago
pub async fn is_fresh(path: &Path, ttl: Duration) -> bool {
    let Ok(metadata) = tokio::fs::metadata(path).await else {
        return false;
    };
    let Ok(modified) = metadata.modified() else {
        return false;
    };
    let age = SystemTime::now()
        .duration_since(modified)
        .unwrap_or(Duration::ZERO);
    age < ttl
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_path_is_keyed_by_video_and_language() {
        let path = get_transcript_path(Path::new("/cache"), "dQw4w9WgXcQ", "ko");
        assert_eq!(path, PathBuf::from("/cache/transcripts/dQw4w9WgXcQ_ko.json"));
    }

    #[tokio::test]
    async fn missing_file_is_not_fresh() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_fresh(&dir.path().join("nope.json"), Duration::from_secs(60)).await);
    }

    #[tokio::test]
    async fn new_file_is_fresh_until_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.json");
        tokio::fs::write(&path, "[]").await.unwrap();

        assert!(is_fresh(&path, Duration::from_secs(60)).await);
        assert!(!is_fresh(&path, Duration::ZERO).await);
    }
}
