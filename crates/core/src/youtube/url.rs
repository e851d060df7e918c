use crate::error::{KstudyError, Result};

const VIDEO_ID_LEN: usize = 11;

/// Extract the video id from a YouTube link.
///
/// Accepts `watch?v=`, `youtu.be/`, `/embed/`, `/shorts/` and `/v/` links as
/// well as a bare id.
pub fn extract_video_id(url: &str) -> Result<String> {
    let url = url.trim();
    let invalid = || KstudyError::InvalidVideoUrl {
        url: url.to_string(),
    };

    if is_video_id(url) {
        return Ok(url.to_string());
    }

    let lower = url.to_ascii_lowercase();
    if !(lower.contains("youtube.com") || lower.contains("youtu.be")) {
        return Err(invalid());
    }

    let candidate = query_param(url, "v")
        .or_else(|| after_marker(url, "youtu.be/"))
        .or_else(|| after_marker(url, "/embed/"))
        .or_else(|| after_marker(url, "/shorts/"))
        .or_else(|| after_marker(url, "/v/"))
        .ok_or_else(invalid)?;

    if is_video_id(candidate) {
        Ok(candidate.to_string())
    } else {
        Err(invalid())
    }
}

fn is_video_id(s: &str) -> bool {
    s.len() == VIDEO_ID_LEN
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn query_param<'a>(url: &'a str, name: &str) -> Option<&'a str> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

fn after_marker<'a>(url: &'a str, marker: &str) -> Option<&'a str> {
    let start = url.find(marker)? + marker.len();
    let rest = &url[start..];
    let end = rest.find(['?', '&', '#', '/']).unwrap_or(rest.len());
    Some(&rest[..end]).filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_common_link_shapes() {
        let links = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=30",
            "https://youtu.be/dQw4w9WgXcQ?si=abc",
            "https://www.youtube.com/embed/dQw4w9WgXcQ?start=12",
            "https://youtube.com/shorts/dQw4w9WgXcQ",
            "https://youtube.com/v/dQw4w9WgXcQ",
            "  dQw4w9WgXcQ ",
        ];
        for link in links {
            assert_eq!(extract_video_id(link).unwrap(), "dQw4w9WgXcQ", "{link}");
        }
    }

    #[test]
    fn rejects_foreign_or_malformed_links() {
        for link in [
            "https://vimeo.com/123456",
            "https://www.youtube.com/watch?v=short",
            "https://www.youtube.com/channel/UCaKod3X1Tn4c7Ci0iUKcvzQ",
            "",
        ] {
            assert!(matches!(
                extract_video_id(link),
                Err(KstudyError::InvalidVideoUrl { .. })
            ));
        }
    }
}
