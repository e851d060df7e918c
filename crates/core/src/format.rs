use crate::types::{CaptionMatch, VideoMatches};

/// Format seconds as HH:MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    let (minutes, secs) = (total / 60, total % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

pub fn format_match(found: &CaptionMatch) -> String {
    format!("[{}] {}", format_timestamp(found.start), found.text.trim())
}

/// Player URL that starts playback at `start_seconds`
pub fn embed_url(video_id: &str, start_seconds: f64) -> String {
    format!(
        "https://www.youtube.com/embed/{}?start={}",
        video_id,
        whole_seconds(start_seconds)
    )
}

pub fn watch_url(video_id: &str, start_seconds: f64) -> String {
    format!(
        "https://www.youtube.com/watch?v={}&t={}s",
        video_id,
        whole_seconds(start_seconds)
    )
}

fn whole_seconds(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    }
}

/// Format one video's matches as a markdown section
pub fn format_video_matches(result: &VideoMatches) -> String {
    let mut output = String::new();
    output.push_str(&format!("### {}\n\n", result.video.title));
    output.push_str(&format!(
        "**Channel:** {} | **Views:** {}\n\n",
        result.video.channel_title, result.view_count
    ));
    for found in &result.matches {
        output.push_str(&format!(
            "- {} ({})\n",
            format_match(found),
            watch_url(&result.video.video_id, found.start)
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VideoSummary;

    #[test]
    fn timestamps_roll_over_into_hours() {
        assert_eq!(format_timestamp(0.0), "00:00:00");
        assert_eq!(format_timestamp(59.9), "00:00:59");
        assert_eq!(format_timestamp(3723.4), "01:02:03");
        assert_eq!(format_timestamp(-5.0), "00:00:00");
    }

    #[test]
    fn urls_truncate_to_whole_seconds() {
        assert_eq!(
            embed_url("dQw4w9WgXcQ", 42.7),
            "https://www.youtube.com/embed/dQw4w9WgXcQ?start=42"
        );
        assert_eq!(
            watch_url("dQw4w9WgXcQ", 90.0),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=90s"
        );
    }

    #[test]
    fn video_section_lists_each_match() {
        let result = VideoMatches {
            video: VideoSummary {
                video_id: "abcdefghijk".into(),
                title: "런닝맨 EP.1".into(),
                channel_title: "SBS Running Man".into(),
            },
            view_count: 1200,
            matches: vec![CaptionMatch {
                index: 3,
                start: 65.0,
                end: 67.5,
                text: " 진짜요? ".into(),
            }],
        };

        let text = format_video_matches(&result);
        assert!(text.starts_with("### 런닝맨 EP.1"));
        assert!(text.contains("- [00:01:05] 진짜요? (https://www.youtube.com/watch?v=abcdefghijk&t=65s)"));
    }
}
