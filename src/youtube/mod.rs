//! YouTube video identification, metadata, and caption fetching.
//!
//! Metadata is best-effort and never blocks ingestion; captions are required
//! and fetched through `yt-dlp` caption-track discovery plus an HTTP fetch of
//! the json3 payload.

use crate::error::{MinneError, Result};
use crate::transcript::TranscriptEntry;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Extract an 11-character video ID from a URL or bare ID.
pub fn extract_video_id(input: &str) -> Option<String> {
    static VIDEO_ID_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = VIDEO_ID_REGEX.get_or_init(|| {
        Regex::new(
            r"(?x)
            (?:
                # Full YouTube URLs
                (?:https?://)?
                (?:www\.)?
                (?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            # Bare video ID (11 characters)
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("Invalid regex")
    });

    let caps = regex.captures(input.trim())?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Watch URL with a start offset in seconds.
pub fn timestamped_url(video_id: &str, start_seconds: f64) -> String {
    format!("https://youtu.be/{}?t={}", video_id, start_seconds as u64)
}

/// Video metadata, as much of it as the source could provide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    pub channel: String,
    pub duration_seconds: Option<u32>,
    pub thumbnail_url: String,
}

impl VideoMetadata {
    /// Placeholder metadata keyed by the video id, used when the metadata
    /// source fails. Ingestion proceeds regardless.
    pub fn placeholder(video_id: &str) -> Self {
        Self {
            id: video_id.to_string(),
            title: format!("Video {}", video_id),
            channel: "Unknown".to_string(),
            duration_seconds: None,
            thumbnail_url: format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", video_id),
        }
    }
}

/// A fetched caption track.
#[derive(Debug, Clone)]
pub struct FetchedTranscript {
    pub entries: Vec<TranscriptEntry>,
    /// Language code of the track actually used.
    pub language: String,
}

/// Capability: fetch the caption track for a video.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch_transcript(&self, video_id: &str, language: &str) -> Result<FetchedTranscript>;
}

/// Capability: fetch video metadata.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata>;
}

/// Choose the caption track to use for a requested language.
///
/// The requested language is tried first, then the English variants. An
/// English request that nothing matches falls through to whatever track
/// exists; an explicit non-English request that the video does not offer
/// is an error carrying the languages it does offer. `tracks` must be
/// non-empty.
fn select_caption_track<'a>(
    tracks: &'a [(String, String)],
    language: &str,
) -> Result<&'a (String, String)> {
    let mut candidates = vec![language.to_string()];
    for variant in ["en", "en-US", "en-GB", "en-orig"] {
        if !candidates.iter().any(|c| c == variant) {
            candidates.push(variant.to_string());
        }
    }

    if let Some(track) = candidates
        .iter()
        .find_map(|lang| tracks.iter().find(|(l, _)| l == lang))
    {
        return Ok(track);
    }

    if language.starts_with("en") {
        let first = &tracks[0];
        warn!("Falling back to '{}' captions", first.0);
        return Ok(first);
    }

    Err(MinneError::LanguageNotAvailable {
        requested: language.to_string(),
        available: tracks.iter().map(|(l, _)| l.clone()).collect(),
    })
}

/// `yt-dlp`-backed implementation of both video capabilities.
pub struct YtDlpSource {
    http: reqwest::Client,
}

impl YtDlpSource {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Run `yt-dlp --dump-json` for a video and parse the output.
    async fn dump_json(&self, video_id: &str) -> Result<serde_json::Value> {
        let url = format!("https://www.youtube.com/watch?v={}", video_id);

        let output = tokio::process::Command::new("yt-dlp")
            .args(["--dump-json", "--no-download", "--no-warnings", &url])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MinneError::ToolNotFound("yt-dlp".to_string())
                } else {
                    MinneError::VideoSource(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MinneError::VideoSource(format!(
                "Video {} not found or unavailable: {}",
                video_id, stderr
            )));
        }

        let json_str = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&json_str)
            .map_err(|e| MinneError::VideoSource(format!("Failed to parse yt-dlp output: {}", e)))
    }

    /// Collect available caption tracks: language code to payload URL.
    /// Manual subtitles take precedence over automatic captions.
    fn caption_tracks(info: &serde_json::Value) -> Vec<(String, String)> {
        let mut tracks: Vec<(String, String)> = Vec::new();

        for field in ["subtitles", "automatic_captions"] {
            if let Some(map) = info[field].as_object() {
                for (lang, formats) in map {
                    if tracks.iter().any(|(l, _)| l == lang) {
                        continue;
                    }
                    if let Some(url) = Self::pick_format_url(formats) {
                        tracks.push((lang.clone(), url));
                    }
                }
            }
        }
        tracks
    }

    /// Prefer the json3 format; fall back to whatever is listed first.
    fn pick_format_url(formats: &serde_json::Value) -> Option<String> {
        let list = formats.as_array()?;
        list.iter()
            .find(|f| f["ext"].as_str() == Some("json3"))
            .or_else(|| list.first())
            .and_then(|f| f["url"].as_str())
            .map(|s| s.to_string())
    }

    /// Fetch and parse a json3 caption payload into timestamped entries.
    async fn fetch_track(&self, url: &str) -> Result<Vec<TranscriptEntry>> {
        let payload: serde_json::Value = self.http.get(url).send().await?.json().await?;

        let mut entries = Vec::new();
        if let Some(events) = payload["events"].as_array() {
            for event in events {
                let Some(segs) = event["segs"].as_array() else {
                    continue;
                };
                let text: String = segs
                    .iter()
                    .filter_map(|s| s["utf8"].as_str())
                    .collect::<Vec<_>>()
                    .join("");
                let text = text.trim().to_string();
                if text.is_empty() {
                    continue;
                }

                let start = event["tStartMs"].as_f64().unwrap_or(0.0) / 1000.0;
                let duration = event["dDurationMs"].as_f64().unwrap_or(0.0) / 1000.0;
                entries.push(TranscriptEntry::new(text, start, duration));
            }
        }

        Ok(entries)
    }
}

impl Default for YtDlpSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataSource for YtDlpSource {
    async fn fetch_metadata(&self, video_id: &str) -> Result<VideoMetadata> {
        let info = self.dump_json(video_id).await?;

        let title = info["title"].as_str().unwrap_or("Unknown").to_string();
        let channel = info["channel"]
            .as_str()
            .or_else(|| info["uploader"].as_str())
            .unwrap_or("Unknown")
            .to_string();
        let duration = info["duration"].as_f64().map(|d| d as u32);
        let thumbnail = info["thumbnail"]
            .as_str()
            .map(|s| s.to_string())
            .unwrap_or_else(|| {
                format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", video_id)
            });

        Ok(VideoMetadata {
            id: video_id.to_string(),
            title,
            channel,
            duration_seconds: duration,
            thumbnail_url: thumbnail,
        })
    }
}

#[async_trait]
impl TranscriptSource for YtDlpSource {
    async fn fetch_transcript(&self, video_id: &str, language: &str) -> Result<FetchedTranscript> {
        info!("Fetching transcript for {}", video_id);

        let info = self.dump_json(video_id).await?;
        let tracks = Self::caption_tracks(&info);

        if tracks.is_empty() {
            return Err(MinneError::VideoSource(
                "No captions available. Try videos from TED, Khan Academy, or other educational channels."
                    .to_string(),
            ));
        }

        let (lang, url) = select_caption_track(&tracks, language)?;

        debug!("Using caption track '{}'", lang);
        let entries = self.fetch_track(url).await?;
        if entries.is_empty() {
            return Err(MinneError::VideoSource(format!(
                "Caption track '{}' is empty",
                lang
            )));
        }

        Ok(FetchedTranscript {
            entries,
            language: lang.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );

        assert_eq!(extract_video_id("not a url"), None);
        assert_eq!(extract_video_id("not-a-video-id"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_timestamped_url() {
        assert_eq!(
            timestamped_url("dQw4w9WgXcQ", 42.7),
            "https://youtu.be/dQw4w9WgXcQ?t=42"
        );
    }

    #[test]
    fn test_placeholder_metadata() {
        let meta = VideoMetadata::placeholder("dQw4w9WgXcQ");
        assert_eq!(meta.title, "Video dQw4w9WgXcQ");
        assert_eq!(meta.channel, "Unknown");
        assert!(meta.thumbnail_url.contains("dQw4w9WgXcQ"));
    }

    fn tracks(langs: &[&str]) -> Vec<(String, String)> {
        langs
            .iter()
            .map(|l| (l.to_string(), format!("https://example.com/{}", l)))
            .collect()
    }

    #[test]
    fn test_select_requested_language_first() {
        let tracks = tracks(&["no", "en", "de"]);
        let (lang, _) = select_caption_track(&tracks, "de").unwrap();
        assert_eq!(lang, "de");
    }

    #[test]
    fn test_select_prefers_english_variant_over_failure() {
        let tracks = tracks(&["no", "en-US"]);
        let (lang, _) = select_caption_track(&tracks, "fr").unwrap();
        assert_eq!(lang, "en-US");
    }

    #[test]
    fn test_select_english_request_falls_back_to_any_track() {
        let tracks = tracks(&["no"]);
        let (lang, _) = select_caption_track(&tracks, "en").unwrap();
        assert_eq!(lang, "no");
    }

    #[test]
    fn test_select_missing_language_reports_available() {
        let tracks = tracks(&["de", "no"]);
        let err = select_caption_track(&tracks, "fr").unwrap_err();
        match err {
            MinneError::LanguageNotAvailable { requested, available } => {
                assert_eq!(requested, "fr");
                assert_eq!(available, vec!["de".to_string(), "no".to_string()]);
            }
            other => panic!("expected LanguageNotAvailable, got {:?}", other),
        }
    }

    #[test]
    fn test_caption_tracks_prefer_manual() {
        let info = serde_json::json!({
            "subtitles": {
                "en": [{"ext": "json3", "url": "https://example.com/manual"}]
            },
            "automatic_captions": {
                "en": [{"ext": "json3", "url": "https://example.com/auto"}],
                "de": [{"ext": "vtt", "url": "https://example.com/de"}]
            }
        });

        let tracks = YtDlpSource::caption_tracks(&info);
        let en = tracks.iter().find(|(l, _)| l == "en").unwrap();
        assert_eq!(en.1, "https://example.com/manual");
        assert!(tracks.iter().any(|(l, _)| l == "de"));
    }
}
