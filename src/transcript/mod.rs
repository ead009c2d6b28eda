//! Timestamped transcript types and coarse time windowing.
//!
//! Caption entries arrive as small timestamped fragments; before
//! segmentation they are grouped into larger windows so each stored chunk
//! can carry a meaningful start/end time.

use serde::{Deserialize, Serialize};

/// A single timestamped caption entry as fetched from the transcript source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Caption text.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
}

impl TranscriptEntry {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// A contiguous group of entries spanning a time range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptWindow {
    /// Concatenated entry text.
    pub text: String,
    /// Start of the first entry in the window, in seconds.
    pub start_time: f64,
    /// End of the last entry in the window (start + duration), in seconds.
    pub end_time: f64,
}

/// Groups ordered transcript entries into non-overlapping windows.
#[derive(Debug, Clone)]
pub struct TranscriptWindower {
    threshold: usize,
}

impl TranscriptWindower {
    /// Create a windower emitting a window once accumulated text reaches
    /// `threshold` characters.
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold: threshold.max(1),
        }
    }

    /// Group entries into windows. Every entry lands in exactly one window;
    /// the final partial accumulation is always flushed.
    pub fn window(&self, entries: &[TranscriptEntry]) -> Vec<TranscriptWindow> {
        let mut windows = Vec::new();
        let mut text = String::new();
        let mut window_start: Option<f64> = None;
        let mut window_end = 0.0;

        for entry in entries {
            if window_start.is_none() {
                window_start = Some(entry.start);
            }
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(entry.text.trim());
            window_end = entry.start + entry.duration;

            if text.chars().count() >= self.threshold {
                windows.push(TranscriptWindow {
                    text: std::mem::take(&mut text),
                    start_time: window_start.take().unwrap_or(entry.start),
                    end_time: window_end,
                });
            }
        }

        if let Some(start_time) = window_start {
            if !text.is_empty() {
                windows.push(TranscriptWindow {
                    text,
                    start_time,
                    end_time: window_end,
                });
            }
        }

        windows
    }
}

impl Default for TranscriptWindower {
    fn default() -> Self {
        Self::new(800)
    }
}
