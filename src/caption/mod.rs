//! Caption sequences and the readers that produce them
//!
//! A caption is a `(start, end, text)` triple in seconds. Everything downstream
//! takes a `&[Caption]` ordered by start time.
//!
//! # Formats
//!
//! - **WebVTT** (`.vtt`) - the usual source for VIA subtitle projects
//! - **SubRip** (`.srt`)
//! - **JSON** (`.json`) - an array of `{"start", "end", "text"}` objects

pub mod srt;
pub mod webvtt;

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

pub use srt::parse_srt;
pub use webvtt::parse_webvtt;

/// A single caption with timing in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Caption text (may contain newlines)
    pub text: String,
}

impl Caption {
    /// Create a new caption
    #[must_use]
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Build a caption from millisecond timings
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_millis(start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        Self::new(start_ms as f64 / 1000.0, end_ms as f64 / 1000.0, text)
    }

    /// Duration in seconds
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Caption file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionFormat {
    /// `WebVTT` (.vtt)
    WebVtt,
    /// `SubRip` (.srt)
    Srt,
    /// JSON array of captions (.json)
    Json,
}

impl CaptionFormat {
    /// Detect the format from a file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "vtt" => Some(Self::WebVtt),
            "srt" => Some(Self::Srt),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Parse caption content in this format
    pub fn parse(self, content: &str) -> Result<Vec<Caption>> {
        match self {
            Self::WebVtt => parse_webvtt(content),
            Self::Srt => parse_srt(content),
            Self::Json => serde_json::from_str(content).context("invalid caption JSON"),
        }
    }
}

/// Read a caption file, picking the parser by extension
pub fn read_captions(path: impl AsRef<Path>) -> Result<Vec<Caption>> {
    let path = path.as_ref();
    let format = CaptionFormat::from_path(path)
        .ok_or_else(|| anyhow!("unsupported caption format: {}", path.display()))?;

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let captions = format
        .parse(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    tracing::debug!("Read {} captions from {}", captions.len(), path.display());
    Ok(captions)
}

/// Check the well-formedness the segmentation engine assumes
///
/// Timings must be finite and non-negative, every caption must satisfy
/// `start <= end`, and start times must not decrease.
pub fn validate(captions: &[Caption]) -> Result<()> {
    let mut previous_start = 0.0_f64;

    for (i, caption) in captions.iter().enumerate() {
        let cue = i + 1;
        if !caption.start.is_finite() || !caption.end.is_finite() {
            bail!("caption {cue}: non-finite timing");
        }
        if caption.start < 0.0 {
            bail!("caption {cue}: negative start time {}", caption.start);
        }
        if caption.start > caption.end {
            bail!(
                "caption {cue}: start {} is after end {}",
                caption.start,
                caption.end
            );
        }
        if caption.start < previous_start {
            bail!(
                "caption {cue}: start {} precedes previous start {previous_start}",
                caption.start
            );
        }
        previous_start = caption.start;
    }

    Ok(())
}

/// Parse a `[HH:]MM:SS<sep>mmm` timestamp into milliseconds
///
/// `sep` is `.` for `WebVTT` and `,` for `SubRip`.
pub(crate) fn parse_timestamp(ts: &str, sep: char) -> Result<u64> {
    let (clock, millis) = ts
        .split_once(sep)
        .ok_or_else(|| anyhow!("Invalid timestamp: {ts}"))?;

    let parts: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (h.parse::<u64>()?, m.parse::<u64>()?, s.parse::<u64>()?),
        [m, s] => (0, m.parse::<u64>()?, s.parse::<u64>()?),
        _ => bail!("Invalid timestamp: {ts}"),
    };

    if millis.len() != 3 {
        bail!("Invalid timestamp: {ts}");
    }
    let millis: u64 = millis.parse()?;

    hours
        .checked_mul(3_600_000)
        .and_then(|ms| ms.checked_add(minutes.checked_mul(60_000)?))
        .and_then(|ms| ms.checked_add(seconds.checked_mul(1000)?))
        .and_then(|ms| ms.checked_add(millis))
        .ok_or_else(|| anyhow!("Invalid timestamp: {ts}"))
}
