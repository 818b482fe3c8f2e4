//! Caption segmentation
//!
//! Splits an ordered caption sequence into contiguous windows of `group_size`
//! captions. With a secondary (reference) sequence the reference decides how
//! many windows there are and roughly where they break, and each boundary is
//! snapped back onto the primary sequence's own captions.

use serde::{Deserialize, Serialize};

use crate::caption::Caption;
use crate::error::{ConvertError, Result};

/// A time window over the primary caption sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    /// Start time in seconds, rounded to milliseconds
    pub start: f64,
    /// End time in seconds, rounded to milliseconds
    pub end: f64,
    /// Index of the first primary caption in this window
    pub first: usize,
    /// Index of the last primary caption in this window (inclusive)
    pub last: usize,
}

impl Window {
    /// Number of primary captions covered by the window
    ///
    /// Zero for an inverted range, which only a hand-built or deserialized
    /// window can have.
    #[must_use]
    pub fn caption_count(&self) -> usize {
        if self.last < self.first {
            0
        } else {
            self.last - self.first + 1
        }
    }

    /// The primary captions covered by the window, if the range is in bounds
    /// and not inverted
    #[must_use]
    pub fn captions<'a>(&self, primary: &'a [Caption]) -> Option<&'a [Caption]> {
        if self.last < self.first {
            return None;
        }
        primary.get(self.first..=self.last)
    }
}

/// Round seconds to millisecond precision
#[must_use]
pub fn round_ms(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

/// Split captions into windows of `group_size` captions
///
/// Without `secondary` the primary captions are chunked directly. With
/// `secondary` the chunks come from the secondary sequence and each chunk's
/// boundaries are snapped to the nearest primary start times, never reusing a
/// primary caption already claimed by an earlier window.
pub fn split(
    primary: &[Caption],
    secondary: Option<&[Caption]>,
    group_size: usize,
) -> Result<Vec<Window>> {
    if group_size == 0 {
        return Err(ConvertError::InvalidInput(
            "group size must be at least 1".to_string(),
        ));
    }

    match secondary {
        None => {
            if primary.is_empty() {
                return Err(ConvertError::InvalidInput(
                    "primary caption sequence is empty".to_string(),
                ));
            }
            Ok(split_unaligned(primary, group_size))
        }
        Some(secondary) => {
            if secondary.is_empty() {
                return Err(ConvertError::InvalidInput(
                    "secondary caption sequence is empty".to_string(),
                ));
            }
            if primary.is_empty() {
                return Err(ConvertError::InvalidInput(
                    "primary caption sequence is empty".to_string(),
                ));
            }
            split_aligned(primary, secondary, group_size)
        }
    }
}

fn split_unaligned(primary: &[Caption], group_size: usize) -> Vec<Window> {
    let windows: Vec<Window> = primary
        .chunks(group_size)
        .enumerate()
        .map(|(i, chunk)| {
            let first = i * group_size;
            Window {
                start: round_ms(chunk[0].start),
                end: round_ms(chunk[chunk.len() - 1].end),
                first,
                last: first + chunk.len() - 1,
            }
        })
        .collect();

    tracing::debug!(
        "Split {} captions into {} windows of up to {group_size}",
        primary.len(),
        windows.len()
    );
    windows
}

fn split_aligned(
    primary: &[Caption],
    secondary: &[Caption],
    group_size: usize,
) -> Result<Vec<Window>> {
    let mut windows = Vec::with_capacity(secondary.len().div_ceil(group_size));
    // Index of the next primary caption not yet claimed by a window
    let mut next_free = 0;

    for (chunk_no, chunk) in secondary.chunks(group_size).enumerate() {
        let target_start = chunk[0].start;
        let target_end = chunk[chunk.len() - 1].end;

        let start_index = nearest_start_index(primary, target_start).max(next_free);
        // Both targets are matched against primary start times
        let end_index = nearest_start_index(primary, target_end);

        if end_index < start_index {
            return Err(ConvertError::AlignmentInvariantViolation {
                chunk: chunk_no,
                start_index,
                end_index,
            });
        }

        let window = Window {
            start: round_ms(primary[start_index].start),
            end: round_ms(primary[end_index].end),
            first: start_index,
            last: end_index,
        };
        tracing::debug!(
            "Chunk {chunk_no} [{target_start}, {target_end}] snapped to captions {start_index}..={end_index} [{}, {}]",
            window.start,
            window.end
        );

        windows.push(window);
        next_free = end_index + 1;
    }

    Ok(windows)
}

/// Index of the caption whose start time is closest to `target`
///
/// Ties go to the lowest index. `captions` must be non-empty.
fn nearest_start_index(captions: &[Caption], target: f64) -> usize {
    captions
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (a.start - target).abs().total_cmp(&(b.start - target).abs()))
        .map_or(0, |(i, _)| i)
}
