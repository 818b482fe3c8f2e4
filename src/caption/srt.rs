//! `SubRip` (.srt) reader

use anyhow::{anyhow, Result};

use super::{parse_timestamp, Caption};

/// Parse SRT file content into captions
pub fn parse_srt(content: &str) -> Result<Vec<Caption>> {
    let content = content.trim_start_matches('\u{feff}');
    let mut captions = Vec::new();
    let mut lines = content.lines().peekable();

    while lines.peek().is_some() {
        // Skip empty lines
        while lines.peek().is_some_and(|l| l.trim().is_empty()) {
            lines.next();
        }

        // Sequence number (skip)
        let Some(seq_line) = lines.next() else {
            break;
        };

        if seq_line.trim().parse::<u32>().is_err() {
            continue;
        }

        let Some(time_line) = lines.next() else {
            break;
        };

        let (start_ms, end_ms) = parse_timing_line(time_line)?;

        // Text lines (until blank line)
        let mut text_lines = Vec::new();
        while lines.peek().is_some_and(|l| !l.trim().is_empty()) {
            if let Some(line) = lines.next() {
                text_lines.push(line.trim_end());
            }
        }

        captions.push(Caption::from_millis(start_ms, end_ms, text_lines.join("\n")));
    }

    Ok(captions)
}

/// Parse SRT timestamp line "HH:MM:SS,mmm --> HH:MM:SS,mmm"
fn parse_timing_line(line: &str) -> Result<(u64, u64)> {
    let (start, end) = line
        .split_once("-->")
        .ok_or_else(|| anyhow!("Invalid timestamp line: {line}"))?;

    // Some encoders append position hints after the end time
    let end = end.split_whitespace().next().unwrap_or_default();

    Ok((parse_timestamp(start.trim(), ',')?, parse_timestamp(end, ',')?))
}
