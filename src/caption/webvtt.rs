//! `WebVTT` (.vtt) reader
//!
//! Handles the subset that subtitle exports use in practice: the `WEBVTT`
//! header, `NOTE`/`STYLE`/`REGION` blocks, optional cue identifiers and cue
//! settings after the end timestamp.

use anyhow::{anyhow, bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{parse_timestamp, Caption};

static TIMING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\S+)\s+-->\s+(\S+)(?:\s+.*)?$").expect("timing regex is valid")
});

/// Parse `WebVTT` content into captions
pub fn parse_webvtt(content: &str) -> Result<Vec<Caption>> {
    let content = content.trim_start_matches('\u{feff}');
    let mut blocks = split_blocks(content).into_iter();

    let header = blocks
        .next()
        .ok_or_else(|| anyhow!("empty WebVTT document"))?;
    if !header[0].starts_with("WEBVTT") {
        bail!("missing WEBVTT header");
    }

    let mut captions = Vec::new();
    for block in blocks {
        let first = block[0];
        if ["NOTE", "STYLE", "REGION"]
            .iter()
            .any(|kind| first == *kind || first.starts_with(&format!("{kind} ")))
        {
            continue;
        }

        // Optional cue identifier precedes the timing line
        let timing_at = if first.contains("-->") { 0 } else { 1 };
        let timing = block
            .get(timing_at)
            .ok_or_else(|| anyhow!("cue without timing: {first}"))?;
        let (start_ms, end_ms) = parse_timing_line(timing)?;

        let text = block[timing_at + 1..].join("\n");
        captions.push(Caption::from_millis(start_ms, end_ms, text));
    }

    Ok(captions)
}

/// Group lines into blank-line separated blocks
fn split_blocks(content: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in content.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

/// Parse "HH:MM:SS.mmm --> HH:MM:SS.mmm [settings]"
fn parse_timing_line(line: &str) -> Result<(u64, u64)> {
    let caps = TIMING_LINE
        .captures(line)
        .ok_or_else(|| anyhow!("Invalid timestamp line: {line}"))?;

    Ok((
        parse_timestamp(&caps[1], '.')?,
        parse_timestamp(&caps[2], '.')?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "WEBVTT - sample\n\
Kind: captions\n\
\n\
NOTE exported by a subtitle editor\n\
\n\
STYLE\n\
::cue { color: white }\n\
\n\
intro\n\
00:00:00.000 --> 00:00:01.500 align:start position:10%\n\
Hello\n\
world\n\
\n\
00:01.500 --> 00:03.250\n\
Second cue\n";

    #[test]
    fn test_parse_webvtt() {
        let captions = parse_webvtt(SAMPLE).unwrap();

        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0], Caption::new(0.0, 1.5, "Hello\nworld"));
        assert!((captions[1].start - 1.5).abs() < f64::EPSILON);
        assert!((captions[1].end - 3.25).abs() < f64::EPSILON);
        assert_eq!(captions[1].text, "Second cue");
    }

    #[test]
    fn test_missing_header() {
        let err = parse_webvtt("00:00.000 --> 00:01.000\nHi\n").unwrap_err();
        assert!(err.to_string().contains("WEBVTT"));
    }

    #[test]
    fn test_header_only() {
        assert!(parse_webvtt("WEBVTT\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_cue_without_timing() {
        assert!(parse_webvtt("WEBVTT\n\nid-only\n").is_err());
    }

    #[test]
    fn test_empty_cue_text() {
        let captions = parse_webvtt("WEBVTT\n\n00:00.000 --> 00:01.000\n").unwrap();
        assert_eq!(captions, vec![Caption::new(0.0, 1.0, "")]);
    }
}
