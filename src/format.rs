// src/format.rs
use crate::errors::FormatError;
use chrono::{DateTime, Utc};
use log::warn;
use std::borrow::Cow;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
const DEFAULT_TEXT_WIDTH: usize = 80;

/// Formats seconds as `H:MM:SS`, or `MM:SS` below one hour.
///
/// Absent, zero, negative and non-finite durations format as an empty string.
pub fn format_duration(duration: Option<f64>) -> String {
    let Some(seconds) = duration.filter(|d| d.is_finite() && *d > 0.0) else {
        return String::new();
    };

    let total = seconds.trunc() as u64;
    let hours = total / 3600;
    let minutes = (total / 60) % 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

pub fn format_position(position: Option<f64>, duration: Option<f64>) -> String {
    format!("{} / {}", format_duration(position), format_duration(duration))
}

/// Human readable file size, e.g. `"1 MB"`. Zero bytes means the size is unknown.
pub fn size_to_human(bytes: f64) -> Result<String, FormatError> {
    if !bytes.is_finite() {
        return Err(FormatError::NonFiniteSize);
    }
    if bytes < 0.0 {
        return Err(FormatError::NegativeSize(bytes));
    }
    if bytes == 0.0 {
        return Ok("n/a".to_string());
    }

    let mut scaled = bytes;
    let mut unit = 0;
    while scaled >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }
    Ok(format!("{} {}", scaled.round() as u64, SIZE_UNITS[unit]))
}

/// `Released: YYYY-MM-DD` for an epoch timestamp, `None` if out of range.
pub fn release_date_line(published: i64) -> Option<String> {
    let date: DateTime<Utc> = DateTime::from_timestamp(published, 0)?;
    Some(format!("Released: {}", date.format("%Y-%m-%d")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// Picks the media kind from the prefix of a MIME type.
    pub fn from_mime(mime_type: Option<&str>) -> Option<MediaKind> {
        let mime = mime_type?;
        if mime.starts_with("video") {
            Some(MediaKind::Video)
        } else if mime.starts_with("audio") {
            Some(MediaKind::Audio)
        } else {
            None
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            MediaKind::Audio => "♪",
            MediaKind::Video => "▣",
        }
    }
}

/// Truncation applied to long free-text fields when rendering entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Truncation {
    #[default]
    Off,
    /// Text wider than the limit is cut two columns short of it and gets `...`.
    Limit(usize),
}

impl Truncation {
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let Truncation::Limit(max_width) = *self else {
            return Cow::Borrowed(text);
        };
        if text.width() <= max_width {
            return Cow::Borrowed(text);
        }

        let keep = max_width.saturating_sub(2);
        let mut width = 0;
        let mut cut = String::new();
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0);
            if width + w > keep {
                break;
            }
            width += w;
            cut.push(ch);
        }
        cut.push_str("...");
        Cow::Owned(cut)
    }
}

/// Converts an HTML or plain-text description into terminal text.
pub fn format_description(description: Option<&str>) -> String {
    match description {
        Some(desc_str) => {
            if desc_str.contains('<') && desc_str.contains('>') && desc_str.contains("</") {
                match html2text::from_read(desc_str.as_bytes(), DEFAULT_TEXT_WIDTH) {
                    Ok(text_content) => text_content
                        .lines()
                        .map(|line| line.trim_end())
                        .filter(|line| !line.is_empty())
                        .collect::<Vec<&str>>()
                        .join("\n"),
                    Err(e) => {
                        warn!("Failed to convert HTML description: {}", e);
                        desc_str.to_string()
                    }
                }
            } else {
                desc_str.to_string()
            }
        }
        None => "No description available.".to_string(),
    }
    .trim()
    .to_string()
}

/// First non-empty line of a description, used as a list subtitle.
pub fn first_line(description: &str) -> String {
    format_description(Some(description))
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}
