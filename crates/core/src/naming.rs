use crate::resolver::CaptureTimestamp;
use crate::sanitize::sanitize_filename;
use chrono::format::{Item, StrftimeItems};
use std::fmt::Write;
use thiserror::Error;

pub const DEFAULT_TIME_STAMP: &str = "%Y-%m-%d %H-%M-%S";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("time stamp pattern is empty")]
    Empty,
    #[error("time stamp pattern {0:?} is not a valid strftime pattern")]
    InvalidPattern(String),
    #[error("time stamp pattern {pattern:?} cannot be rendered from {field}")]
    Render {
        pattern: String,
        field: &'static str,
    },
}

/// Output naming rule: `prefix formatted-time postfix`, joined by single
/// spaces with empty parts left out.
#[derive(Debug, Clone)]
pub struct NameFormat {
    pattern: String,
    items: Vec<Item<'static>>,
    prefix: String,
    postfix: String,
}

impl NameFormat {
    pub fn new(pattern: &str, prefix: &str, postfix: &str) -> Result<Self, NameError> {
        let items = parse_time_stamp(pattern)?;
        Ok(Self {
            pattern: pattern.to_string(),
            items,
            prefix: prefix.trim().to_string(),
            postfix: postfix.trim().to_string(),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Renders the base name (no extension) for `timestamp`. The time is
    /// formatted as recorded, without converting between offsets.
    pub fn render(&self, timestamp: &CaptureTimestamp) -> Result<String, NameError> {
        let mut formatted = String::new();
        let written = match timestamp
            .offset
            .and_then(|offset| timestamp.local.and_local_timezone(offset).single())
        {
            Some(dt) => write!(formatted, "{}", dt.format_with_items(self.items.iter())),
            None => write!(
                formatted,
                "{}",
                timestamp.local.format_with_items(self.items.iter())
            ),
        };
        written.map_err(|_| NameError::Render {
            pattern: self.pattern.clone(),
            field: timestamp.field,
        })?;

        let joined = [self.prefix.as_str(), formatted.trim(), self.postfix.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        Ok(sanitize_filename(&joined))
    }
}

pub fn validate_time_stamp(pattern: &str) -> Result<(), NameError> {
    parse_time_stamp(pattern).map(|_| ())
}

fn parse_time_stamp(pattern: &str) -> Result<Vec<Item<'static>>, NameError> {
    if pattern.trim().is_empty() {
        return Err(NameError::Empty);
    }
    StrftimeItems::new(pattern)
        .parse_to_owned()
        .map_err(|_| NameError::InvalidPattern(pattern.to_string()))
}
