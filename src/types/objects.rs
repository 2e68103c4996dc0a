// src/types/objects.rs
//! Inert wire carriers: users, files, icons, parents and dates.
//!
//! These describe request-body shapes and validate their own primitives,
//! but carry no mutation rules of their own.

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};
use regex::Regex;
use serde_json::{json, Value};
use url::Url;

use super::{BlockId, DatabaseId, PageId, UserId, ValidationError};

/// Validates an absolute http(s) URL and returns it unchanged.
pub fn validate_url(input: &str) -> Result<String, ValidationError> {
    let parsed = Url::parse(input).map_err(|e| ValidationError::InvalidUrl {
        url: input.to_string(),
        reason: e.to_string(),
    })?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ValidationError::InvalidUrl {
            url: input.to_string(),
            reason: "Only HTTP and HTTPS URLs are supported".to_string(),
        });
    }
    Ok(input.to_string())
}

/// Validates the general `local@domain.tld` shape of an email address.
pub fn validate_email(input: &str) -> Result<String, ValidationError> {
    lazy_static::lazy_static! {
        static ref EMAIL_REGEX: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .expect("Failed to compile email regex - this is a bug in the code");
    }
    if EMAIL_REGEX.is_match(input) {
        Ok(input.to_string())
    } else {
        Err(ValidationError::InvalidEmail(input.to_string()))
    }
}

/// Reference to a workspace user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRef {
    pub id: UserId,
    pub name: Option<String>,
}

impl UserRef {
    pub fn parse(id: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id: UserId::parse(id)?,
            name: None,
        })
    }

    pub fn render(&self) -> Value {
        json!({ "object": "user", "id": self.id.to_dashed() })
    }
}

/// Where a file's bytes live.
#[derive(Debug, Clone, PartialEq)]
pub enum FileSource {
    External {
        url: String,
    },
    /// Uploaded to Notion; the url is signed and expires.
    Hosted {
        url: String,
        expiry_time: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileObject {
    pub name: Option<String>,
    pub source: FileSource,
}

impl FileObject {
    pub fn external(url: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            name: None,
            source: FileSource::External {
                url: validate_url(url)?,
            },
        })
    }

    pub fn url(&self) -> &str {
        match &self.source {
            FileSource::External { url } | FileSource::Hosted { url, .. } => url,
        }
    }

    /// Hosted files are re-sent as external links to their current url,
    /// the only file shape the API accepts in a request body.
    pub fn render(&self) -> Value {
        let url = self.url();
        json!({
            "name": self.name.as_deref().unwrap_or(url),
            "type": "external",
            "external": { "url": url },
        })
    }
}

/// Page or database icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Icon {
    Emoji(String),
    External(String),
}

impl Icon {
    /// Classifies a caller string as an emoji or an external image url.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if is_emoji(input) {
            return Ok(Icon::Emoji(input.to_string()));
        }
        validate_url(input)
            .map(Icon::External)
            .map_err(|_| ValidationError::InvalidIcon(input.to_string()))
    }

    pub fn render(&self) -> Value {
        match self {
            Icon::Emoji(emoji) => json!({ "type": "emoji", "emoji": emoji }),
            Icon::External(url) => json!({ "type": "external", "external": { "url": url } }),
        }
    }
}

impl From<&FileObject> for Icon {
    fn from(file: &FileObject) -> Self {
        Icon::External(file.url().to_string())
    }
}

/// A single emoji cluster: short, no ASCII letters or digits, no whitespace.
fn is_emoji(input: &str) -> bool {
    let count = input.chars().count();
    (1..=10).contains(&count)
        && input
            .chars()
            .all(|c| !c.is_ascii() && !c.is_whitespace() && !c.is_alphanumeric())
}

/// Where a page or database lives.
#[derive(Debug, Clone, PartialEq)]
pub enum Parent {
    Page(PageId),
    Database(DatabaseId),
    Block(BlockId),
    Workspace,
}

impl Parent {
    pub fn render(&self) -> Value {
        match self {
            Parent::Page(id) => json!({ "type": "page_id", "page_id": id.to_dashed() }),
            Parent::Database(id) => {
                json!({ "type": "database_id", "database_id": id.to_dashed() })
            }
            Parent::Block(id) => json!({ "type": "block_id", "block_id": id.to_dashed() }),
            Parent::Workspace => json!({ "type": "workspace", "workspace": true }),
        }
    }
}

/// One end of a date value: a calendar day or an instant with an offset.
#[derive(Debug, Clone, PartialEq)]
pub enum DatePoint {
    Day(NaiveDate),
    Instant(DateTime<FixedOffset>),
}

impl DatePoint {
    /// Accepts `YYYY-MM-DD` or RFC 3339.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let input = input.trim();
        if let Ok(day) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            return Ok(DatePoint::Day(day));
        }
        DateTime::parse_from_rfc3339(input)
            .map(DatePoint::Instant)
            .map_err(|e| ValidationError::InvalidDate {
                input: input.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn to_iso(&self) -> String {
        match self {
            DatePoint::Day(day) => day.format("%Y-%m-%d").to_string(),
            DatePoint::Instant(at) => at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl From<DateTime<Utc>> for DatePoint {
    fn from(at: DateTime<Utc>) -> Self {
        DatePoint::Instant(at.fixed_offset())
    }
}

impl From<NaiveDate> for DatePoint {
    fn from(day: NaiveDate) -> Self {
        DatePoint::Day(day)
    }
}

/// Date value with optional end and time zone.
#[derive(Debug, Clone, PartialEq)]
pub struct DateValue {
    pub start: DatePoint,
    pub end: Option<DatePoint>,
    pub time_zone: Option<String>,
}

impl DateValue {
    pub fn starting(start: impl Into<DatePoint>) -> Self {
        Self {
            start: start.into(),
            end: None,
            time_zone: None,
        }
    }

    pub fn with_end(mut self, end: impl Into<DatePoint>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn render(&self) -> Value {
        let mut rendered = json!({ "start": self.start.to_iso() });
        if let Some(end) = &self.end {
            rendered["end"] = json!(end.to_iso());
        }
        if let Some(tz) = &self.time_zone {
            rendered["time_zone"] = json!(tz);
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn icon_detects_emoji_and_urls() {
        assert_eq!(Icon::parse("📛").unwrap(), Icon::Emoji("📛".to_string()));
        assert_eq!(
            Icon::parse("https://example.com/a.png").unwrap(),
            Icon::External("https://example.com/a.png".to_string())
        );
        assert!(Icon::parse("not an icon").is_err());
    }

    #[test]
    fn date_points_render_iso() {
        let day = DatePoint::parse("2024-03-01").unwrap();
        assert_eq!(day.to_iso(), "2024-03-01");

        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(DatePoint::from(at).to_iso(), "2024-03-01T12:30:00.000Z");

        assert!(DatePoint::parse("yesterday").is_err());
    }

    #[test]
    fn emails_and_urls_are_validated() {
        assert!(validate_email("a@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("https://example.com").is_ok());
    }

    #[test]
    fn parent_renders_dashed_ids() {
        let parent = Parent::Page(PageId::parse("550e8400e29b41d4a716446655440000").unwrap());
        assert_eq!(
            parent.render(),
            json!({"type": "page_id", "page_id": "550e8400-e29b-41d4-a716-446655440000"})
        );
    }
}
