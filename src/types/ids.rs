use super::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// Strong typing for IDs with phantom types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Id<T> {
    value: String,
    _phantom: PhantomData<T>,
}

/// Marker types for different ID kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatabaseMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserMarker;

pub type PageId = Id<PageMarker>;
pub type BlockId = Id<BlockMarker>;
pub type DatabaseId = Id<DatabaseMarker>;
pub type UserId = Id<UserMarker>;

impl<T> Id<T> {
    /// Parses dashed, undashed and URL forms into a normalized (undashed, lowercase) ID.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let value = normalize_notion_id(input)?;
        Ok(Self {
            value,
            _phantom: PhantomData,
        })
    }

    /// Create a new random v4 UUID ID
    pub fn new_v4() -> Self {
        Self {
            value: Uuid::new_v4().as_simple().to_string(),
            _phantom: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The hyphenated form the Notion API expects in request bodies.
    pub fn to_dashed(&self) -> String {
        format!(
            "{}-{}-{}-{}-{}",
            &self.value[0..8],
            &self.value[8..12],
            &self.value[12..16],
            &self.value[16..20],
            &self.value[20..32]
        )
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> std::str::FromStr for Id<T> {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_dashed().serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(serde::de::Error::custom)
    }
}

/// Normalize the accepted Notion ID spellings into 32 lowercase hex characters.
fn normalize_notion_id(input: &str) -> Result<String, ValidationError> {
    let cleaned = input.trim().trim_end_matches('/');

    if let Ok(uuid) = Uuid::parse_str(cleaned) {
        return Ok(uuid.as_simple().to_string());
    }

    if cleaned.len() == 32 && cleaned.chars().all(|c| c.is_ascii_hexdigit()) {
        return Ok(cleaned.to_lowercase());
    }

    if cleaned.starts_with("http://") || cleaned.starts_with("https://") {
        return extract_id_from_url(cleaned);
    }

    Err(ValidationError::InvalidId(format!(
        "expected a 32 character hex ID, a UUID or a Notion URL, got '{}'",
        input
    )))
}

/// Extract the trailing ID from a Notion URL.
fn extract_id_from_url(url: &str) -> Result<String, ValidationError> {
    lazy_static::lazy_static! {
        static ref ID_REGEX: Regex = Regex::new(
            r"(?:[/-])([a-fA-F0-9]{32}|[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12})(?:[/?#]|$)"
        ).expect("Failed to compile Notion ID regex - this is a bug in the code");
    }

    ID_REGEX
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().replace('-', "").to_lowercase())
        .ok_or_else(|| ValidationError::InvalidId(format!("No valid ID found in URL: {}", url)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_parsing() {
        let id = PageId::parse("550e8400e29b41d4a716446655440000").unwrap();
        assert_eq!(id.as_str(), "550e8400e29b41d4a716446655440000");

        let id = PageId::parse("550E8400-E29B-41D4-A716-446655440000").unwrap();
        assert_eq!(id.as_str(), "550e8400e29b41d4a716446655440000");

        let id = DatabaseId::parse(
            "https://www.notion.so/workspace/Tasks-550e8400e29b41d4a716446655440000?v=1",
        )
        .unwrap();
        assert_eq!(id.as_str(), "550e8400e29b41d4a716446655440000");
    }

    #[test]
    fn test_invalid_ids() {
        assert!(PageId::parse("too-short").is_err());
        assert!(PageId::parse("zz0e8400e29b41d4a716446655440000").is_err());
        assert!(PageId::parse("").is_err());
        assert!(PageId::parse("https://www.notion.so/no-id-here").is_err());
    }

    #[test]
    fn test_to_dashed() {
        let id = PageId::parse("550e8400e29b41d4a716446655440000").unwrap();
        assert_eq!(id.to_dashed(), "550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(
            serde_json::to_value(&id).unwrap(),
            serde_json::json!("550e8400-e29b-41d4-a716-446655440000")
        );
    }
}
