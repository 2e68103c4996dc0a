use crate::types::ValidationError;
use std::fmt;

/// The closed catalog of column / property kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Title,
    RichText,
    Number,
    Select,
    MultiSelect,
    Status,
    Date,
    People,
    Files,
    Checkbox,
    Url,
    Email,
    PhoneNumber,
    Formula,
    Relation,
    Rollup,
    CreatedTime,
    CreatedBy,
    LastEditedTime,
    LastEditedBy,
}

impl PropertyKind {
    pub const ALL: [PropertyKind; 20] = [
        PropertyKind::Title,
        PropertyKind::RichText,
        PropertyKind::Number,
        PropertyKind::Select,
        PropertyKind::MultiSelect,
        PropertyKind::Status,
        PropertyKind::Date,
        PropertyKind::People,
        PropertyKind::Files,
        PropertyKind::Checkbox,
        PropertyKind::Url,
        PropertyKind::Email,
        PropertyKind::PhoneNumber,
        PropertyKind::Formula,
        PropertyKind::Relation,
        PropertyKind::Rollup,
        PropertyKind::CreatedTime,
        PropertyKind::CreatedBy,
        PropertyKind::LastEditedTime,
        PropertyKind::LastEditedBy,
    ];

    /// The wire tag, also the key wrapping the kind's payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::Title => "title",
            PropertyKind::RichText => "rich_text",
            PropertyKind::Number => "number",
            PropertyKind::Select => "select",
            PropertyKind::MultiSelect => "multi_select",
            PropertyKind::Status => "status",
            PropertyKind::Date => "date",
            PropertyKind::People => "people",
            PropertyKind::Files => "files",
            PropertyKind::Checkbox => "checkbox",
            PropertyKind::Url => "url",
            PropertyKind::Email => "email",
            PropertyKind::PhoneNumber => "phone_number",
            PropertyKind::Formula => "formula",
            PropertyKind::Relation => "relation",
            PropertyKind::Rollup => "rollup",
            PropertyKind::CreatedTime => "created_time",
            PropertyKind::CreatedBy => "created_by",
            PropertyKind::LastEditedTime => "last_edited_time",
            PropertyKind::LastEditedBy => "last_edited_by",
        }
    }

    /// Whether a page value of this kind may appear in an update payload.
    ///
    /// Computed and audit kinds are maintained by Notion itself.
    pub fn is_updatable(&self) -> bool {
        !matches!(
            self,
            PropertyKind::Formula
                | PropertyKind::Rollup
                | PropertyKind::CreatedTime
                | PropertyKind::CreatedBy
                | PropertyKind::LastEditedTime
                | PropertyKind::LastEditedBy
        )
    }

    /// Kinds whose column carries an option list.
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            PropertyKind::Select | PropertyKind::MultiSelect | PropertyKind::Status
        )
    }

    fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(PropertyKind::as_str).collect()
    }
}

impl std::str::FromStr for PropertyKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownVariant {
                vocabulary: "property kind",
                value: s.to_string(),
                expected: Self::names(),
            })
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
