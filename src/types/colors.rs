use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Notion color vocabulary shared by annotations and select options.
///
/// Options only accept the ten base colors; the `*_background` variants
/// exist for rich text annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    Default,
    Gray,
    Brown,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    GrayBackground,
    BrownBackground,
    RedBackground,
    OrangeBackground,
    YellowBackground,
    GreenBackground,
    BlueBackground,
    PurpleBackground,
    PinkBackground,
}

impl std::str::FromStr for Color {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Color::Default),
            "gray" => Ok(Color::Gray),
            "brown" => Ok(Color::Brown),
            "red" => Ok(Color::Red),
            "orange" => Ok(Color::Orange),
            "yellow" => Ok(Color::Yellow),
            "green" => Ok(Color::Green),
            "blue" => Ok(Color::Blue),
            "purple" => Ok(Color::Purple),
            "pink" => Ok(Color::Pink),
            "gray_background" => Ok(Color::GrayBackground),
            "brown_background" => Ok(Color::BrownBackground),
            "red_background" => Ok(Color::RedBackground),
            "orange_background" => Ok(Color::OrangeBackground),
            "yellow_background" => Ok(Color::YellowBackground),
            "green_background" => Ok(Color::GreenBackground),
            "blue_background" => Ok(Color::BlueBackground),
            "purple_background" => Ok(Color::PurpleBackground),
            "pink_background" => Ok(Color::PinkBackground),
            _ => Err(ValidationError::InvalidColor(s.to_string())),
        }
    }
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Default => "default",
            Color::Gray => "gray",
            Color::Brown => "brown",
            Color::Red => "red",
            Color::Orange => "orange",
            Color::Yellow => "yellow",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Purple => "purple",
            Color::Pink => "pink",
            Color::GrayBackground => "gray_background",
            Color::BrownBackground => "brown_background",
            Color::RedBackground => "red_background",
            Color::OrangeBackground => "orange_background",
            Color::YellowBackground => "yellow_background",
            Color::GreenBackground => "green_background",
            Color::BlueBackground => "blue_background",
            Color::PurpleBackground => "purple_background",
            Color::PinkBackground => "pink_background",
        }
    }

    pub fn is_background(&self) -> bool {
        matches!(
            self,
            Color::GrayBackground
                | Color::BrownBackground
                | Color::RedBackground
                | Color::OrangeBackground
                | Color::YellowBackground
                | Color::GreenBackground
                | Color::BlueBackground
                | Color::PurpleBackground
                | Color::PinkBackground
        )
    }

    /// Parses a color that is legal on a select, multi-select or status option.
    pub fn parse_option_color(s: &str) -> Result<Self, ValidationError> {
        let color: Color = s.parse()?;
        if color.is_background() {
            return Err(ValidationError::InvalidColor(format!(
                "{} (background colors are not valid for options)",
                s
            )));
        }
        Ok(color)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
