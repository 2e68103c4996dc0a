use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Color;

/// The kind of rich text content.
///
/// Mentions are carried as the raw wire object: they are never validated
/// or mutated here, only copied through.
#[derive(Debug, Clone, PartialEq)]
pub enum RichTextType {
    Text { content: String, link: Option<Link> },
    Mention(Value),
    Equation { expression: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: Color,
}

/// Rich text item with formatting annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct RichTextItem {
    pub text_type: RichTextType,
    pub annotations: Annotations,
    pub plain_text: String,
    pub href: Option<String>,
}

impl RichTextItem {
    /// A plain, unannotated text run.
    pub fn plain_text(text: &str) -> Self {
        Self {
            text_type: RichTextType::Text {
                content: text.to_string(),
                link: None,
            },
            annotations: Annotations::default(),
            plain_text: text.to_string(),
            href: None,
        }
    }

    pub fn linked_text(text: &str, url: &str) -> Self {
        Self {
            text_type: RichTextType::Text {
                content: text.to_string(),
                link: Some(Link {
                    url: url.to_string(),
                }),
            },
            annotations: Annotations::default(),
            plain_text: text.to_string(),
            href: Some(url.to_string()),
        }
    }

    pub fn equation(expression: &str) -> Self {
        Self {
            text_type: RichTextType::Equation {
                expression: expression.to_string(),
            },
            annotations: Annotations::default(),
            plain_text: expression.to_string(),
            href: None,
        }
    }

    /// Wire form for request bodies.
    ///
    /// Read-only fields (`plain_text`, `href`) are dropped and annotations are
    /// only sent when they differ from the defaults.
    pub fn render(&self) -> Value {
        let mut rendered = match &self.text_type {
            RichTextType::Text { content, link } => json!({
                "type": "text",
                "text": {
                    "content": content,
                    "link": link.as_ref().map(|l| json!({ "url": l.url })),
                },
            }),
            RichTextType::Mention(mention) => json!({
                "type": "mention",
                "mention": mention,
            }),
            RichTextType::Equation { expression } => json!({
                "type": "equation",
                "equation": { "expression": expression },
            }),
        };
        if self.annotations != Annotations::default() {
            rendered["annotations"] = json!(self.annotations);
        }
        rendered
    }
}

/// Concatenated plain text of a rich text run.
pub fn plain_text_of(items: &[RichTextItem]) -> String {
    items.iter().map(|item| item.plain_text.as_str()).collect()
}

/// Renders a rich text run into its wire array.
pub fn render_rich_text(items: &[RichTextItem]) -> Value {
    Value::Array(items.iter().map(RichTextItem::render).collect())
}
