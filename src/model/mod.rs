mod column;
mod kind;
mod options;
mod value;

pub use column::{
    ColumnConfig, ColumnDefinition, NumberFormat, RelationConfig, RelationMode, RollupConfig,
    RollupFunction,
};
pub use kind::PropertyKind;
pub use options::{OptionGroup, OptionList, SelectOption, StatusOptions};
pub use value::{value_spec, FormulaResult, PropertyValue, ValueData};

use indexmap::IndexMap;

use crate::types::{plain_text_of, DatabaseId, FileObject, Icon, PageId, Parent, RichTextItem};

/// A fetched Notion database: its metadata and ordered columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Database {
    pub id: DatabaseId,
    pub title: Vec<RichTextItem>,
    pub description: Vec<RichTextItem>,
    pub icon: Option<Icon>,
    pub cover: Option<FileObject>,
    pub parent: Option<Parent>,
    pub url: String,
    pub is_inline: bool,
    pub archived: bool,
    pub columns: IndexMap<String, ColumnDefinition>,
}

impl Database {
    /// Plain text of the database title.
    pub fn title(&self) -> String {
        plain_text_of(&self.title)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.get(name)
    }

    pub fn title_column(&self) -> Option<&ColumnDefinition> {
        self.columns
            .values()
            .find(|column| column.kind() == PropertyKind::Title)
    }
}

/// A fetched Notion page with its property values in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub id: PageId,
    pub parent: Option<Parent>,
    pub url: String,
    pub archived: bool,
    pub icon: Option<Icon>,
    pub cover: Option<FileObject>,
    pub properties: IndexMap<String, PropertyValue>,
}

impl Page {
    /// Plain text of the title value, empty when the page has none.
    pub fn title(&self) -> String {
        self.properties
            .values()
            .find(|value| value.kind() == PropertyKind::Title)
            .and_then(PropertyValue::plain_text)
            .unwrap_or_default()
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}
