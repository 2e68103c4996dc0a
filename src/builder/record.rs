// src/builder/record.rs
//! Database and page level builders and the drafts that combine them with
//! column and value sets.

use serde_json::{json, Map, Value};

use super::coercion::{self, FieldSpec, Input, InputShape};
use super::column_set::ColumnSet;
use super::patch::{Patch, PatchSchema};
use super::value_set::ValueSet;
use crate::error::BuildError;
use crate::types::{render_rich_text, FileObject, Icon, Parent, RichTextItem};

/// Canonical value of a database or page level field.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordField {
    Text(Vec<RichTextItem>),
    Icon(Option<Icon>),
    Cover(Option<FileObject>),
    Flag(bool),
}

fn icon(spec: &FieldSpec, input: Input) -> Result<RecordField, BuildError> {
    Ok(RecordField::Icon(match input {
        Input::Text(text) => Some(Icon::parse(&text)?),
        Input::File(file) => Some(Icon::from(&file)),
        Input::Null => None,
        other => return Err(spec.reject(&other)),
    }))
}

fn cover(spec: &FieldSpec, input: Input) -> Result<RecordField, BuildError> {
    Ok(RecordField::Cover(match input {
        Input::Text(url) => Some(FileObject::external(&url)?),
        Input::File(file) => Some(file),
        Input::Null => None,
        other => return Err(spec.reject(&other)),
    }))
}

fn flag(spec: &FieldSpec, input: Input) -> Result<RecordField, BuildError> {
    match input {
        Input::Bool(b) => Ok(RecordField::Flag(b)),
        other => Err(spec.reject(&other)),
    }
}

fn render_record_field(value: &RecordField) -> Value {
    match value {
        RecordField::Text(items) => render_rich_text(items),
        RecordField::Icon(icon) => icon.as_ref().map_or(Value::Null, Icon::render),
        // Covers only accept the bare file shape, without a name.
        RecordField::Cover(file) => file.as_ref().map_or(Value::Null, |file| {
            json!({ "type": "external", "external": { "url": file.url() } })
        }),
        RecordField::Flag(b) => json!(b),
    }
}

const ICON: &[InputShape] = &[InputShape::Text, InputShape::File, InputShape::Null];
const COVER: &[InputShape] = &[InputShape::Text, InputShape::File, InputShape::Null];

/// Fields of a database object.
#[derive(Debug, Clone, Copy)]
pub struct DatabaseFields;

impl PatchSchema for DatabaseFields {
    type Value = RecordField;
    const OWNER: &'static str = "database";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("title", &[InputShape::Text, InputShape::RichText]),
        FieldSpec::new(
            "description",
            &[InputShape::Text, InputShape::RichText, InputShape::Null],
        ),
        FieldSpec::new("icon", ICON),
        FieldSpec::new("cover", COVER),
        FieldSpec::new("is_inline", &[InputShape::Bool]),
    ];

    fn normalize(field: &FieldSpec, input: Input) -> Result<RecordField, BuildError> {
        match field.name {
            "title" | "description" => Ok(RecordField::Text(coercion::rich_text(field, input)?)),
            "icon" => icon(field, input),
            "cover" => cover(field, input),
            _ => flag(field, input),
        }
    }

    fn render(_field: &str, value: &RecordField) -> Result<Value, BuildError> {
        Ok(render_record_field(value))
    }
}

/// Fields of a page object.
#[derive(Debug, Clone, Copy)]
pub struct PageFields;

impl PatchSchema for PageFields {
    type Value = RecordField;
    const OWNER: &'static str = "page";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("archived", &[InputShape::Bool]),
        FieldSpec::new("icon", ICON),
        FieldSpec::new("cover", COVER),
    ];

    fn normalize(field: &FieldSpec, input: Input) -> Result<RecordField, BuildError> {
        match field.name {
            "icon" => icon(field, input),
            "cover" => cover(field, input),
            _ => flag(field, input),
        }
    }

    fn render(_field: &str, value: &RecordField) -> Result<Value, BuildError> {
        Ok(render_record_field(value))
    }
}

pub type DatabaseBuilder = Patch<DatabaseFields>;
pub type PageBuilder = Patch<PageFields>;

fn missing_report(owner: &str, missing: Vec<String>) -> Result<(), BuildError> {
    if missing.is_empty() {
        Ok(())
    } else {
        Err(BuildError::MissingField {
            owner: owner.to_string(),
            missing,
        })
    }
}

/// Payload for creating a database.
#[derive(Debug, Clone)]
pub struct DatabaseDraft {
    pub parent: Option<Parent>,
    pub record: DatabaseBuilder,
    pub columns: ColumnSet,
}

impl DatabaseDraft {
    pub fn new(parent: Parent) -> Self {
        Self {
            parent: Some(parent),
            record: DatabaseBuilder::new(),
            columns: ColumnSet::new(),
        }
    }

    pub fn build(&self) -> Result<Value, BuildError> {
        let mut missing = Vec::new();
        if !self.record.is_set("title") {
            missing.push("title".to_string());
        }
        if self.parent.is_none() {
            missing.push("parent".to_string());
        }
        missing_report("DatabaseDraft", missing)?;

        let mut payload = Map::new();
        if let Some(parent) = &self.parent {
            payload.insert("parent".into(), parent.render());
        }
        payload.extend(self.record.render()?);
        payload.insert("properties".into(), Value::Object(self.columns.build()?));
        Ok(Value::Object(payload))
    }
}

/// Payload for altering an existing database.
#[derive(Debug, Clone, Default)]
pub struct DatabaseUpdate {
    pub record: DatabaseBuilder,
    pub columns: Option<ColumnSet>,
}

impl DatabaseUpdate {
    pub fn build(&self) -> Result<Value, BuildError> {
        let mut payload = self.record.render()?;
        if let Some(columns) = &self.columns {
            payload.insert("properties".into(), Value::Object(columns.build()?));
        }
        Ok(Value::Object(payload))
    }
}

/// Payload for creating a page.
#[derive(Debug, Clone)]
pub struct PageDraft {
    pub parent: Option<Parent>,
    pub record: PageBuilder,
    pub values: ValueSet,
}

impl PageDraft {
    pub fn new(parent: Parent, values: ValueSet) -> Self {
        Self {
            parent: Some(parent),
            record: PageBuilder::new(),
            values,
        }
    }

    pub fn build(&self) -> Result<Value, BuildError> {
        let mut missing = Vec::new();
        if self.parent.is_none() {
            missing.push("parent".to_string());
        }
        if self.values.title().is_none() {
            missing.push("title".to_string());
        }
        missing_report("PageDraft", missing)?;

        let mut payload = Map::new();
        if let Some(parent) = &self.parent {
            payload.insert("parent".into(), parent.render());
        }
        payload.extend(self.record.render()?);
        payload.insert("properties".into(), Value::Object(self.values.build()?));
        Ok(Value::Object(payload))
    }
}

/// Payload for updating a fetched page.
#[derive(Debug, Clone)]
pub struct PageUpdate {
    pub record: PageBuilder,
    pub values: ValueSet,
}

impl PageUpdate {
    pub fn new(values: ValueSet) -> Self {
        Self {
            record: PageBuilder::new(),
            values,
        }
    }

    /// Record fields plus the values edited since the page was decoded.
    pub fn build(&self) -> Result<Value, BuildError> {
        self.build_with(self.values.build_modified()?)
    }

    /// Record fields plus every updatable value.
    pub fn build_all(&self) -> Result<Value, BuildError> {
        self.build_with(self.values.build()?)
    }

    fn build_with(&self, properties: Map<String, Value>) -> Result<Value, BuildError> {
        let mut payload = self.record.render()?;
        if !properties.is_empty() {
            payload.insert("properties".into(), Value::Object(properties));
        }
        Ok(Value::Object(payload))
    }
}
