// src/model/value.rs
//! Page property values and their update payloads.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::sync::{Arc, Weak};

use super::column::ColumnDefinition;
use super::kind::PropertyKind;
use super::options::SelectOption;
use crate::builder::coercion::{self, dispatch, FieldSpec, Input, InputShape};
use crate::error::BuildError;
use crate::schema::SchemaRegistry;
use crate::types::{
    plain_text_of, render_rich_text, validate_email, validate_url, DatePoint, DateValue,
    FileObject, PageId, RichTextItem, UserRef,
};

/// Result of a formula column, typed by the formula's output.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaResult {
    String(Option<String>),
    Number(Option<f64>),
    Boolean(Option<bool>),
    Date(Option<DateValue>),
}

/// The payload of a property value, one variant per kind.
///
/// Computed kinds carry whatever Notion last reported and are never sent back.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueData {
    Title(Vec<RichTextItem>),
    RichText(Vec<RichTextItem>),
    Number(Option<f64>),
    Select(Option<SelectOption>),
    MultiSelect(Vec<SelectOption>),
    Status(Option<SelectOption>),
    Date(Option<DateValue>),
    People(Vec<UserRef>),
    Files(Vec<FileObject>),
    Checkbox(bool),
    Url(Option<String>),
    Email(Option<String>),
    PhoneNumber(Option<String>),
    Formula(Option<FormulaResult>),
    Relation(Vec<PageId>),
    /// Rollup results mirror arbitrary column types and are kept raw.
    Rollup(Option<Value>),
    CreatedTime(Option<DateTime<Utc>>),
    CreatedBy(Option<UserRef>),
    LastEditedTime(Option<DateTime<Utc>>),
    LastEditedBy(Option<UserRef>),
}

impl ValueData {
    /// The empty value of a kind, as a fresh page would hold it.
    pub fn empty(kind: PropertyKind) -> Self {
        match kind {
            PropertyKind::Title => ValueData::Title(Vec::new()),
            PropertyKind::RichText => ValueData::RichText(Vec::new()),
            PropertyKind::Number => ValueData::Number(None),
            PropertyKind::Select => ValueData::Select(None),
            PropertyKind::MultiSelect => ValueData::MultiSelect(Vec::new()),
            PropertyKind::Status => ValueData::Status(None),
            PropertyKind::Date => ValueData::Date(None),
            PropertyKind::People => ValueData::People(Vec::new()),
            PropertyKind::Files => ValueData::Files(Vec::new()),
            PropertyKind::Checkbox => ValueData::Checkbox(false),
            PropertyKind::Url => ValueData::Url(None),
            PropertyKind::Email => ValueData::Email(None),
            PropertyKind::PhoneNumber => ValueData::PhoneNumber(None),
            PropertyKind::Formula => ValueData::Formula(None),
            PropertyKind::Relation => ValueData::Relation(Vec::new()),
            PropertyKind::Rollup => ValueData::Rollup(None),
            PropertyKind::CreatedTime => ValueData::CreatedTime(None),
            PropertyKind::CreatedBy => ValueData::CreatedBy(None),
            PropertyKind::LastEditedTime => ValueData::LastEditedTime(None),
            PropertyKind::LastEditedBy => ValueData::LastEditedBy(None),
        }
    }

    pub fn kind(&self) -> PropertyKind {
        match self {
            ValueData::Title(_) => PropertyKind::Title,
            ValueData::RichText(_) => PropertyKind::RichText,
            ValueData::Number(_) => PropertyKind::Number,
            ValueData::Select(_) => PropertyKind::Select,
            ValueData::MultiSelect(_) => PropertyKind::MultiSelect,
            ValueData::Status(_) => PropertyKind::Status,
            ValueData::Date(_) => PropertyKind::Date,
            ValueData::People(_) => PropertyKind::People,
            ValueData::Files(_) => PropertyKind::Files,
            ValueData::Checkbox(_) => PropertyKind::Checkbox,
            ValueData::Url(_) => PropertyKind::Url,
            ValueData::Email(_) => PropertyKind::Email,
            ValueData::PhoneNumber(_) => PropertyKind::PhoneNumber,
            ValueData::Formula(_) => PropertyKind::Formula,
            ValueData::Relation(_) => PropertyKind::Relation,
            ValueData::Rollup(_) => PropertyKind::Rollup,
            ValueData::CreatedTime(_) => PropertyKind::CreatedTime,
            ValueData::CreatedBy(_) => PropertyKind::CreatedBy,
            ValueData::LastEditedTime(_) => PropertyKind::LastEditedTime,
            ValueData::LastEditedBy(_) => PropertyKind::LastEditedBy,
        }
    }

    /// Names of the chosen options of a select, multi-select or status value.
    pub fn option_names(&self) -> Vec<String> {
        match self {
            ValueData::Select(option) | ValueData::Status(option) => {
                option.iter().map(|o| o.name.clone()).collect()
            }
            ValueData::MultiSelect(options) => options.iter().map(|o| o.name.clone()).collect(),
            _ => Vec::new(),
        }
    }

    /// Request-body payload; `None` for kinds Notion computes itself.
    fn write_payload(&self) -> Option<Value> {
        Some(match self {
            ValueData::Title(items) | ValueData::RichText(items) => render_rich_text(items),
            ValueData::Number(n) => json!(n),
            ValueData::Select(option) | ValueData::Status(option) => {
                option.as_ref().map_or(Value::Null, |o| o.render(false))
            }
            ValueData::MultiSelect(options) => {
                Value::Array(options.iter().map(|o| o.render(false)).collect())
            }
            ValueData::Date(date) => date.as_ref().map_or(Value::Null, DateValue::render),
            ValueData::People(users) => Value::Array(users.iter().map(UserRef::render).collect()),
            ValueData::Files(files) => Value::Array(files.iter().map(FileObject::render).collect()),
            ValueData::Checkbox(checked) => json!(checked),
            ValueData::Url(s) | ValueData::Email(s) | ValueData::PhoneNumber(s) => json!(s),
            ValueData::Relation(pages) => Value::Array(
                pages
                    .iter()
                    .map(|id| json!({ "id": id.to_dashed() }))
                    .collect(),
            ),
            ValueData::Formula(_)
            | ValueData::Rollup(_)
            | ValueData::CreatedTime(_)
            | ValueData::CreatedBy(_)
            | ValueData::LastEditedTime(_)
            | ValueData::LastEditedBy(_) => return None,
        })
    }
}

const TEXT: &[InputShape] = &[
    InputShape::Text,
    InputShape::RichText,
    InputShape::Null,
    InputShape::Value,
];
const NUMBER: &[InputShape] = &[InputShape::Number, InputShape::Null, InputShape::Value];
const CHOICE: &[InputShape] = &[
    InputShape::Text,
    InputShape::Option,
    InputShape::Null,
    InputShape::Value,
];
const CHOICES: &[InputShape] = &[
    InputShape::Text,
    InputShape::Option,
    InputShape::List,
    InputShape::Options,
    InputShape::Null,
    InputShape::Value,
];
const DATE: &[InputShape] = &[
    InputShape::Date,
    InputShape::Timestamp,
    InputShape::Text,
    InputShape::Null,
    InputShape::Value,
];
const PEOPLE: &[InputShape] = &[
    InputShape::User,
    InputShape::Text,
    InputShape::List,
    InputShape::Null,
    InputShape::Value,
];
const FILES: &[InputShape] = &[
    InputShape::File,
    InputShape::Text,
    InputShape::List,
    InputShape::Null,
    InputShape::Value,
];
const CHECKBOX: &[InputShape] = &[InputShape::Bool, InputShape::Value];
const PLAIN: &[InputShape] = &[InputShape::Text, InputShape::Null, InputShape::Value];
const RELATION: &[InputShape] = &[
    InputShape::Text,
    InputShape::List,
    InputShape::Null,
    InputShape::Value,
];
const COPY_ONLY: &[InputShape] = &[InputShape::Value];

/// Accepted input shapes of a value of `kind`.
pub fn value_spec(kind: PropertyKind) -> FieldSpec {
    let accepts = match kind {
        PropertyKind::Title | PropertyKind::RichText => TEXT,
        PropertyKind::Number => NUMBER,
        PropertyKind::Select | PropertyKind::Status => CHOICE,
        PropertyKind::MultiSelect => CHOICES,
        PropertyKind::Date => DATE,
        PropertyKind::People => PEOPLE,
        PropertyKind::Files => FILES,
        PropertyKind::Checkbox => CHECKBOX,
        PropertyKind::Url | PropertyKind::Email | PropertyKind::PhoneNumber => PLAIN,
        PropertyKind::Relation => RELATION,
        PropertyKind::Formula
        | PropertyKind::Rollup
        | PropertyKind::CreatedTime
        | PropertyKind::CreatedBy
        | PropertyKind::LastEditedTime
        | PropertyKind::LastEditedBy => COPY_ONLY,
    };
    FieldSpec::new(kind.as_str(), accepts)
}

/// Turns dispatched input into the payload of a value of `kind`.
fn normalize(kind: PropertyKind, spec: &FieldSpec, input: Input) -> Result<ValueData, BuildError> {
    if let Input::Value(source) = input {
        return copy_from(kind, spec, *source);
    }
    Ok(match kind {
        PropertyKind::Title => ValueData::Title(coercion::rich_text(spec, input)?),
        PropertyKind::RichText => ValueData::RichText(coercion::rich_text(spec, input)?),
        PropertyKind::Number => match input {
            Input::Number(n) if !n.is_finite() => {
                return Err(BuildError::TypeCoercion {
                    field: spec.name.to_string(),
                    found: format!("non-finite number ({})", n),
                    accepted: spec.accepts.to_vec(),
                })
            }
            Input::Number(n) => ValueData::Number(Some(n)),
            Input::Null => ValueData::Number(None),
            other => return Err(spec.reject(&other)),
        },
        PropertyKind::Select => ValueData::Select(choice(spec, input)?),
        PropertyKind::Status => ValueData::Status(choice(spec, input)?),
        PropertyKind::MultiSelect => {
            let options: Vec<SelectOption> = match input {
                Input::Options(list) => list.iter().cloned().collect(),
                other => coercion::items(other)
                    .into_iter()
                    .map(|item| -> Result<SelectOption, BuildError> {
                        choice(spec, item)?.ok_or_else(|| BuildError::InvariantViolation(
                            "multi-select entries cannot be empty".to_string(),
                        ))
                    })
                    .collect::<Result<_, _>>()?,
            };
            // First occurrence of each name wins.
            let mut picked: Vec<SelectOption> = Vec::with_capacity(options.len());
            for option in options {
                if !picked.contains(&option) {
                    picked.push(option);
                }
            }
            ValueData::MultiSelect(picked)
        }
        PropertyKind::Date => ValueData::Date(match input {
            Input::Date(date) => Some(date),
            Input::Timestamp(at) => Some(DateValue::starting(at)),
            Input::Text(text) => Some(DateValue::starting(DatePoint::parse(&text)?)),
            Input::Null => None,
            other => return Err(spec.reject(&other)),
        }),
        PropertyKind::People => ValueData::People(
            coercion::items(input)
                .into_iter()
                .map(|item| -> Result<UserRef, BuildError> {
                    match item {
                        Input::User(user) => Ok(user),
                        Input::Text(id) => Ok(UserRef::parse(&id)?),
                        other => Err(spec.reject(&other)),
                    }
                })
                .collect::<Result<_, _>>()?,
        ),
        PropertyKind::Files => ValueData::Files(
            coercion::items(input)
                .into_iter()
                .map(|item| -> Result<FileObject, BuildError> {
                    match item {
                        Input::File(file) => Ok(file),
                        Input::Text(url) => Ok(FileObject::external(&url)?),
                        other => Err(spec.reject(&other)),
                    }
                })
                .collect::<Result<_, _>>()?,
        ),
        PropertyKind::Checkbox => match input {
            Input::Bool(checked) => ValueData::Checkbox(checked),
            other => return Err(spec.reject(&other)),
        },
        PropertyKind::Url => ValueData::Url(
            coercion::optional_text(spec, input)?
                .map(|url| validate_url(&url))
                .transpose()?,
        ),
        PropertyKind::Email => ValueData::Email(
            coercion::optional_text(spec, input)?
                .map(|email| validate_email(&email))
                .transpose()?,
        ),
        PropertyKind::PhoneNumber => ValueData::PhoneNumber(coercion::optional_text(spec, input)?),
        PropertyKind::Relation => ValueData::Relation(
            coercion::items(input)
                .into_iter()
                .map(|item| -> Result<PageId, BuildError> {
                    match item {
                        Input::Text(id) => Ok(PageId::parse(&id)?),
                        other => Err(spec.reject(&other)),
                    }
                })
                .collect::<Result<_, _>>()?,
        ),
        PropertyKind::Formula
        | PropertyKind::Rollup
        | PropertyKind::CreatedTime
        | PropertyKind::CreatedBy
        | PropertyKind::LastEditedTime
        | PropertyKind::LastEditedBy => return Err(spec.reject(&input)),
    })
}

fn choice(spec: &FieldSpec, input: Input) -> Result<Option<SelectOption>, BuildError> {
    match input {
        Input::Text(name) if name.is_empty() => Ok(None),
        Input::Text(name) => Ok(Some(SelectOption::named(name))),
        Input::Option(option) => Ok(Some(option)),
        Input::Null => Ok(None),
        other => Err(spec.reject(&other)),
    }
}

/// Copies a previously decoded value; title and rich text exchange their text.
fn copy_from(
    kind: PropertyKind,
    spec: &FieldSpec,
    source: PropertyValue,
) -> Result<ValueData, BuildError> {
    match (kind, source.data) {
        (PropertyKind::Title, ValueData::RichText(items)) => Ok(ValueData::Title(items)),
        (PropertyKind::RichText, ValueData::Title(items)) => Ok(ValueData::RichText(items)),
        (kind, data) if data.kind() == kind => Ok(data),
        (_, data) => Err(BuildError::TypeCoercion {
            field: spec.name.to_string(),
            found: format!("property value ({})", data.kind()),
            accepted: spec.accepts.to_vec(),
        }),
    }
}

/// One property value of a page.
///
/// The value keeps a non-owning link to the column that defines it, resolved
/// through the [`SchemaRegistry`] when the value is attached.
#[derive(Debug, Clone)]
pub struct PropertyValue {
    pub id: String,
    pub name: String,
    data: ValueData,
    modified: bool,
    column: Weak<ColumnDefinition>,
}

impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.data == other.data
            && self.modified == other.modified
    }
}

impl PropertyValue {
    /// A fresh, empty value not yet linked to any column.
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self::from_data(String::new(), name, ValueData::empty(kind))
    }

    /// A value as decoded from a fetched page.
    pub fn from_data(id: impl Into<String>, name: impl Into<String>, data: ValueData) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data,
            modified: false,
            column: Weak::new(),
        }
    }

    /// Resolves the defining column by id. Unknown ids leave the value unlinked.
    pub fn attach(mut self, registry: &SchemaRegistry) -> Self {
        self.column = registry
            .resolve(&self.id)
            .map(|column| Arc::downgrade(&column))
            .unwrap_or_default();
        self
    }

    pub fn kind(&self) -> PropertyKind {
        self.data.kind()
    }

    pub fn data(&self) -> &ValueData {
        &self.data
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// The linked column, if it is still registered.
    pub fn belongs_to(&self) -> Option<Arc<ColumnDefinition>> {
        self.column.upgrade()
    }

    pub fn plain_text(&self) -> Option<String> {
        match &self.data {
            ValueData::Title(items) | ValueData::RichText(items) => Some(plain_text_of(items)),
            _ => None,
        }
    }

    pub fn option_names(&self) -> Vec<String> {
        self.data.option_names()
    }

    /// Replaces the value with coerced `input` and marks it modified.
    pub fn set(&mut self, input: impl Into<Input>) -> Result<(), BuildError> {
        let kind = self.kind();
        if !kind.is_updatable() {
            return Err(read_only(&self.name, kind));
        }
        let spec = value_spec(kind);
        let input = dispatch(&spec, input.into())?;
        let data = normalize(kind, &spec, input)?;
        self.check_options(&data)?;
        self.data = data;
        self.modified = true;
        Ok(())
    }

    pub fn set_text(&mut self, text: &str) -> Result<(), BuildError> {
        self.set(text)
    }

    /// Chosen options must exist on the linked column; unlinked values pass.
    fn check_options(&self, data: &ValueData) -> Result<(), BuildError> {
        let Some(column) = self.belongs_to() else {
            return Ok(());
        };
        let Some(options) = column.options() else {
            return Ok(());
        };
        match data
            .option_names()
            .into_iter()
            .find(|name| !options.contains(name))
        {
            Some(value) => Err(BuildError::SchemaValidation {
                field: self.name.clone(),
                value,
                valid: options.names(),
            }),
            None => Ok(()),
        }
    }

    /// `{kind: payload}`; status values always render `{}`.
    pub fn render(&self) -> Result<Value, BuildError> {
        let kind = self.kind();
        if !kind.is_updatable() {
            return Err(read_only(&self.name, kind));
        }
        if kind == PropertyKind::Status {
            return Ok(json!({}));
        }
        let payload = self
            .data
            .write_payload()
            .ok_or_else(|| read_only(&self.name, kind))?;
        let mut rendered = Map::new();
        rendered.insert(kind.as_str().into(), payload);
        Ok(Value::Object(rendered))
    }
}

fn read_only(name: &str, kind: PropertyKind) -> BuildError {
    BuildError::immutable(name, format!("{} values are maintained by Notion", kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnConfig, OptionList};
    use pretty_assertions::assert_eq;

    #[test]
    fn title_renders_rich_text() {
        let mut title = PropertyValue::new("Name", PropertyKind::Title);
        title.set_text("Hello").unwrap();
        assert!(title.is_modified());
        assert_eq!(
            title.render().unwrap(),
            json!({"title": [{"type": "text", "text": {"content": "Hello", "link": null}}]})
        );
    }

    #[test]
    fn computed_values_never_render() {
        for kind in [
            PropertyKind::CreatedBy,
            PropertyKind::CreatedTime,
            PropertyKind::LastEditedBy,
            PropertyKind::LastEditedTime,
            PropertyKind::Formula,
            PropertyKind::Rollup,
        ] {
            let value = PropertyValue::new("x", kind);
            assert!(matches!(
                value.render(),
                Err(BuildError::ImmutableField { .. })
            ));
        }
    }

    #[test]
    fn status_renders_empty_whatever_it_holds() {
        let mut status = PropertyValue::new("State", PropertyKind::Status);
        status.set("Done").unwrap();
        assert_eq!(status.render().unwrap(), json!({}));
    }

    #[test]
    fn options_are_checked_against_the_linked_column() {
        let registry = SchemaRegistry::new();
        registry.register(
            ColumnDefinition::new(
                "Tags",
                ColumnConfig::MultiSelect(OptionList::from_options(vec![
                    SelectOption::named("A"),
                    SelectOption::named("B"),
                ])),
            )
            .with_id("tags"),
        );

        let mut linked = PropertyValue::from_data("tags", "Tags", ValueData::MultiSelect(vec![]))
            .attach(&registry);
        assert!(linked.belongs_to().is_some());
        linked.set(vec!["A", "B"]).unwrap();

        let err = linked.set(vec!["A", "Z"]).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"'Z' is not a valid option for 'Tags'; valid option names: A, B");
        assert_eq!(linked.option_names(), vec!["A", "B"]);

        let mut unlinked = PropertyValue::from_data("other", "Tags", ValueData::MultiSelect(vec![]))
            .attach(&registry);
        unlinked.set(vec!["Z"]).unwrap();
    }

    #[test]
    fn copies_cross_between_title_and_rich_text() {
        let mut source = PropertyValue::new("Notes", PropertyKind::RichText);
        source.set_text("copied").unwrap();

        let mut title = PropertyValue::new("Name", PropertyKind::Title);
        title.set(&source).unwrap();
        assert_eq!(title.plain_text().as_deref(), Some("copied"));

        let mut checkbox = PropertyValue::new("Done", PropertyKind::Checkbox);
        let err = checkbox.set(&source).unwrap_err();
        assert!(err.to_string().contains("property value (rich_text)"));
    }

    #[test]
    fn primitive_inputs_are_validated() {
        let mut url = PropertyValue::new("Link", PropertyKind::Url);
        assert!(url.set("not a url").is_err());
        url.set("https://example.com").unwrap();
        assert_eq!(url.render().unwrap(), json!({"url": "https://example.com"}));

        let mut date = PropertyValue::new("Due", PropertyKind::Date);
        date.set("2024-03-01").unwrap();
        assert_eq!(date.render().unwrap(), json!({"date": {"start": "2024-03-01"}}));

        let mut number = PropertyValue::new("Count", PropertyKind::Number);
        number.set(Input::Null).unwrap();
        assert_eq!(number.render().unwrap(), json!({"number": null}));
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let mut number = PropertyValue::new("Count", PropertyKind::Number);
        number.set(Input::Number(2.5)).unwrap();

        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = number.set(Input::Number(bad)).unwrap_err();
            assert!(matches!(err, BuildError::TypeCoercion { .. }));
        }
        assert_eq!(number.render().unwrap(), json!({"number": 2.5}));

        let err = number.set(Input::Number(f64::NAN)).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"'number' cannot accept non-finite number (NaN); accepted input shapes: number, null, property value");
    }

    #[test]
    fn multi_select_keeps_one_entry_per_name() {
        let mut tags = PropertyValue::new("Tags", PropertyKind::MultiSelect);
        tags.set(vec!["A", "A", "B"]).unwrap();
        assert_eq!(tags.option_names(), vec!["A", "B"]);
        assert_eq!(
            tags.render().unwrap(),
            json!({"multi_select": [{"name": "A"}, {"name": "B"}]})
        );
    }
}
