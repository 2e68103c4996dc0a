// src/builder/coercion.rs
//! Coercion of heterogeneous caller input into canonical values.
//!
//! Every builder declares, per field, which input shapes it accepts
//! ([`FieldSpec`]). [`dispatch`] checks the caller's input against that
//! declaration and either hands it on to the field's normalizer or fails
//! with a [`BuildError::TypeCoercion`] listing every accepted shape. The
//! normalizers themselves are exhaustive matches over [`Input`] living next
//! to the type they produce.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::fmt;

use crate::error::BuildError;
use crate::model::{
    ColumnConfig, ColumnDefinition, OptionList, PropertyValue, RelationConfig, RollupConfig,
    SelectOption,
};
use crate::types::{DateValue, FileObject, RichTextItem, UserRef};

/// Caller input before coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Null,
    Text(String),
    Bool(bool),
    Number(f64),
    Timestamp(DateTime<Utc>),
    Date(DateValue),
    List(Vec<Input>),
    RichText(Vec<RichTextItem>),
    Option(SelectOption),
    Options(OptionList),
    User(UserRef),
    File(FileObject),
    Relation(RelationConfig),
    Rollup(RollupConfig),
    /// A value copied out of a previously decoded record.
    Value(Box<PropertyValue>),
    Column(Box<ColumnDefinition>),
}

/// The runtime shape of an [`Input`], used in dispatch tables and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputShape {
    Null,
    Text,
    Bool,
    Number,
    Timestamp,
    Date,
    List,
    RichText,
    Option,
    Options,
    User,
    File,
    Relation,
    Rollup,
    Value,
    Column,
}

impl fmt::Display for InputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputShape::Null => "null",
            InputShape::Text => "text",
            InputShape::Bool => "bool",
            InputShape::Number => "number",
            InputShape::Timestamp => "timestamp",
            InputShape::Date => "date",
            InputShape::List => "list",
            InputShape::RichText => "rich text",
            InputShape::Option => "select option",
            InputShape::Options => "option list",
            InputShape::User => "user",
            InputShape::File => "file",
            InputShape::Relation => "relation config",
            InputShape::Rollup => "rollup config",
            InputShape::Value => "property value",
            InputShape::Column => "column definition",
        };
        f.write_str(name)
    }
}

impl Input {
    pub fn shape(&self) -> InputShape {
        match self {
            Input::Null => InputShape::Null,
            Input::Text(_) => InputShape::Text,
            Input::Bool(_) => InputShape::Bool,
            Input::Number(_) => InputShape::Number,
            Input::Timestamp(_) => InputShape::Timestamp,
            Input::Date(_) => InputShape::Date,
            Input::List(_) => InputShape::List,
            Input::RichText(_) => InputShape::RichText,
            Input::Option(_) => InputShape::Option,
            Input::Options(_) => InputShape::Options,
            Input::User(_) => InputShape::User,
            Input::File(_) => InputShape::File,
            Input::Relation(_) => InputShape::Relation,
            Input::Rollup(_) => InputShape::Rollup,
            Input::Value(_) => InputShape::Value,
            Input::Column(_) => InputShape::Column,
        }
    }

    /// Plain JSON as found in edit files: strings, numbers, booleans, null
    /// and arrays of those. Objects have no unambiguous reading and are
    /// rejected.
    pub fn from_json(value: &Value) -> Result<Self, BuildError> {
        Ok(match value {
            Value::Null => Input::Null,
            Value::Bool(b) => Input::Bool(*b),
            Value::Number(n) => Input::Number(n.as_f64().ok_or_else(|| {
                BuildError::InvariantViolation(format!("number {} is out of range", n))
            })?),
            Value::String(s) => Input::Text(s.clone()),
            Value::Array(items) => Input::List(
                items
                    .iter()
                    .map(Input::from_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Value::Object(_) => {
                return Err(BuildError::TypeCoercion {
                    field: "json input".to_string(),
                    found: "object".to_string(),
                    accepted: vec![
                        InputShape::Null,
                        InputShape::Bool,
                        InputShape::Number,
                        InputShape::Text,
                        InputShape::List,
                    ],
                })
            }
        })
    }

    /// Human description used in coercion errors.
    pub(crate) fn describe(&self) -> String {
        match self {
            Input::Value(value) => format!("property value ({})", value.kind()),
            Input::Column(column) => format!("column definition ({})", column.kind()),
            other => other.shape().to_string(),
        }
    }
}

/// The input shapes a single field accepts.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub accepts: &'static [InputShape],
}

impl FieldSpec {
    pub const fn new(name: &'static str, accepts: &'static [InputShape]) -> Self {
        Self { name, accepts }
    }

    /// Coercion failure for an input this field's normalizer cannot use.
    pub(crate) fn reject(&self, input: &Input) -> BuildError {
        BuildError::TypeCoercion {
            field: self.name.to_string(),
            found: input.describe(),
            accepted: self.accepts.to_vec(),
        }
    }
}

/// Checks `input` against the field's accepted shapes.
pub fn dispatch(spec: &FieldSpec, input: Input) -> Result<Input, BuildError> {
    if spec.accepts.contains(&input.shape()) {
        log::trace!("Coercing {} into '{}'", input.shape(), spec.name);
        Ok(input)
    } else {
        Err(spec.reject(&input))
    }
}

/// Rich text from plain text or an already-built run.
pub(crate) fn rich_text(spec: &FieldSpec, input: Input) -> Result<Vec<RichTextItem>, BuildError> {
    match input {
        Input::Text(text) if text.is_empty() => Ok(Vec::new()),
        Input::Text(text) => Ok(vec![RichTextItem::plain_text(&text)]),
        Input::RichText(items) => Ok(items),
        Input::Null => Ok(Vec::new()),
        other => Err(spec.reject(&other)),
    }
}

/// Flattens a list input; any single input is a one-element list.
pub(crate) fn items(input: Input) -> Vec<Input> {
    match input {
        Input::List(items) => items,
        Input::Null => Vec::new(),
        single => vec![single],
    }
}

/// Text that may be explicitly cleared with null.
pub(crate) fn optional_text(spec: &FieldSpec, input: Input) -> Result<Option<String>, BuildError> {
    match input {
        Input::Text(text) if text.is_empty() => Ok(None),
        Input::Text(text) => Ok(Some(text)),
        Input::Null => Ok(None),
        other => Err(spec.reject(&other)),
    }
}

impl From<&str> for Input {
    fn from(s: &str) -> Self {
        Input::Text(s.to_string())
    }
}

impl From<String> for Input {
    fn from(s: String) -> Self {
        Input::Text(s)
    }
}

impl From<bool> for Input {
    fn from(b: bool) -> Self {
        Input::Bool(b)
    }
}

impl From<f64> for Input {
    fn from(n: f64) -> Self {
        Input::Number(n)
    }
}

impl From<u32> for Input {
    fn from(n: u32) -> Self {
        Input::Number(f64::from(n))
    }
}

impl From<i32> for Input {
    fn from(n: i32) -> Self {
        Input::Number(f64::from(n))
    }
}

impl From<DateTime<Utc>> for Input {
    fn from(at: DateTime<Utc>) -> Self {
        Input::Timestamp(at)
    }
}

impl From<NaiveDate> for Input {
    fn from(day: NaiveDate) -> Self {
        Input::Date(DateValue::starting(day))
    }
}

impl From<DateValue> for Input {
    fn from(date: DateValue) -> Self {
        Input::Date(date)
    }
}

impl From<SelectOption> for Input {
    fn from(option: SelectOption) -> Self {
        Input::Option(option)
    }
}

impl From<OptionList> for Input {
    fn from(options: OptionList) -> Self {
        Input::Options(options)
    }
}

impl From<UserRef> for Input {
    fn from(user: UserRef) -> Self {
        Input::User(user)
    }
}

impl From<FileObject> for Input {
    fn from(file: FileObject) -> Self {
        Input::File(file)
    }
}

impl From<RelationConfig> for Input {
    fn from(relation: RelationConfig) -> Self {
        Input::Relation(relation)
    }
}

impl From<RollupConfig> for Input {
    fn from(rollup: RollupConfig) -> Self {
        Input::Rollup(rollup)
    }
}

impl From<PropertyValue> for Input {
    fn from(value: PropertyValue) -> Self {
        Input::Value(Box::new(value))
    }
}

impl From<&PropertyValue> for Input {
    fn from(value: &PropertyValue) -> Self {
        Input::Value(Box::new(value.clone()))
    }
}

impl From<ColumnDefinition> for Input {
    fn from(column: ColumnDefinition) -> Self {
        Input::Column(Box::new(column))
    }
}

impl From<ColumnConfig> for Input {
    fn from(config: ColumnConfig) -> Self {
        Input::Column(Box::new(ColumnDefinition::from(config)))
    }
}

impl<T: Into<Input>> From<Vec<T>> for Input {
    fn from(items: Vec<T>) -> Self {
        Input::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Input>> From<Option<T>> for Input {
    fn from(value: Option<T>) -> Self {
        value.map_or(Input::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CHECKBOX: FieldSpec = FieldSpec::new("checkbox", &[InputShape::Bool, InputShape::Value]);

    #[test]
    fn dispatch_accepts_declared_shapes_only() {
        assert_eq!(dispatch(&CHECKBOX, true.into()).unwrap(), Input::Bool(true));

        let err = dispatch(&CHECKBOX, "yes".into()).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"'checkbox' cannot accept text; accepted input shapes: bool, property value");
    }

    #[test]
    fn json_input_maps_to_plain_shapes() {
        let input = Input::from_json(&json!(["a", 1, true, null])).unwrap();
        assert_eq!(
            input,
            Input::List(vec![
                Input::Text("a".to_string()),
                Input::Number(1.0),
                Input::Bool(true),
                Input::Null,
            ])
        );
        assert!(Input::from_json(&json!({"a": 1})).is_err());
    }

    #[test]
    fn integers_convert_exactly() {
        assert_eq!(Input::from(u32::MAX), Input::Number(4_294_967_295.0));
        assert_eq!(Input::from(i32::MIN), Input::Number(-2_147_483_648.0));
        assert_eq!(Input::from(7_u32).shape(), InputShape::Number);
    }

    #[test]
    fn single_inputs_flatten_to_one_item() {
        assert_eq!(items(Input::Text("a".into())).len(), 1);
        assert!(items(Input::Null).is_empty());
        assert_eq!(items(vec!["a", "b"].into()).len(), 2);
    }

    #[test]
    fn empty_text_clears_rich_text() {
        let spec = FieldSpec::new("title", &[InputShape::Text]);
        assert!(rich_text(&spec, "".into()).unwrap().is_empty());
        assert_eq!(rich_text(&spec, "Hi".into()).unwrap()[0].plain_text, "Hi");
    }
}
