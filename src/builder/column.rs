// src/builder/column.rs
//! Single-column builder: configuration, rename and removal of one column.

use serde_json::{Map, Value};

use super::coercion::{self, dispatch, FieldSpec, Input, InputShape};
use crate::error::BuildError;
use crate::model::{
    ColumnConfig, ColumnDefinition, NumberFormat, OptionList, PropertyKind, RelationConfig,
    RollupConfig, RollupFunction, SelectOption,
};
use crate::types::{Color, DatabaseId, ValidationError};

/// Accepted configuration input per configurable kind.
fn config_spec(kind: PropertyKind) -> Option<FieldSpec> {
    let accepts: &'static [InputShape] = match kind {
        PropertyKind::Select | PropertyKind::MultiSelect => &[InputShape::List, InputShape::Options],
        PropertyKind::Number | PropertyKind::Formula => &[InputShape::Text],
        PropertyKind::Relation => &[InputShape::Text, InputShape::Relation],
        PropertyKind::Rollup => &[InputShape::Rollup],
        _ => return None,
    };
    Some(FieldSpec::new(kind.as_str(), accepts))
}

/// Options from a list of names or prebuilt options.
fn option_list(spec: &FieldSpec, input: Input) -> Result<OptionList, BuildError> {
    match input {
        Input::Options(list) => Ok(list),
        other => coercion::items(other)
            .into_iter()
            .map(|item| match item {
                Input::Text(name) => Ok(SelectOption::named(name)),
                Input::Option(option) => Ok(option),
                other => Err(spec.reject(&other)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(OptionList::from_options),
    }
}

/// Pending changes to one column of a database schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBuilder {
    definition: ColumnDefinition,
    rename: Option<String>,
    remove: bool,
}

impl ColumnBuilder {
    pub fn new(definition: ColumnDefinition) -> Self {
        Self {
            definition,
            rename: None,
            remove: false,
        }
    }

    /// A fresh column of `kind` with its default configuration.
    pub fn of_kind(kind: PropertyKind) -> Result<Self, BuildError> {
        ColumnConfig::default_for(kind)
            .map(|config| Self::new(ColumnDefinition::from(config)))
            .ok_or_else(|| {
                BuildError::InvariantViolation(format!(
                    "a {} column needs explicit configuration",
                    kind
                ))
            })
    }

    pub fn definition(&self) -> &ColumnDefinition {
        &self.definition
    }

    pub fn kind(&self) -> PropertyKind {
        self.definition.kind()
    }

    pub fn renamed_to(&self) -> Option<&str> {
        self.rename.as_deref()
    }

    pub fn is_removed(&self) -> bool {
        self.remove
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.definition.name = name.to_string();
    }

    fn unsupported(&self, operation: &str) -> BuildError {
        BuildError::InvariantViolation(format!(
            "{} is not supported by {} column '{}'",
            operation,
            self.kind(),
            self.definition.name
        ))
    }

    pub fn rename(&mut self, name: &str) -> Result<(), BuildError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyField("column name").into());
        }
        self.rename = Some(name.to_string());
        Ok(())
    }

    /// Flags the column for deletion. Title columns can never be removed.
    pub fn set_remove(&mut self, remove: bool) -> Result<(), BuildError> {
        if remove && self.kind() == PropertyKind::Title {
            return Err(BuildError::InvariantViolation(format!(
                "title column '{}' cannot be removed",
                self.definition.name
            )));
        }
        self.remove = remove;
        Ok(())
    }

    /// Replaces the kind-specific configuration from coerced input.
    pub fn configure(&mut self, input: impl Into<Input>) -> Result<(), BuildError> {
        let kind = self.kind();
        if kind == PropertyKind::Status {
            return Err(BuildError::immutable(
                &self.definition.name,
                "status options cannot be updated via the API",
            ));
        }
        let spec = config_spec(kind).ok_or_else(|| self.unsupported("configuration"))?;
        let input = dispatch(&spec, input.into())?;
        self.definition.config = match (kind, input) {
            (PropertyKind::Select, input) => ColumnConfig::Select(option_list(&spec, input)?),
            (PropertyKind::MultiSelect, input) => {
                ColumnConfig::MultiSelect(option_list(&spec, input)?)
            }
            (PropertyKind::Number, Input::Text(format)) => ColumnConfig::Number {
                format: format.parse()?,
            },
            (PropertyKind::Formula, Input::Text(expression)) => ColumnConfig::Formula { expression },
            (PropertyKind::Relation, Input::Text(id)) => {
                ColumnConfig::Relation(RelationConfig::single(DatabaseId::parse(&id)?))
            }
            (PropertyKind::Relation, Input::Relation(relation)) => ColumnConfig::Relation(relation),
            (PropertyKind::Rollup, Input::Rollup(rollup)) => ColumnConfig::Rollup(rollup),
            (_, other) => return Err(spec.reject(&other)),
        };
        Ok(())
    }

    fn options_mut(&mut self) -> Result<&mut OptionList, BuildError> {
        match self.definition.config {
            ColumnConfig::Select(ref mut options) | ColumnConfig::MultiSelect(ref mut options) => {
                Ok(options)
            }
            _ => Err(self.unsupported("option editing")),
        }
    }

    pub fn add_option(&mut self, name: &str, color: Option<Color>) -> Result<(), BuildError> {
        if let ColumnConfig::Status(status) = &mut self.definition.config {
            return status.add_option(name);
        }
        self.options_mut()?.append(name, color)
    }

    /// Removes an option; absent names are ignored.
    pub fn delete_option(&mut self, name: &str) -> Result<(), BuildError> {
        if let ColumnConfig::Status(status) = &mut self.definition.config {
            return status.delete_option(name);
        }
        self.options_mut()?.delete(name);
        Ok(())
    }

    pub fn set_format(&mut self, format: NumberFormat) -> Result<(), BuildError> {
        match &mut self.definition.config {
            ColumnConfig::Number { format: current } => {
                *current = format;
                Ok(())
            }
            _ => Err(self.unsupported("number format")),
        }
    }

    pub fn set_expression(&mut self, expression: &str) -> Result<(), BuildError> {
        match &mut self.definition.config {
            ColumnConfig::Formula { expression: current } => {
                *current = expression.to_string();
                Ok(())
            }
            _ => Err(self.unsupported("formula expression")),
        }
    }

    fn relation_mut(&mut self) -> Result<&mut RelationConfig, BuildError> {
        match self.definition.config {
            ColumnConfig::Relation(ref mut relation) => Ok(relation),
            _ => Err(self.unsupported("relation settings")),
        }
    }

    pub fn set_relation_database(&mut self, database_id: DatabaseId) -> Result<(), BuildError> {
        self.relation_mut()?.database_id = database_id;
        Ok(())
    }

    /// Toggles a relation between single and dual property.
    pub fn switch_relation(&mut self) -> Result<(), BuildError> {
        self.relation_mut()?.switch();
        Ok(())
    }

    fn rollup_mut(&mut self) -> Result<&mut RollupConfig, BuildError> {
        match self.definition.config {
            ColumnConfig::Rollup(ref mut rollup) => Ok(rollup),
            _ => Err(self.unsupported("rollup settings")),
        }
    }

    pub fn set_rollup_function(&mut self, function: RollupFunction) -> Result<(), BuildError> {
        self.rollup_mut()?.function = function;
        Ok(())
    }

    /// Points the rollup at a relation column of the same database.
    pub fn set_rollup_relation(&mut self, relation: &ColumnDefinition) -> Result<(), BuildError> {
        if relation.kind() != PropertyKind::Relation {
            return Err(BuildError::InvariantViolation(format!(
                "rollup must follow a relation column, '{}' is {}",
                relation.name,
                relation.kind()
            )));
        }
        self.rollup_mut()?.set_relation(relation);
        Ok(())
    }

    pub fn set_rollup_property(&mut self, column: &ColumnDefinition) -> Result<(), BuildError> {
        self.rollup_mut()?.set_rollup_property(column);
        Ok(())
    }

    /// `null` for a removed column, otherwise `{kind: payload}` plus the new
    /// name when renamed.
    pub fn render(&self) -> Result<Value, BuildError> {
        if self.remove {
            return Ok(Value::Null);
        }
        let mut rendered = Map::new();
        rendered.insert(
            self.kind().as_str().into(),
            self.definition.config.render_payload()?,
        );
        if let Some(name) = &self.rename {
            rendered.insert("name".into(), Value::String(name.clone()));
        }
        Ok(Value::Object(rendered))
    }
}

impl From<ColumnDefinition> for ColumnBuilder {
    fn from(definition: ColumnDefinition) -> Self {
        Self::new(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StatusOptions;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn title_cannot_be_removed() {
        let mut title = ColumnBuilder::of_kind(PropertyKind::Title).unwrap();
        let err = title.set_remove(true).unwrap_err();
        assert!(matches!(err, BuildError::InvariantViolation(_)));
        assert!(!title.is_removed());
        assert_eq!(title.render().unwrap(), json!({"title": {}}));
    }

    #[test]
    fn removed_columns_render_null() {
        let mut column = ColumnBuilder::of_kind(PropertyKind::Email).unwrap();
        column.set_remove(true).unwrap();
        assert_eq!(column.render().unwrap(), Value::Null);
    }

    #[test]
    fn rename_adds_a_name_key() {
        let mut column = ColumnBuilder::of_kind(PropertyKind::Checkbox).unwrap();
        column.rename("Done").unwrap();
        assert_eq!(column.render().unwrap(), json!({"checkbox": {}, "name": "Done"}));
        assert!(column.rename("  ").is_err());
    }

    #[test]
    fn configure_dispatches_on_kind() {
        let mut select = ColumnBuilder::of_kind(PropertyKind::Select).unwrap();
        select.configure(vec!["A", "B"]).unwrap();
        select.add_option("C", Some(Color::Red)).unwrap();
        select.delete_option("A").unwrap();
        assert_eq!(
            select.render().unwrap(),
            json!({"select": {"options": [{"name": "B"}, {"name": "C", "color": "red"}]}})
        );

        let mut number = ColumnBuilder::of_kind(PropertyKind::Number).unwrap();
        number.configure("percent").unwrap();
        assert_eq!(number.render().unwrap(), json!({"number": {"format": "percent"}}));
        assert!(number.configure(true).is_err());
        assert!(number.add_option("A", None).is_err());

        assert!(ColumnBuilder::of_kind(PropertyKind::Relation).is_err());
    }

    #[test]
    fn status_columns_are_read_only() {
        let mut status = ColumnBuilder::new(ColumnDefinition::new(
            "State",
            ColumnConfig::Status(StatusOptions::default()),
        ));
        assert!(matches!(
            status.add_option("Done", None),
            Err(BuildError::ImmutableField { .. })
        ));
        assert!(status.configure(vec!["Done"]).is_err());
        assert_eq!(status.render().unwrap(), json!({"status": {}}));
    }
}
