// src/builder/value_set.rs
//! Property values of one page and their update payload.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::coercion::Input;
use crate::error::BuildError;
use crate::model::{Database, Page, PropertyKind, PropertyValue, ValueData};
use crate::schema::SchemaRegistry;

fn read_only(name: &str, kind: PropertyKind) -> BuildError {
    BuildError::immutable(name, format!("{} values are maintained by Notion", kind))
}

/// Coercion failures name the value; schema and mutability errors pass through.
fn converting(name: &str, err: BuildError) -> BuildError {
    match err {
        BuildError::TypeCoercion { .. } | BuildError::Validation(_) => {
            BuildError::conversion(name, err)
        }
        other => other,
    }
}

/// A column of the owning database as seen from a page.
#[derive(Debug, Clone, PartialEq)]
struct SchemaSlot {
    id: String,
    kind: PropertyKind,
}

/// Values of one page, resolved against the owning database's columns.
#[derive(Debug, Clone)]
pub struct ValueSet {
    values: IndexMap<String, PropertyValue>,
    schema: IndexMap<String, SchemaSlot>,
    registry: Arc<SchemaRegistry>,
}

impl ValueSet {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            values: IndexMap::new(),
            schema: IndexMap::new(),
            registry,
        }
    }

    /// An empty value set for a new page in `database`.
    pub fn for_database(database: &Database, registry: Arc<SchemaRegistry>) -> Self {
        let mut set = Self::new(registry);
        for (name, column) in &database.columns {
            set.declare(name, &column.id, column.kind());
        }
        set
    }

    /// The values of a fetched page. Without the owning database the
    /// page's own values describe the schema.
    pub fn from_page(page: &Page, database: Option<&Database>, registry: Arc<SchemaRegistry>) -> Self {
        let mut set = match database {
            Some(database) => Self::for_database(database, registry),
            None => Self::new(registry),
        };
        for (name, value) in &page.properties {
            set.declare(name, &value.id, value.kind());
            set.values.insert(name.clone(), value.clone());
        }
        set
    }

    /// Makes a column of the owning database known by name.
    pub fn declare(&mut self, name: &str, id: &str, kind: PropertyKind) {
        self.schema.insert(
            name.to_string(),
            SchemaSlot {
                id: id.to_string(),
                kind,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    /// The title value, if the page has one.
    pub fn title(&self) -> Option<&PropertyValue> {
        self.values
            .values()
            .find(|value| value.kind() == PropertyKind::Title)
    }

    /// Every name an edit may target.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.values.keys().cloned().collect();
        names.extend(
            self.schema
                .keys()
                .filter(|name| !self.values.contains_key(*name))
                .cloned(),
        );
        names
    }

    fn fresh_value(&self, name: &str, slot: &SchemaSlot) -> PropertyValue {
        PropertyValue::from_data(&slot.id, name, ValueData::empty(slot.kind)).attach(&self.registry)
    }

    /// Applies all edits or none.
    ///
    /// Existing values are coerced in place; names only known from the
    /// schema get a fresh value of the declared kind.
    pub fn edit_values<I, K, V>(&mut self, edits: I) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Input>,
    {
        let mut staged = self.values.clone();
        for (name, input) in edits {
            let name = name.as_ref();
            if let Some(value) = staged.get_mut(name) {
                if !value.kind().is_updatable() {
                    return Err(read_only(name, value.kind()));
                }
                value.set(input).map_err(|err| converting(name, err))?;
                continue;
            }
            let slot = self
                .schema
                .get(name)
                .ok_or_else(|| BuildError::unknown_field("page", name, self.names()))?;
            if !slot.kind.is_updatable() {
                return Err(read_only(name, slot.kind));
            }
            let mut value = self.fresh_value(name, slot);
            value.set(input).map_err(|err| converting(name, err))?;
            staged.insert(name.to_string(), value);
        }
        log::debug!("Applied value edits; {} value(s) held", staged.len());
        self.values = staged;
        Ok(())
    }

    /// Replaces the text of the title value, creating it when absent.
    pub fn edit_title(&mut self, text: &str) -> Result<(), BuildError> {
        if let Some(title) = self
            .values
            .values_mut()
            .find(|value| value.kind() == PropertyKind::Title)
        {
            return title.set_text(text);
        }

        let (name, slot) = self
            .schema
            .iter()
            .find(|(_, slot)| slot.kind == PropertyKind::Title)
            .map(|(name, slot)| (name.clone(), slot.clone()))
            .unwrap_or_else(|| {
                (
                    "title".to_string(),
                    SchemaSlot {
                        id: "title".to_string(),
                        kind: PropertyKind::Title,
                    },
                )
            });
        let mut title = self.fresh_value(&name, &slot);
        title.set_text(text)?;
        self.values.insert(name, title);
        Ok(())
    }

    fn render_where(
        &self,
        include: impl Fn(&PropertyValue) -> bool,
    ) -> Result<Map<String, Value>, BuildError> {
        let mut properties = Map::new();
        for (name, value) in &self.values {
            if value.kind().is_updatable() && include(value) {
                properties.insert(name.clone(), value.render()?);
            }
        }
        Ok(properties)
    }

    /// Every updatable value; computed kinds are skipped.
    pub fn build(&self) -> Result<Map<String, Value>, BuildError> {
        self.render_where(|_| true)
    }

    /// Only the values edited since decoding.
    pub fn build_modified(&self) -> Result<Map<String, Value>, BuildError> {
        self.render_where(PropertyValue::is_modified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn set_with(schema: &[(&str, PropertyKind)]) -> ValueSet {
        let mut set = ValueSet::new(Arc::new(SchemaRegistry::new()));
        for (name, kind) in schema {
            set.declare(name, name, *kind);
        }
        set
    }

    #[test]
    fn schema_names_get_fresh_values() {
        let mut set = set_with(&[("Done", PropertyKind::Checkbox), ("Name", PropertyKind::Title)]);
        set.edit_values([("Done", true)]).unwrap();
        assert_eq!(
            Value::Object(set.build().unwrap()),
            json!({"Done": {"checkbox": true}})
        );
    }

    #[test]
    fn unknown_names_list_valid_ones() {
        let mut set = set_with(&[("Done", PropertyKind::Checkbox)]);
        let err = set.edit_values([("Missing", true)]).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"'Missing' is not a valid name for page; valid names: Done");
    }

    #[test]
    fn computed_schema_kinds_are_rejected() {
        let mut set = set_with(&[("Created", PropertyKind::CreatedTime)]);
        assert!(matches!(
            set.edit_values([("Created", "2024-01-01")]),
            Err(BuildError::ImmutableField { .. })
        ));
    }

    #[test]
    fn failed_batches_apply_nothing() {
        let mut set = set_with(&[("Done", PropertyKind::Checkbox), ("Count", PropertyKind::Number)]);
        set.edit_values([("Count", Input::Number(1.0))]).unwrap();

        let err = set
            .edit_values([("Done", Input::Bool(true)), ("Count", Input::Text("x".into()))])
            .unwrap_err();
        assert!(matches!(err, BuildError::Conversion { .. }));
        assert!(set.get("Done").is_none());
        assert_eq!(set.get("Count").unwrap().data(), &ValueData::Number(Some(1.0)));
    }

    #[test]
    fn option_errors_match_for_existing_and_fresh_values() {
        use crate::model::{ColumnConfig, ColumnDefinition};

        let registry = Arc::new(SchemaRegistry::new());
        registry.register(ColumnDefinition::new("Stage", ColumnConfig::select(["Idea"])).with_id("stage"));
        let mut set = ValueSet::new(Arc::clone(&registry));
        set.declare("Stage", "stage", PropertyKind::Select);

        let fresh = set.edit_values([("Stage", "Nope")]).unwrap_err();
        assert!(matches!(fresh, BuildError::SchemaValidation { .. }));
        let fresh = set.edit_values([("Stage", true)]).unwrap_err();
        assert!(matches!(fresh, BuildError::Conversion { .. }));

        set.edit_values([("Stage", "Idea")]).unwrap();
        let existing = set.edit_values([("Stage", "Nope")]).unwrap_err();
        insta::assert_snapshot!(existing.to_string(), @"'Nope' is not a valid option for 'Stage'; valid option names: Idea");
    }

    #[test]
    fn existing_computed_values_are_immutable() {
        let mut set = ValueSet::new(Arc::new(SchemaRegistry::new()));
        set.values.insert(
            "Created".to_string(),
            PropertyValue::new("Created", PropertyKind::CreatedTime),
        );
        let err = set.edit_values([("Created", "2024-01-01")]).unwrap_err();
        assert!(matches!(err, BuildError::ImmutableField { .. }));
    }

    #[test]
    fn edit_title_falls_back_to_a_title_named_value() {
        let mut set = ValueSet::new(Arc::new(SchemaRegistry::new()));
        set.edit_title("Hello").unwrap();
        assert_eq!(
            Value::Object(set.build().unwrap()),
            json!({"title": {"title": [{"type": "text", "text": {"content": "Hello", "link": null}}]}})
        );

        let mut set = set_with(&[("Task", PropertyKind::Title)]);
        set.edit_title("Write docs").unwrap();
        assert_eq!(set.title().unwrap().name, "Task");
    }
}
