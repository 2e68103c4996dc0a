// src/builder/column_set.rs
//! The full column set of a database and its schema payload.
//!
//! Additions are staged and committed as one batch: the batch is validated
//! against the union of the staged columns and the committed set, so the
//! order of columns within a batch never matters, and a rejected batch
//! leaves the committed set untouched.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::coercion::{dispatch, FieldSpec, Input, InputShape};
use super::column::ColumnBuilder;
use crate::error::BuildError;
use crate::model::{ColumnDefinition, Database, PropertyKind};

const COLUMN: FieldSpec = FieldSpec::new("column", &[InputShape::Column]);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSet {
    committed: IndexMap<String, ColumnBuilder>,
    pending: IndexMap<String, ColumnBuilder>,
}

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding `columns`, validated as one batch.
    pub fn with_columns<I, K, V>(columns: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Input>,
    {
        let mut set = Self::new();
        set.add_columns(columns)?;
        Ok(set)
    }

    /// The committed columns of a fetched database.
    pub fn from_database(database: &Database) -> Self {
        Self {
            committed: database
                .columns
                .iter()
                .map(|(name, column)| (name.clone(), ColumnBuilder::new(column.clone())))
                .collect(),
            pending: IndexMap::new(),
        }
    }

    /// Queues columns for the next [`commit`](Self::commit).
    ///
    /// Only the shape of each entry is checked here; set-level rules are
    /// checked when the batch is committed.
    pub fn stage_columns<I, K, V>(&mut self, columns: I) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Input>,
    {
        let mut staged = Vec::new();
        for (name, column) in columns {
            let name = name.into();
            if name.trim().is_empty() {
                return Err(BuildError::InvariantViolation(
                    "column names must be non-empty text".to_string(),
                ));
            }
            let mut column = match dispatch(&COLUMN, column.into())? {
                Input::Column(definition) => ColumnBuilder::new(*definition),
                other => return Err(COLUMN.reject(&other)),
            };
            column.set_name(&name);
            staged.push((name, column));
        }
        self.pending.extend(staged);
        Ok(())
    }

    /// Validates the pending batch and moves it into the committed set.
    ///
    /// On failure the pending batch is discarded.
    pub fn commit(&mut self) -> Result<(), BuildError> {
        let batch = std::mem::take(&mut self.pending);
        self.validate_batch(&batch)?;
        log::debug!("Committing {} column(s)", batch.len());
        self.committed.extend(batch);
        Ok(())
    }

    /// Stages and commits `columns` in one step.
    pub fn add_columns<I, K, V>(&mut self, columns: I) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Input>,
    {
        if let Err(err) = self.stage_columns(columns) {
            self.pending.clear();
            return Err(err);
        }
        self.commit()
    }

    fn validate_batch(&self, batch: &IndexMap<String, ColumnBuilder>) -> Result<(), BuildError> {
        // Staged entries replace committed columns of the same name.
        let union = || {
            self.committed
                .iter()
                .filter(|(name, _)| !batch.contains_key(*name))
                .chain(batch.iter())
        };

        let has_relation = union().any(|(_, column)| column.kind() == PropertyKind::Relation);
        if let Some((name, _)) = batch
            .iter()
            .find(|(_, column)| column.kind() == PropertyKind::Rollup)
        {
            if !has_relation {
                return Err(BuildError::InvariantViolation(format!(
                    "rollup column '{}' requires a relation column in the same database",
                    name
                )));
            }
        }

        let titles: Vec<&String> = union()
            .filter(|(_, column)| column.kind() == PropertyKind::Title)
            .map(|(name, _)| name)
            .collect();
        if titles.len() > 1 {
            return Err(BuildError::InvariantViolation(format!(
                "a database has exactly one title column, found: {}",
                titles
                    .iter()
                    .map(|name| name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ColumnBuilder> {
        self.committed.get(name)
    }

    /// Mutable access to a committed column; unknown names list the valid ones.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut ColumnBuilder, BuildError> {
        match self.committed.get_index_of(name) {
            Some(index) => Ok(&mut self.committed[index]),
            None => Err(BuildError::unknown_field("column set", name, self.names())),
        }
    }

    pub fn rename(&mut self, name: &str, new_name: &str) -> Result<(), BuildError> {
        self.get_mut(name)?.rename(new_name)
    }

    pub fn remove(&mut self, name: &str) -> Result<(), BuildError> {
        self.get_mut(name)?.set_remove(true)
    }

    pub fn names(&self) -> Vec<String> {
        self.committed.keys().cloned().collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.committed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    /// Committed column definitions, including their local edits.
    pub fn definitions(&self) -> impl Iterator<Item = (&String, &ColumnDefinition)> {
        self.committed
            .iter()
            .map(|(name, column)| (name, column.definition()))
    }

    /// The `properties` payload: each column by name, `null` for removals.
    pub fn build(&self) -> Result<Map<String, Value>, BuildError> {
        let has_title = self
            .committed
            .values()
            .any(|column| column.kind() == PropertyKind::Title);
        if !has_title {
            return Err(BuildError::InvariantViolation(format!(
                "a database needs a title column; columns present: {}",
                self.names().join(", ")
            )));
        }

        let mut properties = Map::new();
        for (name, column) in &self.committed {
            properties.insert(name.clone(), column.render()?);
        }
        Ok(properties)
    }
}
