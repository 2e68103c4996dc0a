// src/pipeline.rs
//! The binary's three stages: load fetched objects and edit files, compose
//! the payload, deliver it.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::api::{decode_column, decode_database, decode_page};
use crate::builder::{ColumnBuilder, ColumnSet, DatabaseUpdate, Input, PageUpdate, ValueSet};
use crate::config::{RenderConfig, Task};
use crate::error::{AppError, BuildError};
use crate::model::{ColumnDefinition, PropertyKind};
use crate::schema::SchemaRegistry;

/// Column edits read from an edits file.
///
/// A column to add is either a bare kind name (`"rich_text"`) or a column
/// object in the Notion wire form (`{"type": "select", "select": {...}}`).
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnEdits {
    #[serde(default)]
    pub add: IndexMap<String, Value>,
    #[serde(default)]
    pub rename: IndexMap<String, String>,
    #[serde(default)]
    pub remove: Vec<String>,
}

fn column_to_add(name: &str, raw: &Value) -> Result<ColumnDefinition, BuildError> {
    match raw {
        Value::String(kind) => Ok(ColumnBuilder::of_kind(kind.parse::<PropertyKind>()?)?
            .definition()
            .clone()),
        Value::Object(_) => decode_column(name, raw)?.ok_or_else(|| {
            BuildError::InvariantViolation(format!("column '{}' has an unsupported type", name))
        }),
        other => Err(BuildError::InvariantViolation(format!(
            "column '{}' must be a kind name or a column object, got {}",
            name, other
        ))),
    }
}

impl ColumnEdits {
    /// Adds, renames and removes columns in that order.
    pub fn apply(&self, columns: &mut ColumnSet) -> Result<(), BuildError> {
        let additions = self
            .add
            .iter()
            .map(|(name, raw)| Ok((name.clone(), column_to_add(name, raw)?)))
            .collect::<Result<Vec<_>, BuildError>>()?;
        if !additions.is_empty() {
            columns.add_columns(additions)?;
        }
        for (old, new) in &self.rename {
            columns.rename(old, new)?;
        }
        for name in &self.remove {
            columns.remove(name)?;
        }
        Ok(())
    }
}

fn read_text(path: &Path) -> Result<String, AppError> {
    log::debug!("Reading {}", path.display());
    Ok(fs::read_to_string(path)?)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|source| AppError::JsonParseError {
        path: path.to_path_buf(),
        source,
    })
}

/// Renders the schema alteration payload for a fetched database.
pub fn compose_columns(database: &str, edits: &ColumnEdits) -> Result<Value, AppError> {
    let registry = SchemaRegistry::new();
    let database = decode_database(database, &registry)?;
    let mut columns = ColumnSet::from_database(&database);
    edits.apply(&mut columns)?;
    let update = DatabaseUpdate {
        columns: Some(columns),
        ..DatabaseUpdate::default()
    };
    Ok(update.build()?)
}

/// Renders the property update payload for a fetched page.
pub fn compose_values(
    database: &str,
    page: &str,
    edits: &IndexMap<String, Value>,
    title: Option<&str>,
    all: bool,
) -> Result<Value, AppError> {
    let registry = Arc::new(SchemaRegistry::new());
    let database = decode_database(database, &registry)?;
    let page = decode_page(page, &registry)?;
    let mut values = ValueSet::from_page(&page, Some(&database), Arc::clone(&registry));

    let inputs = edits
        .iter()
        .map(|(name, raw)| Ok((name.clone(), Input::from_json(raw)?)))
        .collect::<Result<Vec<_>, BuildError>>()?;
    values.edit_values(inputs)?;
    if let Some(title) = title {
        values.edit_title(title)?;
    }

    let update = PageUpdate::new(values);
    let payload = if all { update.build_all()? } else { update.build()? };
    Ok(payload)
}

/// Loads the inputs a task names and composes its payload.
pub fn compose(task: &Task) -> Result<Value, AppError> {
    match task {
        Task::Columns { database, edits } => {
            let edits = match edits {
                Some(path) => read_json(path)?,
                None => ColumnEdits::default(),
            };
            compose_columns(&read_text(database)?, &edits)
        }
        Task::Values {
            database,
            page,
            edits,
            title,
            all,
        } => {
            let edits = match edits {
                Some(path) => read_json(path)?,
                None => IndexMap::new(),
            };
            compose_values(
                &read_text(database)?,
                &read_text(page)?,
                &edits,
                title.as_deref(),
                *all,
            )
        }
    }
}

/// Writes the payload to the configured file, or to stdout.
pub fn deliver(payload: &Value, config: &RenderConfig) -> Result<usize, AppError> {
    let mut text = if config.compact {
        serde_json::to_string(payload)?
    } else {
        serde_json::to_string_pretty(payload)?
    };
    text.push('\n');

    match &config.output_file {
        Some(path) => {
            fs::write(path, &text)?;
            log::info!("Payload written to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(text.len())
}
