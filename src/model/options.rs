// src/model/options.rs
//! Select, multi-select and status options.
//!
//! Options compare by name only. An option fetched from Notion carries an
//! id and is considered persisted: it can be kept or removed, never edited
//! in place.

use serde_json::{json, Value};

use crate::error::BuildError;
use crate::types::Color;

/// One named option of a select-like column or value.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub id: Option<String>,
    pub name: String,
    pub color: Option<Color>,
}

impl PartialEq for SelectOption {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl SelectOption {
    /// A proposed option that does not exist in Notion yet.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// `{"name": ..}` plus the color when one is set and requested.
    pub fn render(&self, include_color: bool) -> Value {
        let mut rendered = json!({ "name": self.name });
        if let (true, Some(color)) = (include_color, self.color) {
            rendered["color"] = json!(color.as_str());
        }
        rendered
    }
}

/// A status group; groups reference their member options by id.
#[derive(Debug, Clone)]
pub struct OptionGroup {
    pub id: Option<String>,
    pub name: String,
    pub color: Option<Color>,
    pub option_ids: Vec<String>,
}

impl PartialEq for OptionGroup {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Ordered option list with name-keyed membership.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionList {
    options: Vec<SelectOption>,
}

impl OptionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(options: Vec<SelectOption>) -> Self {
        let mut list = Self::new();
        for option in options {
            if !list.contains(&option.name) {
                list.options.push(option);
            }
        }
        list
    }

    pub fn get(&self, name: &str) -> Option<&SelectOption> {
        self.options.iter().find(|option| option.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Adds a new option or recolors a not-yet-persisted one.
    ///
    /// A `None` color leaves an existing proposal's color untouched.
    pub fn append(&mut self, name: &str, color: Option<Color>) -> Result<(), BuildError> {
        match self.options.iter_mut().find(|option| option.name == name) {
            None => {
                self.options.push(SelectOption {
                    id: None,
                    name: name.to_string(),
                    color,
                });
                Ok(())
            }
            Some(existing) if existing.is_persisted() => Err(BuildError::immutable(
                name,
                "existing select options cannot be changed; delete it and add a new one",
            )),
            Some(existing) => {
                if color.is_some() {
                    existing.color = color;
                }
                Ok(())
            }
        }
    }

    /// Removes the option by name; returns whether anything was removed.
    pub fn delete(&mut self, name: &str) -> bool {
        let before = self.options.len();
        self.options.retain(|option| option.name != name);
        before != self.options.len()
    }

    pub fn names(&self) -> Vec<String> {
        self.options.iter().map(|option| option.name.clone()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SelectOption> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn render(&self, include_color: bool) -> Value {
        Value::Array(
            self.options
                .iter()
                .map(|option| option.render(include_color))
                .collect(),
        )
    }
}

/// Status options and their groups; read-only through the API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusOptions {
    pub options: OptionList,
    pub groups: Vec<OptionGroup>,
}

impl StatusOptions {
    pub fn get_option(&self, name: &str) -> Option<&SelectOption> {
        self.options.get(name)
    }

    pub fn get_group(&self, name: &str) -> Option<&OptionGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    pub fn add_option(&mut self, name: &str) -> Result<(), BuildError> {
        Err(BuildError::immutable(
            name,
            "status options cannot be updated via the API",
        ))
    }

    pub fn delete_option(&mut self, name: &str) -> Result<(), BuildError> {
        Err(BuildError::immutable(
            name,
            "status options cannot be updated via the API",
        ))
    }

    pub fn add_group(&mut self, name: &str) -> Result<(), BuildError> {
        Err(BuildError::immutable(
            name,
            "status groups cannot be updated via the API",
        ))
    }
}
