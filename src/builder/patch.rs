// src/builder/patch.rs
//! Sparse field accumulator shared by the record builders.
//!
//! A [`Patch`] starts with every declared field [`Slot::Undefined`]. Setting
//! a field runs the input through [`dispatch`] and the schema's normalizer;
//! rendering emits only the fields that were set, so a payload never carries
//! anything the caller did not ask for. An explicit null is a set value and
//! is rendered.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;

use super::coercion::{dispatch, FieldSpec, Input};
use crate::error::BuildError;

/// Presence of one field: never supplied, or supplied with a value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Slot<T> {
    #[default]
    Undefined,
    Set(T),
}

impl<T> Slot<T> {
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Slot::Set(value) => Some(value),
            Slot::Undefined => None,
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Slot::Set(_))
    }
}

/// Declared fields of a patch, with their coercion and rendering rules.
pub trait PatchSchema {
    type Value: Clone + fmt::Debug;

    /// Name used in error messages.
    const OWNER: &'static str;
    const FIELDS: &'static [FieldSpec];

    /// Turns dispatched input into the canonical field value.
    fn normalize(field: &FieldSpec, input: Input) -> Result<Self::Value, BuildError>;

    fn render(field: &str, value: &Self::Value) -> Result<Value, BuildError>;
}

pub struct Patch<S: PatchSchema> {
    slots: IndexMap<&'static str, Slot<S::Value>>,
}

impl<S: PatchSchema> Patch<S> {
    pub fn new() -> Self {
        Self {
            slots: S::FIELDS
                .iter()
                .map(|field| (field.name, Slot::Undefined))
                .collect(),
        }
    }

    /// A patch with the given fields already set.
    pub fn with_fields<I, K, V>(fields: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Input>,
    {
        let mut patch = Self::new();
        for (field, input) in fields {
            patch.set(field.as_ref(), input)?;
        }
        Ok(patch)
    }

    fn spec(field: &str) -> Result<&'static FieldSpec, BuildError> {
        S::FIELDS
            .iter()
            .find(|spec| spec.name == field)
            .ok_or_else(|| {
                BuildError::unknown_field(S::OWNER, field, S::FIELDS.iter().map(|spec| spec.name))
            })
    }

    pub fn set(&mut self, field: &str, input: impl Into<Input>) -> Result<(), BuildError> {
        let spec = Self::spec(field)?;
        let value = S::normalize(spec, dispatch(spec, input.into())?)?;
        self.slots.insert(spec.name, Slot::Set(value));
        Ok(())
    }

    pub fn get(&self, field: &str) -> Option<&S::Value> {
        self.slots.get(field).and_then(Slot::as_set)
    }

    pub fn is_set(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Returns the field to undefined; unknown names are rejected.
    pub fn unset(&mut self, field: &str) -> Result<(), BuildError> {
        let spec = Self::spec(field)?;
        self.slots.insert(spec.name, Slot::Undefined);
        Ok(())
    }

    /// Names of the fields that have been set, in declaration order.
    pub fn touched(&self) -> Vec<&'static str> {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.is_set())
            .map(|(name, _)| *name)
            .collect()
    }

    pub fn missing(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|field| !self.is_set(field))
            .map(|field| field.to_string())
            .collect()
    }

    /// Fails with one report naming every required field still undefined.
    pub fn require(&self, required: &[&str]) -> Result<(), BuildError> {
        let missing = self.missing(required);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(BuildError::MissingField {
                owner: S::OWNER.to_string(),
                missing,
            })
        }
    }

    pub fn render(&self) -> Result<Map<String, Value>, BuildError> {
        let mut rendered = Map::new();
        for (name, slot) in &self.slots {
            if let Slot::Set(value) = slot {
                rendered.insert(name.to_string(), S::render(name, value)?);
            }
        }
        Ok(rendered)
    }
}

impl<S: PatchSchema> Default for Patch<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PatchSchema> Clone for Patch<S> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
        }
    }
}

impl<S: PatchSchema> fmt::Debug for Patch<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(S::OWNER).field("slots", &self.slots).finish()
    }
}
