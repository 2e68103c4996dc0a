// src/schema/registry.rs
//! Column definitions keyed by property id.
//!
//! Values link to their defining column through this registry instead of
//! owning a copy of it. One registry is built per session and shared by
//! `Arc`; re-fetching a database overwrites its entries, which invalidates
//! the weak links held by values decoded from the previous fetch.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{ColumnDefinition, Database};

#[derive(Debug, Default)]
pub struct SchemaRegistry {
    columns: RwLock<HashMap<String, Arc<ColumnDefinition>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the column stored under its id.
    pub fn register(&self, column: ColumnDefinition) -> Arc<ColumnDefinition> {
        let column = Arc::new(column);
        let previous = self
            .columns
            .write()
            .insert(column.id.clone(), Arc::clone(&column));
        match previous {
            Some(_) => log::debug!("Replaced column '{}' ({})", column.name, column.id),
            None => log::debug!("Registered column '{}' ({})", column.name, column.id),
        }
        column
    }

    /// Registers every column of a decoded database.
    pub fn register_database(&self, database: &Database) {
        for column in database.columns.values() {
            self.register(column.clone());
        }
    }

    /// The column registered under `id`; absence is not an error.
    pub fn resolve(&self, id: &str) -> Option<Arc<ColumnDefinition>> {
        self.columns.read().get(id).cloned()
    }

    pub fn forget(&self, id: &str) -> bool {
        self.columns.write().remove(id).is_some()
    }

    pub fn clear(&self) {
        self.columns.write().clear();
    }

    pub fn len(&self) -> usize {
        self.columns.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnConfig, PropertyKind, PropertyValue, ValueData};

    fn column(id: &str, name: &str) -> ColumnDefinition {
        ColumnDefinition::new(name, ColumnConfig::select(["A"])).with_id(id)
    }

    #[test]
    fn resolve_misses_are_absent_not_errors() {
        let registry = SchemaRegistry::new();
        assert!(registry.resolve("nope").is_none());

        registry.register(column("p1", "Tags"));
        assert_eq!(registry.resolve("p1").unwrap().name, "Tags");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn register_overwrites_by_id() {
        let registry = SchemaRegistry::new();
        registry.register(column("p1", "Tags"));
        registry.register(column("p1", "Labels"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("p1").unwrap().name, "Labels");
    }

    #[test]
    fn overwritten_columns_are_not_kept_alive_by_values() {
        let registry = SchemaRegistry::new();
        registry.register(column("p1", "Tags"));
        let value = PropertyValue::from_data("p1", "Tags", ValueData::empty(PropertyKind::Select))
            .attach(&registry);
        assert!(value.belongs_to().is_some());

        registry.register(column("p1", "Tags"));
        assert!(value.belongs_to().is_none());

        assert!(registry.forget("p1"));
        assert!(registry.is_empty());
    }
}
