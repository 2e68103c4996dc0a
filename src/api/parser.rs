// src/api/parser.rs
//! Decoding of fetched Notion objects.
//!
//! Decoding a database registers its columns with the schema registry;
//! decoding a page attaches each of its values to the registered column of
//! the same property id, so later edits are validated against that column.

use indexmap::IndexMap;
use serde_json::Value;

use super::responses::{self, DatabaseResponse, PageResponse};
use crate::error::BuildError;
use crate::model::{ColumnDefinition, Database, Page, PropertyValue};
use crate::schema::SchemaRegistry;
use crate::types::{DatabaseId, PageId};

const BODY_PREVIEW: usize = 500;

fn parse_body<T: serde::de::DeserializeOwned>(body: &str, what: &str) -> Result<T, BuildError> {
    serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to decode {}: {}", what, e);
        let preview = if body.len() > BODY_PREVIEW {
            let cut = (0..=BODY_PREVIEW)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            format!("{}...", &body[..cut])
        } else {
            body.to_string()
        };
        BuildError::MalformedResponse(format!("{}: {} in {}", what, e, preview))
    })
}

/// Decodes a retrieved database and registers its columns.
///
/// Columns of kinds this crate does not model are skipped with a warning.
pub fn decode_database(body: &str, registry: &SchemaRegistry) -> Result<Database, BuildError> {
    let response: DatabaseResponse = parse_body(body, "database")?;
    let database = database_from_response(response)?;
    registry.register_database(&database);
    log::debug!(
        "Decoded database '{}' with {} column(s)",
        database.title(),
        database.columns.len()
    );
    Ok(database)
}

fn database_from_response(response: DatabaseResponse) -> Result<Database, BuildError> {
    let mut columns = IndexMap::new();
    for (name, raw) in &response.properties {
        if let Some(column) = decode_column(name, raw)? {
            columns.insert(name.clone(), column);
        }
    }

    Ok(Database {
        id: DatabaseId::parse(&response.id)?,
        title: responses::rich_text(response.title)?,
        description: responses::rich_text(response.description)?,
        icon: response.icon.as_ref().and_then(responses::icon),
        cover: response.cover.as_ref().map(responses::file).transpose()?,
        parent: response.parent.as_ref().map(responses::parent).transpose()?,
        url: response.url,
        is_inline: response.is_inline,
        archived: response.archived,
        columns,
    })
}

/// Decodes a retrieved page, attaching its values to registered columns.
pub fn decode_page(body: &str, registry: &SchemaRegistry) -> Result<Page, BuildError> {
    let response: PageResponse = parse_body(body, "page")?;

    let mut properties = IndexMap::new();
    for (name, raw) in &response.properties {
        if let Some(value) = decode_value(name, raw)? {
            properties.insert(name.clone(), value.attach(registry));
        }
    }

    let page = Page {
        id: PageId::parse(&response.id)?,
        parent: response.parent.as_ref().map(responses::parent).transpose()?,
        url: response.url,
        archived: response.archived,
        icon: response.icon.as_ref().and_then(responses::icon),
        cover: response.cover.as_ref().map(responses::file).transpose()?,
        properties,
    };
    log::debug!(
        "Decoded page '{}' with {} value(s)",
        page.title(),
        page.properties.len()
    );
    Ok(page)
}

/// Decodes one column object, `{"type": kind, kind: {...}}`.
///
/// Returns `None` for kinds this crate does not model.
pub fn decode_column(name: &str, raw: &Value) -> Result<Option<ColumnDefinition>, BuildError> {
    responses::column(name, raw)
}

/// Decodes one property value object, `{"type": kind, kind: ...}`.
pub fn decode_value(name: &str, raw: &Value) -> Result<Option<PropertyValue>, BuildError> {
    responses::value(name, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnConfig, PropertyKind, ValueData};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const DATABASE_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn database_body() -> String {
        json!({
            "object": "database",
            "id": DATABASE_ID,
            "title": [{"type": "text", "text": {"content": "Tasks", "link": null}, "plain_text": "Tasks"}],
            "parent": {"type": "workspace", "workspace": true},
            "properties": {
                "Name": {"id": "title", "name": "Name", "type": "title", "title": {}},
                "Tags": {"id": "tg%3A", "name": "Tags", "type": "multi_select", "multi_select": {
                    "options": [
                        {"id": "a1", "name": "A", "color": "red"},
                        {"id": "b1", "name": "B", "color": "blue"}
                    ]
                }},
                "Ticket": {"id": "uq", "name": "Ticket", "type": "unique_id", "unique_id": {}}
            }
        })
        .to_string()
    }

    #[test]
    fn database_columns_are_registered() {
        let registry = SchemaRegistry::new();
        let database = decode_database(&database_body(), &registry).unwrap();

        assert_eq!(database.title(), "Tasks");
        assert_eq!(
            database.columns.keys().collect::<Vec<_>>(),
            vec!["Name", "Tags"]
        );
        assert_eq!(registry.len(), 2);
        let tags = registry.resolve("tg%3A").unwrap();
        assert!(matches!(tags.config, ColumnConfig::MultiSelect(_)));
    }

    #[test]
    fn page_values_are_validated_against_their_column() {
        let registry = SchemaRegistry::new();
        decode_database(&database_body(), &registry).unwrap();

        let page_body = json!({
            "object": "page",
            "id": "660e8400e29b41d4a716446655440000",
            "parent": {"type": "database_id", "database_id": DATABASE_ID},
            "properties": {
                "Name": {"id": "title", "type": "title", "title": [
                    {"type": "text", "text": {"content": "Write", "link": null}, "plain_text": "Write"}
                ]},
                "Tags": {"id": "tg%3A", "type": "multi_select", "multi_select": [
                    {"id": "a1", "name": "A", "color": "red"}
                ]}
            }
        })
        .to_string();
        let mut page = decode_page(&page_body, &registry).unwrap();
        assert_eq!(page.title(), "Write");

        let tags = page.properties.get_mut("Tags").unwrap();
        assert!(tags.belongs_to().is_some());
        assert!(!tags.is_modified());
        tags.set(vec!["A", "B"]).unwrap();
        assert!(matches!(
            tags.set(vec!["Z"]),
            Err(BuildError::SchemaValidation { .. })
        ));
    }

    #[test]
    fn computed_values_decode_without_validation() {
        let raw = json!({
            "id": "c",
            "type": "created_by",
            "created_by": {"object": "user", "id": "770e8400e29b41d4a716446655440000"}
        });
        let value = decode_value("Author", &raw).unwrap().unwrap();
        assert_eq!(value.kind(), PropertyKind::CreatedBy);
        assert!(matches!(value.data(), ValueData::CreatedBy(Some(_))));
    }

    #[test]
    fn malformed_bodies_are_reported() {
        let err = decode_page("{\"id\": 3}", &SchemaRegistry::new()).unwrap_err();
        assert!(matches!(err, BuildError::MalformedResponse(_)));
    }
}
