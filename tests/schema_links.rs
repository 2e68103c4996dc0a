// tests/schema_links.rs
//! Decoded pages validated against the columns of their decoded database.

use notion_patch::{
    decode_database, decode_page, BuildError, PageUpdate, PropertyKind, SchemaRegistry, ValueSet,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const DATABASE: &str = r#"{
    "object": "database",
    "id": "a1b2c3d4-e5f6-7890-abcd-ef1234567890",
    "url": "https://www.notion.so/a1b2c3d4e5f67890abcdef1234567890",
    "title": [{"type": "text", "text": {"content": "Roadmap", "link": null}, "plain_text": "Roadmap"}],
    "is_inline": true,
    "properties": {
        "Name": {"id": "title", "name": "Name", "type": "title", "title": {}},
        "Stage": {"id": "st%3F", "name": "Stage", "type": "select", "select": {
            "options": [
                {"id": "1", "name": "Idea", "color": "gray"},
                {"id": "2", "name": "Building", "color": "blue"}
            ]
        }},
        "Points": {"id": "pt", "name": "Points", "type": "number", "number": {"format": "number"}},
        "Owner": {"id": "ow", "name": "Owner", "type": "people", "people": {}},
        "Updated": {"id": "up", "name": "Updated", "type": "last_edited_time", "last_edited_time": {}},
        "Button": {"id": "bt", "name": "Button", "type": "button", "button": {}}
    }
}"#;

const PAGE: &str = r#"{
    "object": "page",
    "id": "216cd412-8533-8087-a989-cf37889137c3",
    "parent": {"type": "database_id", "database_id": "a1b2c3d4-e5f6-7890-abcd-ef1234567890"},
    "archived": false,
    "icon": {"type": "emoji", "emoji": "🗺"},
    "properties": {
        "Name": {"id": "title", "type": "title", "title": [
            {"type": "text", "text": {"content": "Search", "link": null}, "plain_text": "Search",
             "annotations": {"bold": true, "italic": false, "strikethrough": false, "underline": false, "code": false, "color": "default"}}
        ]},
        "Stage": {"id": "st%3F", "type": "select", "select": {"id": "1", "name": "Idea", "color": "gray"}},
        "Points": {"id": "pt", "type": "number", "number": 3},
        "Updated": {"id": "up", "type": "last_edited_time", "last_edited_time": "2024-03-01T10:00:00.000Z"}
    }
}"#;

fn decoded() -> (Arc<SchemaRegistry>, ValueSet) {
    let registry = Arc::new(SchemaRegistry::new());
    let database = decode_database(DATABASE, &registry).unwrap();
    let page = decode_page(PAGE, &registry).unwrap();
    let values = ValueSet::from_page(&page, Some(&database), Arc::clone(&registry));
    (registry, values)
}

#[test]
fn decoding_skips_unsupported_columns() {
    let registry = SchemaRegistry::new();
    let database = decode_database(DATABASE, &registry).unwrap();
    assert_eq!(database.title(), "Roadmap");
    assert!(database.is_inline);
    assert!(database.column("Button").is_none());
    assert_eq!(database.title_column().unwrap().name, "Name");
    assert_eq!(registry.len(), 5);
}

#[test]
fn decoded_pages_expose_their_values() {
    let registry = SchemaRegistry::new();
    let page = decode_page(PAGE, &registry).unwrap();
    assert_eq!(page.title(), "Search");
    assert_eq!(page.property("Stage").unwrap().option_names(), vec!["Idea"]);
    assert_eq!(
        page.property("Updated").unwrap().kind(),
        PropertyKind::LastEditedTime
    );
    // Nothing registered yet, so nothing is linked.
    assert!(page.property("Stage").unwrap().belongs_to().is_none());
}

#[test]
fn options_outside_the_column_are_rejected() {
    let (_registry, mut values) = decoded();
    let err = values.edit_values([("Stage", "Shipped")]).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"'Shipped' is not a valid option for 'Stage'; valid option names: Idea, Building");

    values.edit_values([("Stage", "Building")]).unwrap();
}

#[test]
fn updates_carry_only_edited_values() {
    let (_registry, mut values) = decoded();
    values
        .edit_values([("Points", notion_patch::Input::Number(5.0))])
        .unwrap();
    values.edit_title("Search v2").unwrap();

    let update = PageUpdate::new(values);
    assert_eq!(
        update.build().unwrap(),
        serde_json::json!({"properties": {
            "Name": {"title": [{"type": "text", "text": {"content": "Search v2", "link": null}}]},
            "Points": {"number": 5.0}
        }})
    );

    let all = update.build_all().unwrap();
    let mut keys: Vec<&String> = all["properties"].as_object().unwrap().keys().collect();
    keys.sort();
    assert_eq!(keys, vec!["Name", "Points", "Stage"]);
}

#[test]
fn schema_only_names_get_fresh_values() {
    let (_registry, mut values) = decoded();
    values
        .edit_values([("Owner", "9b1d3c6e-4a2f-4b8e-9c7d-1e2f3a4b5c6d")])
        .unwrap();
    assert_eq!(
        values.get("Owner").unwrap().render().unwrap(),
        serde_json::json!({"people": [{"object": "user", "id": "9b1d3c6e-4a2f-4b8e-9c7d-1e2f3a4b5c6d"}]})
    );

    let err = values.edit_values([("Updated", "2024-01-01")]).unwrap_err();
    assert!(matches!(err, BuildError::ImmutableField { .. }));

    let err = values
        .edit_values([("Points", notion_patch::Input::Bool(true))])
        .unwrap_err();
    assert!(matches!(err, BuildError::Conversion { .. }));
}

#[test]
fn refetching_a_database_unlinks_stale_values() {
    let (registry, mut values) = decoded();
    assert!(values.get("Stage").unwrap().belongs_to().is_some());

    decode_database(DATABASE, &registry).unwrap();
    assert!(values.get("Stage").unwrap().belongs_to().is_none());

    // Unlinked values are no longer schema-checked.
    values.edit_values([("Stage", "Shipped")]).unwrap();
}
