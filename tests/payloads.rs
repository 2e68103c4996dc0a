// tests/payloads.rs
//! Rendered payloads for schema and value edits built through the public API.

use notion_patch::{
    BuildError, Color, ColumnBuilder, ColumnConfig, ColumnSet, DatabaseId, Input, OptionList,
    PropertyKind, PropertyValue, RelationConfig, RollupConfig, SelectOption, ValueSet,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn relation() -> ColumnConfig {
    ColumnConfig::Relation(RelationConfig::single(
        DatabaseId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap(),
    ))
}

fn rollup() -> ColumnConfig {
    ColumnConfig::Rollup(RollupConfig {
        relation_property_name: Some("Projects".to_string()),
        rollup_property_name: Some("Budget".to_string()),
        ..RollupConfig::default()
    })
}

#[test]
fn title_and_multi_select_columns() {
    let columns = ColumnSet::with_columns([
        ("Name", ColumnConfig::Title),
        ("Tags", ColumnConfig::multi_select(["A", "B"])),
    ])
    .unwrap();

    assert_eq!(
        serde_json::Value::Object(columns.build().unwrap()),
        json!({
            "Name": {"title": {}},
            "Tags": {"multi_select": {"options": [{"name": "A"}, {"name": "B"}]}}
        })
    );
}

#[test]
fn title_value_set_text() {
    let mut title = PropertyValue::new("Name", PropertyKind::Title);
    title.set_text("Hello").unwrap();
    assert_eq!(
        title.render().unwrap(),
        json!({"title": [{"type": "text", "text": {"content": "Hello", "link": null}}]})
    );
}

#[test]
fn computed_values_never_render() {
    for kind in [
        PropertyKind::CreatedBy,
        PropertyKind::CreatedTime,
        PropertyKind::LastEditedBy,
        PropertyKind::LastEditedTime,
        PropertyKind::Formula,
        PropertyKind::Rollup,
    ] {
        let value = PropertyValue::new("Computed", kind);
        assert!(
            matches!(value.render(), Err(BuildError::ImmutableField { .. })),
            "{} rendered",
            kind
        );
    }

    let err = PropertyValue::new("Author", PropertyKind::CreatedBy)
        .render()
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"'Author' cannot be updated: created_by values are maintained by Notion");
}

#[test]
fn status_values_render_empty() {
    let mut status = PropertyValue::new("State", PropertyKind::Status);
    status.set("Done").unwrap();
    assert_eq!(status.render().unwrap(), json!({}));
}

#[test]
fn a_column_set_without_title_cannot_build() {
    let columns = ColumnSet::with_columns([("Notes", ColumnConfig::RichText)]).unwrap();
    let err = columns.build().unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Invariant violated: a database needs a title column; columns present: Notes");
}

#[test]
fn title_removal_always_fails() {
    let mut columns = ColumnSet::with_columns([
        ("Name", ColumnConfig::Title),
        ("Notes", ColumnConfig::RichText),
        ("Projects", relation()),
    ])
    .unwrap();
    assert!(matches!(
        columns.remove("Name"),
        Err(BuildError::InvariantViolation(_))
    ));
    assert!(!columns.get("Name").unwrap().is_removed());
}

#[test]
fn rollups_need_a_relation_in_the_same_batch_or_before() {
    let mut columns = ColumnSet::with_columns([("Name", ColumnConfig::Title)]).unwrap();
    assert!(columns.add_columns([("Total", rollup())]).is_err());

    columns
        .add_columns([("Total", rollup()), ("Projects", relation())])
        .unwrap();
    columns.add_columns([("Average", rollup())]).unwrap();
    assert_eq!(columns.names(), vec!["Name", "Total", "Projects", "Average"]);
}

#[test]
fn removals_and_renames_render_in_place() {
    let mut columns = ColumnSet::with_columns([
        ("Name", ColumnConfig::Title),
        ("Notes", ColumnConfig::RichText),
        ("Due", ColumnConfig::Date),
    ])
    .unwrap();
    columns.rename("Notes", "Details").unwrap();
    columns.remove("Due").unwrap();

    assert_eq!(
        serde_json::Value::Object(columns.build().unwrap()),
        json!({
            "Name": {"title": {}},
            "Notes": {"rich_text": {}, "name": "Details"},
            "Due": null
        })
    );
}

#[test]
fn relation_and_rollup_payloads() {
    let mut columns = ColumnSet::with_columns([
        ("Name", ColumnConfig::Title),
        ("Projects", relation()),
        ("Total", rollup()),
    ])
    .unwrap();
    columns
        .get_mut("Total")
        .unwrap()
        .set_rollup_function("sum".parse().unwrap())
        .unwrap();

    let payload = columns.build().unwrap();
    assert_eq!(
        payload["Projects"],
        json!({"relation": {
            "database_id": "550e8400-e29b-41d4-a716-446655440000",
            "type": "single_property",
            "single_property": {}
        }})
    );
    assert_eq!(
        payload["Total"],
        json!({"rollup": {
            "function": "sum",
            "relation_property_name": "Projects",
            "rollup_property_name": "Budget"
        }})
    );
}

#[test]
fn option_append_rules() {
    let mut options = OptionList::from_options(vec![
        SelectOption {
            id: Some("abc".to_string()),
            name: "Live".to_string(),
            color: Some(Color::Green),
        },
        SelectOption::named("Draft"),
    ]);

    options.append("Draft", Some(Color::Blue)).unwrap();
    assert_eq!(options.get("Draft").unwrap().color, Some(Color::Blue));
    assert_eq!(options.len(), 2);

    let err = options.append("Live", Some(Color::Red)).unwrap_err();
    assert!(matches!(err, BuildError::ImmutableField { .. }));
    assert_eq!(options.get("Live").unwrap().color, Some(Color::Green));

    assert!(!options.delete("Missing"));
}

#[test]
fn column_builders_accept_configuration_input() {
    let mut column = ColumnBuilder::of_kind(PropertyKind::Select).unwrap();
    column.configure(vec!["Low", "High"]).unwrap();
    column.add_option("Urgent", Some(Color::Red)).unwrap();
    assert_eq!(
        column.render().unwrap(),
        json!({"select": {"options": [
            {"name": "Low"},
            {"name": "High"},
            {"name": "Urgent", "color": "red"}
        ]}})
    );

    let err = column.configure(Input::Bool(true)).unwrap_err();
    assert!(matches!(err, BuildError::TypeCoercion { .. }));
}

#[test]
fn unlinked_values_accept_any_option() {
    let mut values = ValueSet::new(Arc::new(notion_patch::SchemaRegistry::new()));
    values.declare("Tags", "tags", PropertyKind::MultiSelect);
    values.edit_values([("Tags", vec!["anything"])]).unwrap();
    assert_eq!(
        serde_json::Value::Object(values.build().unwrap()),
        json!({"Tags": {"multi_select": [{"name": "anything"}]}})
    );
}
