// src/api/responses.rs
//! Wire shapes of fetched Notion objects and their conversion to the domain model.
//!
//! Property bodies stay raw JSON until their kind is known; kinds this
//! crate does not model are skipped.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::BuildError;
use crate::model::{
    ColumnConfig, ColumnDefinition, FormulaResult, NumberFormat, OptionGroup, OptionList,
    PropertyKind, PropertyValue, RelationConfig, RelationMode, RollupConfig, RollupFunction,
    SelectOption, StatusOptions, ValueData,
};
use crate::types::{
    Annotations, BlockId, Color, DatabaseId, DatePoint, DateValue, FileObject, FileSource, Icon,
    Link, PageId, Parent, RichTextItem, RichTextType, UserId, UserRef,
};

/// Conversion of a wire shape into its domain type.
pub trait ToDomain<T> {
    fn to_domain(self) -> Result<T, BuildError>;
}

fn decode<T: serde::de::DeserializeOwned>(raw: &Value, what: &str) -> Result<T, BuildError> {
    serde_json::from_value(raw.clone())
        .map_err(|e| BuildError::MalformedResponse(format!("{}: {}", what, e)))
}

#[derive(Debug, Deserialize)]
pub struct DatabaseResponse {
    pub id: String,
    #[serde(default)]
    pub title: Vec<RichTextResponse>,
    #[serde(default)]
    pub description: Vec<RichTextResponse>,
    pub icon: Option<Value>,
    pub cover: Option<Value>,
    pub parent: Option<Value>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub is_inline: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub properties: IndexMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct PageResponse {
    pub id: String,
    pub parent: Option<Value>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub archived: bool,
    pub icon: Option<Value>,
    pub cover: Option<Value>,
    #[serde(default)]
    pub properties: IndexMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct RichTextResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<TextContent>,
    pub mention: Option<Value>,
    pub equation: Option<EquationContent>,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub plain_text: String,
    pub href: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TextContent {
    pub content: String,
    pub link: Option<Link>,
}

#[derive(Debug, Deserialize)]
pub struct EquationContent {
    pub expression: String,
}

impl ToDomain<RichTextItem> for RichTextResponse {
    fn to_domain(self) -> Result<RichTextItem, BuildError> {
        let text_type = match (self.kind.as_str(), self.text, self.mention, self.equation) {
            ("text", Some(text), _, _) => RichTextType::Text {
                content: text.content,
                link: text.link,
            },
            ("mention", _, Some(mention), _) => RichTextType::Mention(mention),
            ("equation", _, _, Some(equation)) => RichTextType::Equation {
                expression: equation.expression,
            },
            (kind, ..) => {
                return Err(BuildError::MalformedResponse(format!(
                    "rich text of type '{}' has no matching body",
                    kind
                )))
            }
        };
        Ok(RichTextItem {
            text_type,
            annotations: self.annotations,
            plain_text: self.plain_text,
            href: self.href,
        })
    }
}

pub fn rich_text(items: Vec<RichTextResponse>) -> Result<Vec<RichTextItem>, BuildError> {
    items.into_iter().map(ToDomain::to_domain).collect()
}

#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub name: Option<String>,
}

impl ToDomain<UserRef> for UserResponse {
    fn to_domain(self) -> Result<UserRef, BuildError> {
        Ok(UserRef {
            id: UserId::parse(&self.id)?,
            name: self.name,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct OptionResponse {
    pub id: Option<String>,
    pub name: String,
    pub color: Option<Color>,
}

impl From<OptionResponse> for SelectOption {
    fn from(option: OptionResponse) -> Self {
        SelectOption {
            id: option.id,
            name: option.name,
            color: option.color,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GroupResponse {
    pub id: Option<String>,
    pub name: String,
    pub color: Option<Color>,
    #[serde(default)]
    pub option_ids: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OptionsBody {
    #[serde(default)]
    options: Vec<OptionResponse>,
    #[serde(default)]
    groups: Vec<GroupResponse>,
}

impl OptionsBody {
    fn option_list(options: Vec<OptionResponse>) -> OptionList {
        OptionList::from_options(options.into_iter().map(SelectOption::from).collect())
    }
}

#[derive(Debug, Default, Deserialize)]
struct NumberBody {
    format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FormulaBody {
    #[serde(default)]
    expression: String,
}

#[derive(Debug, Deserialize)]
struct RelationBody {
    database_id: String,
    #[serde(rename = "type")]
    mode: Option<String>,
    dual_property: Option<DualBody>,
}

#[derive(Debug, Default, Deserialize)]
struct DualBody {
    synced_property_id: Option<String>,
    synced_property_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RollupBody {
    function: Option<String>,
    relation_property_id: Option<String>,
    relation_property_name: Option<String>,
    rollup_property_id: Option<String>,
    rollup_property_name: Option<String>,
}

/// Reads the `type` tag of a property object. Unknown kinds yield `None`.
fn property_kind(name: &str, raw: &Value) -> Result<Option<(PropertyKind, String)>, BuildError> {
    let tag = raw
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| BuildError::MalformedResponse(format!("property '{}' has no type", name)))?;
    match tag.parse::<PropertyKind>() {
        Ok(kind) => {
            let id = raw
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Ok(Some((kind, id)))
        }
        Err(_) => {
            log::warn!("Skipping property '{}' of unsupported type '{}'", name, tag);
            Ok(None)
        }
    }
}

/// Decodes one column of a database schema.
pub fn column(name: &str, raw: &Value) -> Result<Option<ColumnDefinition>, BuildError> {
    let Some((kind, id)) = property_kind(name, raw)? else {
        return Ok(None);
    };
    let body = raw.get(kind.as_str()).cloned().unwrap_or(Value::Null);
    let body = if body.is_null() {
        Value::Object(Default::default())
    } else {
        body
    };
    let what = format!("column '{}'", name);

    let config = match kind {
        PropertyKind::Number => {
            let body: NumberBody = decode(&body, &what)?;
            let format = match body.format.as_deref().map(str::parse::<NumberFormat>) {
                Some(Ok(format)) => format,
                Some(Err(err)) => {
                    log::warn!("{}: {}; using the default format", what, err);
                    NumberFormat::default()
                }
                None => NumberFormat::default(),
            };
            ColumnConfig::Number { format }
        }
        PropertyKind::Select | PropertyKind::MultiSelect => {
            let body: OptionsBody = decode(&body, &what)?;
            let options = OptionsBody::option_list(body.options);
            if kind == PropertyKind::Select {
                ColumnConfig::Select(options)
            } else {
                ColumnConfig::MultiSelect(options)
            }
        }
        PropertyKind::Status => {
            let body: OptionsBody = decode(&body, &what)?;
            ColumnConfig::Status(StatusOptions {
                options: OptionsBody::option_list(body.options),
                groups: body
                    .groups
                    .into_iter()
                    .map(|group| OptionGroup {
                        id: group.id,
                        name: group.name,
                        color: group.color,
                        option_ids: group.option_ids,
                    })
                    .collect(),
            })
        }
        PropertyKind::Formula => {
            let body: FormulaBody = decode(&body, &what)?;
            ColumnConfig::formula(body.expression)
        }
        PropertyKind::Relation => {
            let body: RelationBody = decode(&body, &what)?;
            let database_id = DatabaseId::parse(&body.database_id)?;
            let mode = match body.mode.as_deref() {
                Some("dual_property") => {
                    let dual = body.dual_property.unwrap_or_default();
                    RelationMode::Dual {
                        synced_property_id: dual.synced_property_id,
                        synced_property_name: dual.synced_property_name,
                    }
                }
                _ => RelationMode::Single,
            };
            ColumnConfig::Relation(RelationConfig { database_id, mode })
        }
        PropertyKind::Rollup => {
            let body: RollupBody = decode(&body, &what)?;
            ColumnConfig::Rollup(RollupConfig {
                function: body
                    .function
                    .as_deref()
                    .map(str::parse::<RollupFunction>)
                    .transpose()?
                    .unwrap_or_default(),
                relation_property_id: body.relation_property_id,
                relation_property_name: body.relation_property_name,
                rollup_property_id: body.rollup_property_id,
                rollup_property_name: body.rollup_property_name,
            })
        }
        other => ColumnConfig::default_for(other).ok_or_else(|| {
            BuildError::MalformedResponse(format!("{} has no configuration", what))
        })?,
    };

    Ok(Some(ColumnDefinition {
        id,
        name: name.to_string(),
        config,
    }))
}

#[derive(Debug, Deserialize)]
struct DateResponse {
    start: String,
    end: Option<String>,
    time_zone: Option<String>,
}

impl ToDomain<DateValue> for DateResponse {
    fn to_domain(self) -> Result<DateValue, BuildError> {
        Ok(DateValue {
            start: DatePoint::parse(&self.start)?,
            end: self.end.as_deref().map(DatePoint::parse).transpose()?,
            time_zone: self.time_zone,
        })
    }
}

#[derive(Debug, Deserialize)]
struct FormulaResponse {
    #[serde(rename = "type")]
    kind: String,
    string: Option<String>,
    number: Option<f64>,
    boolean: Option<bool>,
    date: Option<DateResponse>,
}

impl ToDomain<FormulaResult> for FormulaResponse {
    fn to_domain(self) -> Result<FormulaResult, BuildError> {
        Ok(match self.kind.as_str() {
            "string" => FormulaResult::String(self.string),
            "number" => FormulaResult::Number(self.number),
            "boolean" => FormulaResult::Boolean(self.boolean),
            "date" => FormulaResult::Date(self.date.map(ToDomain::to_domain).transpose()?),
            other => {
                return Err(BuildError::MalformedResponse(format!(
                    "unknown formula result type '{}'",
                    other
                )))
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct RelationRef {
    id: String,
}

/// Decodes one property value of a page.
pub fn value(name: &str, raw: &Value) -> Result<Option<PropertyValue>, BuildError> {
    let Some((kind, id)) = property_kind(name, raw)? else {
        return Ok(None);
    };
    let body = raw.get(kind.as_str()).cloned().unwrap_or(Value::Null);
    let what = format!("value '{}'", name);

    let data = match kind {
        PropertyKind::Title => ValueData::Title(rich_text(decode(&body, &what)?)?),
        PropertyKind::RichText => ValueData::RichText(rich_text(decode(&body, &what)?)?),
        PropertyKind::Number => ValueData::Number(decode(&body, &what)?),
        PropertyKind::Select => ValueData::Select(
            decode::<Option<OptionResponse>>(&body, &what)?.map(SelectOption::from),
        ),
        PropertyKind::Status => ValueData::Status(
            decode::<Option<OptionResponse>>(&body, &what)?.map(SelectOption::from),
        ),
        PropertyKind::MultiSelect => ValueData::MultiSelect(
            decode::<Vec<OptionResponse>>(&body, &what)?
                .into_iter()
                .map(SelectOption::from)
                .collect(),
        ),
        PropertyKind::Date => ValueData::Date(
            decode::<Option<DateResponse>>(&body, &what)?
                .map(ToDomain::to_domain)
                .transpose()?,
        ),
        PropertyKind::People => ValueData::People(
            decode::<Vec<UserResponse>>(&body, &what)?
                .into_iter()
                .map(ToDomain::to_domain)
                .collect::<Result<_, _>>()?,
        ),
        PropertyKind::Files => ValueData::Files(
            decode::<Vec<Value>>(&body, &what)?
                .iter()
                .map(file)
                .collect::<Result<_, _>>()?,
        ),
        PropertyKind::Checkbox => ValueData::Checkbox(decode(&body, &what)?),
        PropertyKind::Url => ValueData::Url(decode(&body, &what)?),
        PropertyKind::Email => ValueData::Email(decode(&body, &what)?),
        PropertyKind::PhoneNumber => ValueData::PhoneNumber(decode(&body, &what)?),
        PropertyKind::Formula => ValueData::Formula(
            decode::<Option<FormulaResponse>>(&body, &what)?
                .map(ToDomain::to_domain)
                .transpose()?,
        ),
        PropertyKind::Relation => ValueData::Relation(
            decode::<Vec<RelationRef>>(&body, &what)?
                .iter()
                .map(|page| PageId::parse(&page.id))
                .collect::<Result<_, _>>()?,
        ),
        PropertyKind::Rollup => ValueData::Rollup((!body.is_null()).then_some(body)),
        PropertyKind::CreatedTime => {
            ValueData::CreatedTime(decode::<Option<DateTime<Utc>>>(&body, &what)?)
        }
        PropertyKind::LastEditedTime => {
            ValueData::LastEditedTime(decode::<Option<DateTime<Utc>>>(&body, &what)?)
        }
        PropertyKind::CreatedBy => ValueData::CreatedBy(
            decode::<Option<UserResponse>>(&body, &what)?
                .map(ToDomain::to_domain)
                .transpose()?,
        ),
        PropertyKind::LastEditedBy => ValueData::LastEditedBy(
            decode::<Option<UserResponse>>(&body, &what)?
                .map(ToDomain::to_domain)
                .transpose()?,
        ),
    };

    Ok(Some(PropertyValue::from_data(id, name, data)))
}

/// A file object of either source.
pub fn file(raw: &Value) -> Result<FileObject, BuildError> {
    let name = raw.get("name").and_then(Value::as_str).map(str::to_string);
    let url_of = |key: &str| {
        raw.get(key)
            .and_then(|body| body.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let source = match raw.get("type").and_then(Value::as_str) {
        Some("external") => url_of("external").map(|url| FileSource::External { url }),
        Some("file") => url_of("file").map(|url| FileSource::Hosted {
            url,
            expiry_time: raw
                .pointer("/file/expiry_time")
                .and_then(Value::as_str)
                .and_then(|at| DateTime::parse_from_rfc3339(at).ok())
                .map(|at| at.with_timezone(&Utc)),
        }),
        _ => None,
    };
    source
        .map(|source| FileObject { name, source })
        .ok_or_else(|| BuildError::MalformedResponse(format!("unrecognized file object: {}", raw)))
}

/// Icons of unsupported types (custom emoji) are dropped with a warning.
pub fn icon(raw: &Value) -> Option<Icon> {
    let decoded = match raw.get("type").and_then(Value::as_str) {
        Some("emoji") => raw
            .get("emoji")
            .and_then(Value::as_str)
            .map(|emoji| Icon::Emoji(emoji.to_string())),
        Some("external") | Some("file") => file(raw).ok().map(|file| Icon::from(&file)),
        _ => None,
    };
    if decoded.is_none() {
        log::warn!("Ignoring unsupported icon: {}", raw);
    }
    decoded
}

pub fn parent(raw: &Value) -> Result<Parent, BuildError> {
    let id_of = |key: &str| {
        raw.get(key).and_then(Value::as_str).ok_or_else(|| {
            BuildError::MalformedResponse(format!("parent of type {} has no id", key))
        })
    };
    match raw.get("type").and_then(Value::as_str) {
        Some("page_id") => Ok(Parent::Page(PageId::parse(id_of("page_id")?)?)),
        Some("database_id") => Ok(Parent::Database(DatabaseId::parse(id_of("database_id")?)?)),
        Some("block_id") => Ok(Parent::Block(BlockId::parse(id_of("block_id")?)?)),
        Some("workspace") => Ok(Parent::Workspace),
        other => Err(BuildError::MalformedResponse(format!(
            "unknown parent type {:?}",
            other
        ))),
    }
}
