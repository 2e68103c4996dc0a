// src/model/column.rs
//! Column definitions: the typed schema slots of a database.

use serde_json::{json, Map, Value};
use std::fmt;

use super::kind::PropertyKind;
use super::options::{OptionList, SelectOption, StatusOptions};
use crate::error::BuildError;
use crate::types::{DatabaseId, ValidationError};

/// Declares a closed wire vocabulary with its tags, `FromStr` and `Display`.
macro_rules! wire_vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            default $default:ident => $default_tag:literal,
            $($variant:ident => $tag:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            #[default]
            $default,
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $name::$default => $default_tag,
                    $($name::$variant => $tag),+
                }
            }

            pub fn tags() -> Vec<&'static str> {
                let mut tags = vec![$default_tag];
                tags.extend([$($tag),+]);
                tags
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $default_tag => Ok($name::$default),
                    $($tag => Ok($name::$variant),)+
                    _ => Err(ValidationError::UnknownVariant {
                        vocabulary: $label,
                        value: s.to_string(),
                        expected: $name::tags(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_vocabulary! {
    /// Display format of a number column.
    NumberFormat ("number format") {
        default Number => "number",
        NumberWithCommas => "number_with_commas",
        Percent => "percent",
        Dollar => "dollar",
        CanadianDollar => "canadian_dollar",
        SingaporeDollar => "singapore_dollar",
        Euro => "euro",
        Pound => "pound",
        Yen => "yen",
        Ruble => "ruble",
        Rupee => "rupee",
        Won => "won",
        Yuan => "yuan",
        Real => "real",
        Lira => "lira",
        Rupiah => "rupiah",
        Franc => "franc",
        HongKongDollar => "hong_kong_dollar",
        NewZealandDollar => "new_zealand_dollar",
        Krona => "krona",
        NorwegianKrone => "norwegian_krone",
        MexicanPeso => "mexican_peso",
        Rand => "rand",
        NewTaiwanDollar => "new_taiwan_dollar",
        DanishKrone => "danish_krone",
        Zloty => "zloty",
        Baht => "baht",
        Forint => "forint",
        Koruna => "koruna",
        Shekel => "shekel",
        ChileanPeso => "chilean_peso",
        PhilippinePeso => "philippine_peso",
        Dirham => "dirham",
        ColombianPeso => "colombian_peso",
        Riyal => "riyal",
        Ringgit => "ringgit",
        Leu => "leu",
        ArgentinePeso => "argentine_peso",
        UruguayanPeso => "uruguayan_peso",
        PeruvianSol => "peruvian_sol",
    }
}

wire_vocabulary! {
    /// Aggregation applied by a rollup column.
    RollupFunction ("rollup function") {
        default ShowOriginal => "show_original",
        Average => "average",
        Checked => "checked",
        CountPerGroup => "count_per_group",
        Count => "count",
        CountValues => "count_values",
        DateRange => "date_range",
        EarliestDate => "earliest_date",
        Empty => "empty",
        LatestDate => "latest_date",
        Max => "max",
        Median => "median",
        Min => "min",
        NotEmpty => "not_empty",
        PercentChecked => "percent_checked",
        PercentEmpty => "percent_empty",
        PercentNotEmpty => "percent_not_empty",
        PercentPerGroup => "percent_per_group",
        PercentUnchecked => "percent_unchecked",
        Range => "range",
        Unchecked => "unchecked",
        Unique => "unique",
        ShowUnique => "show_unique",
        Sum => "sum",
    }
}

/// Whether a relation is mirrored by a synced property on the target database.
#[derive(Debug, Clone, PartialEq)]
pub enum RelationMode {
    Single,
    Dual {
        synced_property_id: Option<String>,
        synced_property_name: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelationConfig {
    pub database_id: DatabaseId,
    pub mode: RelationMode,
}

impl RelationConfig {
    pub fn single(database_id: DatabaseId) -> Self {
        Self {
            database_id,
            mode: RelationMode::Single,
        }
    }

    pub fn dual(database_id: DatabaseId) -> Self {
        Self {
            database_id,
            mode: RelationMode::Dual {
                synced_property_id: None,
                synced_property_name: None,
            },
        }
    }

    /// Toggles between single and dual mode, dropping synced property data.
    pub fn switch(&mut self) {
        self.mode = match self.mode {
            RelationMode::Single => RelationMode::Dual {
                synced_property_id: None,
                synced_property_name: None,
            },
            RelationMode::Dual { .. } => RelationMode::Single,
        };
    }

    pub fn mode_tag(&self) -> &'static str {
        match self.mode {
            RelationMode::Single => "single_property",
            RelationMode::Dual { .. } => "dual_property",
        }
    }

    /// The synced property of a dual relation is managed by Notion, so the
    /// mode object is always sent empty.
    pub fn render(&self) -> Value {
        let tag = self.mode_tag();
        let mut rendered = Map::new();
        rendered.insert("database_id".into(), json!(self.database_id.to_dashed()));
        rendered.insert("type".into(), json!(tag));
        rendered.insert(tag.into(), json!({}));
        Value::Object(rendered)
    }
}

/// Descriptor of a rollup: which relation to follow, which column to
/// aggregate, and how.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollupConfig {
    pub function: RollupFunction,
    pub relation_property_id: Option<String>,
    pub relation_property_name: Option<String>,
    pub rollup_property_id: Option<String>,
    pub rollup_property_name: Option<String>,
}

impl RollupConfig {
    /// Rollup over `rollup_property` reached through the `relation` column.
    pub fn over(relation: &ColumnDefinition, rollup_property: &ColumnDefinition) -> Self {
        let mut config = Self::default();
        config.set_relation(relation);
        config.set_rollup_property(rollup_property);
        config
    }

    pub fn with_function(mut self, function: RollupFunction) -> Self {
        self.function = function;
        self
    }

    pub fn set_relation(&mut self, relation: &ColumnDefinition) {
        self.relation_property_id = non_empty(&relation.id);
        self.relation_property_name = non_empty(&relation.name);
    }

    pub fn set_rollup_property(&mut self, column: &ColumnDefinition) {
        self.rollup_property_id = non_empty(&column.id);
        self.rollup_property_name = non_empty(&column.name);
    }

    /// Renders the present descriptor fields.
    ///
    /// Notion identifies each end of a rollup by id or by name, so at least
    /// one of each pair has to be known.
    pub fn render(&self) -> Result<Value, BuildError> {
        let mut missing = Vec::new();
        if self.relation_property_id.is_none() && self.relation_property_name.is_none() {
            missing.push("relation_property_id or relation_property_name".to_string());
        }
        if self.rollup_property_id.is_none() && self.rollup_property_name.is_none() {
            missing.push("rollup_property_id or rollup_property_name".to_string());
        }
        if !missing.is_empty() {
            return Err(BuildError::MissingField {
                owner: "rollup".to_string(),
                missing,
            });
        }

        let mut rendered = Map::new();
        rendered.insert("function".into(), json!(self.function.as_str()));
        let fields = [
            ("relation_property_id", &self.relation_property_id),
            ("relation_property_name", &self.relation_property_name),
            ("rollup_property_id", &self.rollup_property_id),
            ("rollup_property_name", &self.rollup_property_name),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                rendered.insert(key.into(), json!(value));
            }
        }
        Ok(Value::Object(rendered))
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Kind-specific configuration of a column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnConfig {
    Title,
    RichText,
    Number { format: NumberFormat },
    Select(OptionList),
    MultiSelect(OptionList),
    Status(StatusOptions),
    Date,
    People,
    Files,
    Checkbox,
    Url,
    Email,
    PhoneNumber,
    Formula { expression: String },
    Relation(RelationConfig),
    Rollup(RollupConfig),
    CreatedTime,
    CreatedBy,
    LastEditedTime,
    LastEditedBy,
}

impl ColumnConfig {
    /// Default configuration for kinds that need no caller input.
    ///
    /// Relations need a target database and have no default.
    pub fn default_for(kind: PropertyKind) -> Option<Self> {
        Some(match kind {
            PropertyKind::Title => ColumnConfig::Title,
            PropertyKind::RichText => ColumnConfig::RichText,
            PropertyKind::Number => ColumnConfig::Number {
                format: NumberFormat::default(),
            },
            PropertyKind::Select => ColumnConfig::Select(OptionList::new()),
            PropertyKind::MultiSelect => ColumnConfig::MultiSelect(OptionList::new()),
            PropertyKind::Status => ColumnConfig::Status(StatusOptions::default()),
            PropertyKind::Date => ColumnConfig::Date,
            PropertyKind::People => ColumnConfig::People,
            PropertyKind::Files => ColumnConfig::Files,
            PropertyKind::Checkbox => ColumnConfig::Checkbox,
            PropertyKind::Url => ColumnConfig::Url,
            PropertyKind::Email => ColumnConfig::Email,
            PropertyKind::PhoneNumber => ColumnConfig::PhoneNumber,
            PropertyKind::Formula => ColumnConfig::Formula {
                expression: String::new(),
            },
            PropertyKind::Relation => return None,
            PropertyKind::Rollup => ColumnConfig::Rollup(RollupConfig::default()),
            PropertyKind::CreatedTime => ColumnConfig::CreatedTime,
            PropertyKind::CreatedBy => ColumnConfig::CreatedBy,
            PropertyKind::LastEditedTime => ColumnConfig::LastEditedTime,
            PropertyKind::LastEditedBy => ColumnConfig::LastEditedBy,
        })
    }

    pub fn select<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ColumnConfig::Select(options_named(names))
    }

    pub fn multi_select<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ColumnConfig::MultiSelect(options_named(names))
    }

    pub fn formula(expression: impl Into<String>) -> Self {
        ColumnConfig::Formula {
            expression: expression.into(),
        }
    }

    pub fn kind(&self) -> PropertyKind {
        match self {
            ColumnConfig::Title => PropertyKind::Title,
            ColumnConfig::RichText => PropertyKind::RichText,
            ColumnConfig::Number { .. } => PropertyKind::Number,
            ColumnConfig::Select(_) => PropertyKind::Select,
            ColumnConfig::MultiSelect(_) => PropertyKind::MultiSelect,
            ColumnConfig::Status(_) => PropertyKind::Status,
            ColumnConfig::Date => PropertyKind::Date,
            ColumnConfig::People => PropertyKind::People,
            ColumnConfig::Files => PropertyKind::Files,
            ColumnConfig::Checkbox => PropertyKind::Checkbox,
            ColumnConfig::Url => PropertyKind::Url,
            ColumnConfig::Email => PropertyKind::Email,
            ColumnConfig::PhoneNumber => PropertyKind::PhoneNumber,
            ColumnConfig::Formula { .. } => PropertyKind::Formula,
            ColumnConfig::Relation(_) => PropertyKind::Relation,
            ColumnConfig::Rollup(_) => PropertyKind::Rollup,
            ColumnConfig::CreatedTime => PropertyKind::CreatedTime,
            ColumnConfig::CreatedBy => PropertyKind::CreatedBy,
            ColumnConfig::LastEditedTime => PropertyKind::LastEditedTime,
            ColumnConfig::LastEditedBy => PropertyKind::LastEditedBy,
        }
    }

    /// The option list of a select, multi-select or status column.
    pub fn options(&self) -> Option<&OptionList> {
        match self {
            ColumnConfig::Select(options) | ColumnConfig::MultiSelect(options) => Some(options),
            ColumnConfig::Status(status) => Some(&status.options),
            _ => None,
        }
    }

    /// The payload nested under the kind tag.
    pub fn render_payload(&self) -> Result<Value, BuildError> {
        Ok(match self {
            ColumnConfig::Number { format } => json!({ "format": format.as_str() }),
            ColumnConfig::Select(options) | ColumnConfig::MultiSelect(options) => {
                json!({ "options": options.render(true) })
            }
            // Status options cannot be written through the API.
            ColumnConfig::Status(_) => json!({}),
            ColumnConfig::Formula { expression } => json!({ "expression": expression }),
            ColumnConfig::Relation(relation) => relation.render(),
            ColumnConfig::Rollup(rollup) => rollup.render()?,
            _ => json!({}),
        })
    }
}

fn options_named<I, S>(names: I) -> OptionList
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    OptionList::from_options(names.into_iter().map(SelectOption::named).collect())
}

/// A named, typed column of a database.
///
/// Columns built locally have an empty `id` until Notion assigns one.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub id: String,
    pub name: String,
    pub config: ColumnConfig,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, config: ColumnConfig) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            config,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn kind(&self) -> PropertyKind {
        self.config.kind()
    }

    pub fn options(&self) -> Option<&OptionList> {
        self.config.options()
    }

    /// `{kind: payload}`, e.g. `{"title": {}}`.
    pub fn render(&self) -> Result<Value, BuildError> {
        let mut rendered = Map::new();
        rendered.insert(self.kind().as_str().into(), self.config.render_payload()?);
        Ok(Value::Object(rendered))
    }
}

impl From<ColumnConfig> for ColumnDefinition {
    fn from(config: ColumnConfig) -> Self {
        ColumnDefinition::new(String::new(), config)
    }
}
