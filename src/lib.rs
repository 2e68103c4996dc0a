// src/lib.rs
//! notion-patch: offline builder for minimal, validated Notion schema and
//! page property payloads.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `BuildError`, `ValidationError`, `AppError`
//! - **Domain types**: ids, colors, rich text, files, icons, dates
//! - **Property catalog**: `PropertyKind`, `ColumnConfig`, `PropertyValue`
//! - **Builders**: `ColumnSet`, `ValueSet`, record builders and drafts
//! - **Schema links**: `SchemaRegistry`
//! - **Decoding**: `decode_database`, `decode_page`

pub mod api;
pub mod builder;
pub mod config;
pub mod constants;
mod error;
pub mod model;
pub mod pipeline;
pub mod schema;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, BuildError, Result};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CommandLineInput, RenderConfig};

// --- Domain Types ---
pub use crate::types::{
    Annotations, BlockId, Color, DatabaseId, DatePoint, DateValue, FileObject, FileSource, Icon,
    Link, PageId, Parent, RichTextItem, RichTextType, UserId, UserRef,
};

// --- Property Catalog ---
pub use crate::model::{
    ColumnConfig, ColumnDefinition, Database, FormulaResult, NumberFormat, OptionGroup,
    OptionList, Page, PropertyKind, PropertyValue, RelationConfig, RelationMode, RollupConfig,
    RollupFunction, SelectOption, StatusOptions, ValueData,
};

// --- Builders ---
pub use crate::builder::{
    ColumnBuilder, ColumnSet, DatabaseBuilder, DatabaseDraft, DatabaseUpdate, FieldSpec, Input,
    InputShape, PageBuilder, PageDraft, PageUpdate, Patch, PatchSchema, Slot, ValueSet,
};

// --- Schema Links ---
pub use crate::schema::SchemaRegistry;

// --- Decoding ---
pub use crate::api::{decode_column, decode_database, decode_page, decode_value};
