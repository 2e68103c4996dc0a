// src/api/mod.rs
//! Reading objects fetched from the Notion API.
//!
//! Fetching itself is left to the caller; this module only turns response
//! bodies into the domain model and keeps the schema registry in step.

pub mod parser;
mod responses;

pub use parser::{decode_column, decode_database, decode_page, decode_value};
pub use responses::ToDomain;
