pub mod coercion;
mod column;
mod column_set;
pub mod patch;
mod record;
mod value_set;

pub use coercion::{dispatch, FieldSpec, Input, InputShape};
pub use column::ColumnBuilder;
pub use column_set::ColumnSet;
pub use patch::{Patch, PatchSchema, Slot};
pub use record::{
    DatabaseBuilder, DatabaseDraft, DatabaseFields, DatabaseUpdate, PageBuilder, PageDraft,
    PageFields, PageUpdate, RecordField,
};
pub use value_set::ValueSet;
