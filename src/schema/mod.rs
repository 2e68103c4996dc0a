mod registry;

pub use registry::SchemaRegistry;
