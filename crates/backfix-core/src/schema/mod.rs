//! Schema descriptions: the fixed target schema and source snapshots.

pub mod profile;
pub mod target;

pub use profile::{ColumnProfile, TableProfile};
pub use target::{TargetSchema, TargetSchemaInfo, TARGET_SCHEMA};
