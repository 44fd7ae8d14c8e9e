//! Reading the untrusted source database: introspection, table location,
//! row extraction, and graph linking.

pub mod columns;
pub mod database;
pub mod extract;
pub mod link;
pub mod locate;

pub use database::{SourceDatabase, SourceTable};
