//! Value repair: scalar cleaning and duration canonicalization.
//!
//! Every repair is recorded as a [`crate::types::CleaningEntry`] so the
//! user can audit what the conversion changed.

pub mod duration;
pub mod value;

pub use value::{sanitize, Sanitized};
