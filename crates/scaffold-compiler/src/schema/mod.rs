//! Schema document persistence and change detection.
//!
//! The assembled document is the stable hand-off to downstream generators.
//! This module:
//!
//! 1. Stores the document for each requested name
//! 2. Loads the previously stored document on the next run
//! 3. Reports what changed, marking breaking changes

pub mod diff;
pub mod store;

pub use diff::{diff_documents, SchemaChange, SchemaDiff};
pub use store::{display_path, fingerprint, to_canonical_json, SchemaStore};
