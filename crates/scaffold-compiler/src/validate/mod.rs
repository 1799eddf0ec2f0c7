//! Validation of schema IR.

mod structure;

use crate::diagnostic::ScaffoldError;
use crate::ir::SchemaDocument;

pub use structure::is_identifier;

/// Validates an assembled document.
///
/// Runs after every input has been read, so cross-input references
/// (key columns, index columns) can be checked against the full column list.
pub fn validate_document(document: &SchemaDocument) -> Result<(), ScaffoldError> {
    structure::validate_names(document)?;
    structure::validate_primary_key(document)?;
    structure::validate_indexes(document)?;
    structure::validate_relations(document)?;
    Ok(())
}

/// Checks an API version label such as `v2`.
pub fn validate_api_version(version: &str) -> Result<(), ScaffoldError> {
    let valid = version
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()));
    if valid {
        Ok(())
    } else {
        Err(ScaffoldError::InvalidApiVersion {
            version: version.to_string(),
        })
    }
}
