//! Diagnostic types for error reporting.

mod error;
mod span;
mod warning;

pub use error::ScaffoldError;
pub use span::Location;
pub use warning::GenerationWarning;
