//! Delimited-text frontend (CSV and TSV).

mod reader;
mod to_ir;
mod tokens;

pub use reader::{Record, TabularReader};
pub use to_ir::assemble;

use crate::diagnostic::ScaffoldError;
use crate::ir::SchemaDocument;
use super::{Frontend, InputSet};

/// Frontend for one delimiter.
pub struct TabularFrontend {
    format: &'static str,
    delimiter: u8,
}

impl TabularFrontend {
    pub fn csv() -> Self {
        Self { format: "csv", delimiter: b',' }
    }

    pub fn tsv() -> Self {
        Self { format: "tsv", delimiter: b'\t' }
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }
}

impl Frontend for TabularFrontend {
    fn format(&self) -> &str {
        self.format
    }

    fn extension(&self) -> &str {
        self.format
    }

    fn assemble(&self, inputs: &InputSet) -> Result<SchemaDocument, ScaffoldError> {
        to_ir::assemble(inputs, self.delimiter)
    }
}
