//! Delimited-text reader.
//!
//! Produces records lazily, in file order. The reader consumes its input,
//! so a sequence cannot be restarted; open the file again to re-read it.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::diagnostic::{Location, ScaffoldError};

/// One data row, keyed by header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub location: Location,
    fields: Vec<(String, String)>,
}

impl Record {
    /// Value for a header, `None` when the header is absent or the value empty.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }

    /// Value for a header that must be present and non-empty.
    pub fn require(&self, name: &str) -> Result<&str, ScaffoldError> {
        self.get(name).ok_or_else(|| ScaffoldError::MissingField {
            file: self.location.file.clone(),
            line: self.location.line,
            field: name.to_string(),
        })
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    /// Fields in header order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Lazy reader over a delimited file with a header row.
///
/// Quoting follows RFC 4180, so a quoted value may span lines. Values are
/// trimmed, lines starting with `#` are comments, and rows with no content
/// are skipped.
pub struct TabularReader<R> {
    records: csv::StringRecordsIntoIter<R>,
    file: PathBuf,
    header: Vec<String>,
}

impl TabularReader<File> {
    /// Opens a file and reads its header row.
    pub fn open(path: &Path, delimiter: u8) -> Result<Self, ScaffoldError> {
        let file = File::open(path).map_err(|e| ScaffoldError::io(path, e.to_string()))?;
        Self::from_reader(file, path.to_path_buf(), delimiter)
    }
}

impl<R: Read> TabularReader<R> {
    /// Wraps any reader. `file` is used for diagnostics only.
    ///
    /// An empty input yields a reader with no header and no records.
    pub fn from_reader(reader: R, file: PathBuf, delimiter: u8) -> Result<Self, ScaffoldError> {
        // Row widths are checked against the header here so the error
        // carries our own line numbers.
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);

        let header = reader
            .headers()
            .map_err(|e| ScaffoldError::io(&file, e.to_string()))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_ascii_lowercase())
            .collect();

        Ok(Self {
            records: reader.into_records(),
            file,
            header,
        })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    fn to_record(&self, row: csv::StringRecord) -> Result<Record, ScaffoldError> {
        let line = row.position().map_or(0, |p| p.line() as usize);

        if row.len() != self.header.len() {
            return Err(ScaffoldError::MalformedRow {
                file: self.file.clone(),
                line,
                expected: self.header.len(),
                actual: row.len(),
            });
        }

        Ok(Record {
            location: Location::new(self.file.clone(), line),
            fields: self
                .header
                .iter()
                .cloned()
                .zip(row.iter().map(str::to_string))
                .collect(),
        })
    }
}

impl<R: Read> Iterator for TabularReader<R> {
    type Item = Result<Record, ScaffoldError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = match self.records.next()? {
                Ok(row) => row,
                Err(e) => return Some(Err(ScaffoldError::io(&self.file, e.to_string()))),
            };
            // Whitespace-only lines survive the reader as one empty field.
            if row.iter().all(str::is_empty) {
                continue;
            }
            return Some(self.to_record(row));
        }
    }
}
