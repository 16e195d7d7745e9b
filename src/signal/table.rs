use std::fs;
use std::path::Path;
use log::debug;
use crate::signal::SignalError;
/// Raw tabular export: the header row plus every non-blank data row as trimmed cells.
#[derive(Clone, Debug, Default)]
pub struct Table {
    pub fields: Vec<String>,
    pub rows: Vec<Vec<String>>,
}
impl Table {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SignalError> {
        let bytes = fs::read(path.as_ref())?;
        Self::from_bytes(&bytes)
    }
    /// Parse an export held in memory. The delimiter is sniffed from the header line.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignalError> {
        let delimiter = sniff_delimiter(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);
        let fields: Vec<String> = reader
            .byte_headers()?
            .iter()
            .map(|f| {
                String::from_utf8_lossy(f)
                    .trim_start_matches('\u{feff}')
                    .trim()
                    .to_owned()
            })
            .collect();
        if fields.iter().all(|f| f.is_empty()) {
            return Err(SignalError::Schema("header row is missing".into()));
        }
        let mut rows = Vec::new();
        for (line, record) in reader.byte_records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    if let csv::ErrorKind::Io(_) = err.kind() {
                        return Err(err.into());
                    }
                    debug!("skipping malformed row {}: {}", line + 2, err);
                    continue;
                }
            };
            let cells: Vec<String> = record
                .iter()
                .map(|c| String::from_utf8_lossy(c).into_owned())
                .collect();
            if cells.iter().all(|c| c.is_empty()) {
                continue;
            }
            rows.push(cells);
        }
        Ok(Self { fields, rows })
    }
    /// Index of the first header whose lower-cased name contains `needle`.
    pub fn find_field(&self, needle: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.to_lowercase().contains(needle))
    }
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }
    /// Cell value, or the empty string for a short row.
    pub fn cell<'a>(row: &'a [String], column: usize) -> &'a str {
        row.get(column).map(String::as_str).unwrap_or("")
    }
}
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes
        .split(|&b| b == b'\n')
        .find(|line| line.iter().any(|b| !b.is_ascii_whitespace()))
        .unwrap_or(&[]);
    let count = |d: u8| header.iter().filter(|&&b| b == d).count();
    let mut best = (b',', count(b','));
    for candidate in [b';', b'\t'] {
        let n = count(candidate);
        if n > best.1 {
            best = (candidate, n);
        }
    }
    best.0
}
