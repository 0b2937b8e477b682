//! Dataset loading
//!
//! Reads an uploaded CSV into an immutable, column-major table. Bytes are
//! decoded as UTF-8, falling back to Latin-1 when they are not valid UTF-8.
//! Empty or malformed files are `PlanError::Input`.

pub mod column;
pub mod quality;
pub mod stats;

pub use column::{Column, ColumnKind};
pub use quality::{IssueType, QualityIssue, QualityReport, QualitySummary, Severity};
pub use stats::{CategoricalSummary, ColumnFacts, DatasetSummary, DistributionShape, NumericSummary};

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::types::{PlanError, Result};

/// Text encoding the file was decoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Latin1,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => write!(f, "utf-8"),
            Self::Latin1 => write!(f, "latin-1"),
        }
    }
}

/// Loaded tabular data; immutable once built
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    columns: Vec<Column>,
    row_count: usize,
    original_row_count: usize,
    encoding: Encoding,
}

impl Dataset {
    /// Load a CSV file; the dataset is named after the file stem.
    pub fn from_path(path: &Path, config: &AnalysisConfig) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            PlanError::Input(format!("cannot read {}: {}", path.display(), e))
        })?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("dataset");
        Self::from_bytes(name, &bytes, config)
    }

    pub fn from_bytes(name: &str, bytes: &[u8], config: &AnalysisConfig) -> Result<Self> {
        let (text, encoding) = decode(bytes);
        if text.trim().is_empty() {
            return Err(PlanError::Input(format!("'{}' is empty", name)));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(text.as_bytes());

        let headers = unique_headers(reader.headers()?.iter());
        if headers.is_empty() {
            return Err(PlanError::Input(format!("'{}' has no columns", name)));
        }

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        let mut original_row_count = 0usize;
        for record in reader.records() {
            let record = record?;
            original_row_count += 1;
            if original_row_count > config.max_rows {
                continue;
            }
            for (idx, value) in record.iter().enumerate() {
                cells[idx].push(value.to_string());
            }
        }

        if original_row_count == 0 {
            return Err(PlanError::Input(format!(
                "'{}' has a header but no data rows",
                name
            )));
        }
        let row_count = original_row_count.min(config.max_rows);
        if row_count < original_row_count {
            warn!(
                "Dataset '{}' has {} rows; analyzing the first {}",
                name, original_row_count, row_count
            );
        }

        let columns: Vec<Column> = headers
            .into_iter()
            .zip(cells)
            .map(|(header, values)| Column::new(header, values))
            .collect();

        info!(
            "Loaded dataset '{}': {} rows x {} columns ({})",
            name,
            row_count,
            columns.len(),
            encoding
        );
        for column in &columns {
            debug!("  {} -> {}", column.name(), column.kind());
        }

        Ok(Self {
            name: name.to_string(),
            columns,
            row_count,
            original_row_count,
            encoding,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn original_row_count(&self) -> usize {
        self.original_row_count
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Cells of one row, `None` for missing
    pub fn row(&self, index: usize) -> Vec<Option<&str>> {
        self.columns.iter().map(|c| c.get(index)).collect()
    }

    pub fn approx_bytes(&self) -> usize {
        self.columns.iter().map(Column::approx_bytes).sum()
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary::from_dataset(self)
    }
}

fn decode(bytes: &[u8]) -> (String, Encoding) {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), Encoding::Utf8),
        // ISO-8859-1 maps every byte to the code point of the same value
        Err(_) => (bytes.iter().map(|&b| b as char).collect(), Encoding::Latin1),
    }
}

/// Blank headers become `unnamed_<n>`; repeats get a `_<n>` suffix.
fn unique_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for (idx, header) in raw.enumerate() {
        let base = match header.trim() {
            "" => format!("unnamed_{}", idx + 1),
            h => h.to_string(),
        };
        let mut name = base.clone();
        let mut n = 2;
        while !seen.insert(name.clone()) {
            name = format!("{}_{}", base, n);
            n += 1;
        }
        out.push(name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config() -> AnalysisConfig {
        AnalysisConfig::default()
    }

    #[test]
    fn test_load_basic() {
        let ds = Dataset::from_bytes("sales", b"id,price,region\n1,9.5,north\n2,12.0,south\n", &config())
            .unwrap();
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.column_count(), 3);
        assert_eq!(ds.column("price").unwrap().kind(), ColumnKind::Float);
        assert_eq!(ds.row(1), vec![Some("2"), Some("12.0"), Some("south")]);
        assert_eq!(ds.encoding(), Encoding::Utf8);
    }

    #[test]
    fn test_latin1_fallback() {
        // "café" with é as 0xE9
        let bytes = b"name,city\nx,caf\xE9\n";
        let ds = Dataset::from_bytes("l1", bytes, &config()).unwrap();
        assert_eq!(ds.encoding(), Encoding::Latin1);
        assert_eq!(ds.column("city").unwrap().get(0), Some("café"));
    }

    #[test]
    fn test_bom_stripped() {
        let ds = Dataset::from_bytes("bom", b"\xEF\xBB\xBFid\n1\n", &config()).unwrap();
        assert_eq!(ds.columns()[0].name(), "id");
    }

    #[test]
    fn test_empty_inputs_rejected() {
        for bytes in [&b""[..], b"   \n", b"a,b\n"] {
            let err = Dataset::from_bytes("e", bytes, &config()).unwrap_err();
            assert!(matches!(err, PlanError::Input(_)), "{:?}", err);
        }
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Dataset::from_bytes("r", b"a,b\n1,2\n3\n", &config()).unwrap_err();
        assert!(matches!(err, PlanError::Input(_)));
        assert!(err.to_string().contains("line"));
    }

    #[test]
    fn test_row_limit() {
        let mut csv = String::from("n\n");
        for i in 0..25 {
            csv.push_str(&format!("{}\n", i));
        }
        let config = AnalysisConfig {
            max_rows: 10,
            ..Default::default()
        };
        let ds = Dataset::from_bytes("big", csv.as_bytes(), &config).unwrap();
        assert_eq!(ds.row_count(), 10);
        assert_eq!(ds.original_row_count(), 25);
        assert!(ds.summary().describe().contains("first 10 of 25 rows"));
    }

    #[test]
    fn test_duplicate_and_blank_headers() {
        let ds = Dataset::from_bytes("h", b"a,a,,a\n1,2,3,4\n", &config()).unwrap();
        let names: Vec<&str> = ds.columns().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["a", "a_2", "unnamed_3", "a_3"]);
    }

    #[test]
    fn test_from_path_uses_file_stem() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("customers.csv");
        std::fs::write(&path, "id\n1\n").unwrap();
        let ds = Dataset::from_path(&path, &config()).unwrap();
        assert_eq!(ds.name(), "customers");
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let err = Dataset::from_path(Path::new("/nonexistent/x.csv"), &config()).unwrap_err();
        assert!(matches!(err, PlanError::Input(_)));
    }
}
