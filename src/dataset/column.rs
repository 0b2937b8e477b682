//! Column storage and type inference.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::constants::analysis::MISSING_MARKERS;

/// Storage type inferred from a column's non-missing cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Datetime,
    Text,
}

impl ColumnKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    /// Columns profiled by value frequency rather than distribution
    pub fn is_categorical(&self) -> bool {
        matches!(self, Self::Text | Self::Boolean)
    }

    /// Infer the narrowest kind that accepts every present value.
    /// A column with no present values is text.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut candidates = [true; 4]; // integer, float, boolean, datetime
        let mut seen_any = false;

        for raw in values {
            seen_any = true;
            let v = raw.trim();
            if candidates[0] && v.parse::<i64>().is_err() {
                candidates[0] = false;
            }
            if candidates[1] && parse_float(v).is_none() {
                candidates[1] = false;
            }
            if candidates[2] && parse_bool(v).is_none() {
                candidates[2] = false;
            }
            if candidates[3] && !is_datetime(v) {
                candidates[3] = false;
            }
            if !candidates.iter().any(|c| *c) {
                return Self::Text;
            }
        }

        if !seen_any {
            return Self::Text;
        }
        match candidates {
            [true, ..] => Self::Integer,
            [_, true, ..] => Self::Float,
            [_, _, true, _] => Self::Boolean,
            [_, _, _, true] => Self::Datetime,
            _ => Self::Text,
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Datetime => "datetime",
            Self::Text => "text",
        };
        write!(f, "{}", s)
    }
}

/// Finite floats only; "inf" and "NaN" are not numeric data
pub fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

fn is_datetime(s: &str) -> bool {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

    DateTime::parse_from_rfc3339(s).is_ok()
        || DATE_FORMATS
            .iter()
            .any(|f| NaiveDate::parse_from_str(s, f).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|f| NaiveDateTime::parse_from_str(s, f).is_ok())
}

/// Whether a raw cell counts as missing
pub fn is_missing(raw: &str) -> bool {
    let v = raw.trim();
    MISSING_MARKERS.iter().any(|m| v.eq_ignore_ascii_case(m))
}

/// One named column; `None` marks a missing cell
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    values: Vec<Option<String>>,
}

impl Column {
    pub fn new(name: impl Into<String>, raw: Vec<String>) -> Self {
        let values: Vec<Option<String>> = raw
            .into_iter()
            .map(|v| if is_missing(&v) { None } else { Some(v) })
            .collect();
        let kind = ColumnKind::infer(values.iter().flatten().map(String::as_str));
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&str> {
        self.values.get(row).and_then(|v| v.as_deref())
    }

    /// Present (non-missing) values in row order
    pub fn present(&self) -> impl Iterator<Item = &str> {
        self.values.iter().flatten().map(String::as_str)
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    pub fn unique_count(&self) -> usize {
        self.present().collect::<HashSet<_>>().len()
    }

    /// Parsed numeric values, for integer and float columns
    pub fn numeric_values(&self) -> Vec<f64> {
        if !self.kind.is_numeric() {
            return Vec::new();
        }
        self.present().filter_map(parse_float).collect()
    }

    /// First `n` present values
    pub fn samples(&self, n: usize) -> Vec<String> {
        self.present().take(n).map(String::from).collect()
    }

    /// Approximate in-memory footprint of the stored cells
    pub fn approx_bytes(&self) -> usize {
        self.values
            .iter()
            .map(|v| std::mem::size_of::<Option<String>>() + v.as_ref().map_or(0, |s| s.len()))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(values: &[&str]) -> Column {
        Column::new("c", values.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_infer_kinds() {
        assert_eq!(col(&["1", "2", " 3 "]).kind(), ColumnKind::Integer);
        assert_eq!(col(&["1", "2.5", "-3e2"]).kind(), ColumnKind::Float);
        assert_eq!(col(&["yes", "No", "TRUE"]).kind(), ColumnKind::Boolean);
        assert_eq!(
            col(&["2024-01-05", "2024-02-10 08:30:00", "2024-03-01T00:00:00Z"]).kind(),
            ColumnKind::Datetime
        );
        assert_eq!(col(&["red", "1", "blue"]).kind(), ColumnKind::Text);
    }

    #[test]
    fn test_missing_markers_ignored_for_inference() {
        let c = col(&["10", "", "NA", "n/a", "20", "null"]);
        assert_eq!(c.kind(), ColumnKind::Integer);
        assert_eq!(c.null_count(), 4);
        assert_eq!(c.numeric_values(), vec![10.0, 20.0]);
    }

    #[test]
    fn test_all_missing_is_text() {
        let c = col(&["", "NaN", "None"]);
        assert_eq!(c.kind(), ColumnKind::Text);
        assert!(c.samples(5).is_empty());
    }

    #[test]
    fn test_infinity_is_not_numeric() {
        assert_eq!(col(&["1.0", "inf"]).kind(), ColumnKind::Text);
    }

    #[test]
    fn test_unique_and_samples() {
        let c = col(&["a", "b", "a", "", "c", "d", "e", "f"]);
        assert_eq!(c.unique_count(), 6);
        assert_eq!(c.samples(3), vec!["a", "b", "a"]);
        assert_eq!(c.get(3), None);
        assert_eq!(c.get(4), Some("c"));
    }

    #[test]
    fn test_categorical_and_numeric_flags() {
        assert!(ColumnKind::Text.is_categorical());
        assert!(ColumnKind::Boolean.is_categorical());
        assert!(!ColumnKind::Datetime.is_categorical());
        assert!(ColumnKind::Float.is_numeric());
    }
}
