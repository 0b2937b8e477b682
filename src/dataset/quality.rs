//! Data quality issue detection.
//!
//! Finds the issues the quality agent asks the model to explain and fix:
//! missing values, duplicate rows, IQR outliers and inconsistently spelled
//! categories.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::Dataset;
use super::column::Column;
use super::stats::{NumericSummary, percentage, round_to};
use crate::constants::quality::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    MissingValues,
    DuplicateRows,
    Outliers,
    InconsistentCategories,
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MissingValues => "missing_values",
            Self::DuplicateRows => "duplicate_rows",
            Self::Outliers => "outliers",
            Self::InconsistentCategories => "inconsistent_categories",
        };
        write!(f, "{}", s)
    }
}

/// One detected issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    /// Stable id, e.g. `missing_values:age`
    pub id: String,
    pub issue_type: IssueType,
    /// `None` for dataset-wide issues
    pub column: Option<String>,
    pub severity: Severity,
    pub description: String,
    pub count: usize,
    pub percentage: f64,
    /// Example affected values
    pub samples: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualitySummary {
    pub total_issues: usize,
    pub critical: usize,
    pub warnings: usize,
    pub info: usize,
}

impl QualitySummary {
    /// Short text used when threading quality results into later prompts
    pub fn describe(&self) -> String {
        if self.total_issues == 0 {
            "No quality issues detected".to_string()
        } else {
            format!(
                "{} issues found: {} critical, {} warnings",
                self.total_issues, self.critical, self.warnings
            )
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub issues: Vec<QualityIssue>,
    pub summary: QualitySummary,
}

impl QualityReport {
    /// Run every check over the dataset. Issues are ordered by severity,
    /// then by column position.
    pub fn detect(dataset: &Dataset) -> Self {
        let rows = dataset.row_count();
        let mut issues = Vec::new();

        for column in dataset.columns() {
            issues.extend(missing_values(column, rows));
        }
        issues.extend(duplicate_rows(dataset));
        for column in dataset.columns() {
            if column.kind().is_numeric() {
                issues.extend(outliers(column));
            }
            if column.kind().is_categorical() {
                issues.extend(inconsistent_categories(column));
            }
        }

        // stable sort keeps detection order within a severity
        issues.sort_by_key(|i| i.severity);

        let summary = QualitySummary {
            total_issues: issues.len(),
            critical: count_severity(&issues, Severity::Critical),
            warnings: count_severity(&issues, Severity::Warning),
            info: count_severity(&issues, Severity::Info),
        };
        Self { issues, summary }
    }
}

fn count_severity(issues: &[QualityIssue], severity: Severity) -> usize {
    issues.iter().filter(|i| i.severity == severity).count()
}

fn missing_values(column: &Column, rows: usize) -> Option<QualityIssue> {
    let count = column.null_count();
    if count == 0 {
        return None;
    }
    let pct = percentage(count, rows);
    let severity = if pct > MISSING_CRITICAL_PCT {
        Severity::Critical
    } else if pct > MISSING_WARNING_PCT {
        Severity::Warning
    } else {
        Severity::Info
    };
    Some(QualityIssue {
        id: format!("{}:{}", IssueType::MissingValues, column.name()),
        issue_type: IssueType::MissingValues,
        column: Some(column.name().to_string()),
        severity,
        description: format!(
            "Column '{}' has {} missing values ({}%)",
            column.name(),
            count,
            pct
        ),
        count,
        percentage: pct,
        samples: column.samples(ISSUE_SAMPLE_VALUES),
    })
}

fn duplicate_rows(dataset: &Dataset) -> Option<QualityIssue> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for row in 0..dataset.row_count() {
        let key = dataset.row(row);
        if !seen.insert(key) {
            duplicates.push(row);
        }
    }
    if duplicates.is_empty() {
        return None;
    }

    let count = duplicates.len();
    let pct = percentage(count, dataset.row_count());
    let severity = if pct > DUPLICATE_WARNING_PCT {
        Severity::Warning
    } else {
        Severity::Info
    };
    Some(QualityIssue {
        id: IssueType::DuplicateRows.to_string(),
        issue_type: IssueType::DuplicateRows,
        column: None,
        severity,
        description: format!("Dataset has {} duplicate rows ({}%)", count, pct),
        count,
        percentage: pct,
        samples: duplicates
            .iter()
            .take(ISSUE_SAMPLE_VALUES)
            .map(|r| format!("row {}", r + 1))
            .collect(),
    })
}

fn outliers(column: &Column) -> Option<QualityIssue> {
    let values = column.numeric_values();
    let summary = NumericSummary::from_values(column.name(), &values)?;
    let iqr = summary.iqr();
    if iqr <= 0.0 {
        return None;
    }
    let lower = summary.q25 - IQR_MULTIPLIER * iqr;
    let upper = summary.q75 + IQR_MULTIPLIER * iqr;

    let outside: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| *v < lower || *v > upper)
        .collect();
    if outside.is_empty() {
        return None;
    }

    let count = outside.len();
    let pct = percentage(count, values.len());
    let severity = if pct > OUTLIER_WARNING_PCT {
        Severity::Warning
    } else {
        Severity::Info
    };
    Some(QualityIssue {
        id: format!("{}:{}", IssueType::Outliers, column.name()),
        issue_type: IssueType::Outliers,
        column: Some(column.name().to_string()),
        severity,
        description: format!(
            "Column '{}' has {} outliers ({}%) outside [{}, {}]",
            column.name(),
            count,
            pct,
            round_to(lower, 2),
            round_to(upper, 2)
        ),
        count,
        percentage: pct,
        samples: outside
            .iter()
            .take(ISSUE_SAMPLE_VALUES)
            .map(|v| v.to_string())
            .collect(),
    })
}

fn inconsistent_categories(column: &Column) -> Option<QualityIssue> {
    let unique: Vec<&str> = {
        let mut seen = HashSet::new();
        column.present().filter(|v| seen.insert(*v)).collect()
    };
    if unique.len() <= 1 || unique.len() >= MAX_UNIQUE_FOR_CONSISTENCY {
        return None;
    }

    // normalized form -> spellings in first-seen order
    let mut groups: HashMap<String, Vec<&str>> = HashMap::new();
    let mut order = Vec::new();
    for &value in &unique {
        let key = value.trim().to_lowercase();
        let entry = groups.entry(key.clone()).or_default();
        if entry.is_empty() {
            order.push(key);
        }
        entry.push(value);
    }

    let variants: Vec<String> = order
        .iter()
        .filter_map(|k| groups.get(k))
        .filter(|spellings| spellings.len() > 1)
        .map(|spellings| {
            spellings
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(" / ")
        })
        .collect();
    if variants.is_empty() {
        return None;
    }

    let count = unique.len() - groups.len();
    Some(QualityIssue {
        id: format!("{}:{}", IssueType::InconsistentCategories, column.name()),
        issue_type: IssueType::InconsistentCategories,
        column: Some(column.name().to_string()),
        severity: Severity::Info,
        description: format!(
            "Column '{}' has {} redundant spellings differing only in case or whitespace",
            column.name(),
            count
        ),
        count,
        percentage: percentage(count, unique.len()),
        samples: variants.into_iter().take(ISSUE_SAMPLE_VALUES).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;

    fn load(csv: &str) -> Dataset {
        Dataset::from_bytes("t", csv.as_bytes(), &AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn test_clean_dataset_has_no_issues() {
        let ds = load("id,score\n1,10\n2,11\n3,12\n4,13\n");
        let report = QualityReport::detect(&ds);
        assert!(report.issues.is_empty());
        assert_eq!(report.summary.describe(), "No quality issues detected");
    }

    #[test]
    fn test_missing_value_severity() {
        let ds = load("a,b,c\n1,,x\n2,,\n3,,z\n4,5,w\n5,6,v\n");
        let report = QualityReport::detect(&ds);

        let b = report.issues.iter().find(|i| i.id == "missing_values:b").unwrap();
        assert_eq!(b.severity, Severity::Critical);
        assert_eq!(b.percentage, 60.0);

        let c = report.issues.iter().find(|i| i.id == "missing_values:c").unwrap();
        assert_eq!(c.severity, Severity::Info);

        assert_eq!(report.issues[0].severity, Severity::Critical);
        assert_eq!(report.summary.critical, 1);
    }

    #[test]
    fn test_duplicate_rows() {
        let ds = load("a,b\n1,x\n1,x\n2,y\n1,x\n");
        let report = QualityReport::detect(&ds);
        let dup = report
            .issues
            .iter()
            .find(|i| i.issue_type == IssueType::DuplicateRows)
            .unwrap();
        assert_eq!(dup.count, 2);
        assert_eq!(dup.severity, Severity::Warning);
        assert_eq!(dup.samples, vec!["row 2", "row 4"]);
        assert!(dup.column.is_none());
    }

    #[test]
    fn test_outliers() {
        let mut csv = String::from("v\n");
        for i in 0..40 {
            csv.push_str(&format!("{}\n", 10 + i % 5));
        }
        csv.push_str("1000\n");
        let report = QualityReport::detect(&load(&csv));
        let issue = report
            .issues
            .iter()
            .find(|i| i.issue_type == IssueType::Outliers)
            .unwrap();
        assert_eq!(issue.count, 1);
        assert_eq!(issue.severity, Severity::Info);
        assert_eq!(issue.samples, vec!["1000"]);
    }

    #[test]
    fn test_inconsistent_categories() {
        let ds = load("city\nParis\nparis\nLondon\n Paris\nLondon\nBerlin\n");
        let report = QualityReport::detect(&ds);
        let issue = report
            .issues
            .iter()
            .find(|i| i.issue_type == IssueType::InconsistentCategories)
            .unwrap();
        assert_eq!(issue.count, 2);
        assert_eq!(issue.samples, vec!["'Paris' / 'paris' / ' Paris'"]);
    }

    #[test]
    fn test_summary_describe_with_issues() {
        let summary = QualitySummary {
            total_issues: 3,
            critical: 1,
            warnings: 1,
            info: 1,
        };
        assert_eq!(summary.describe(), "3 issues found: 1 critical, 1 warnings");
    }
}
