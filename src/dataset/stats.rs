//! Descriptive facts handed to the model as evidence.
//!
//! These are plain summaries of the loaded data (counts, quantiles, top
//! values). Interpretation is left to the agents' model calls.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Dataset;
use super::column::{Column, ColumnKind};
use crate::constants::analysis::{SKEW_NORMAL_THRESHOLD, TOP_VALUES};

/// Dataset-level totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub name: String,
    pub total_rows: usize,
    pub total_columns: usize,
    /// Rows in the file before the row limit was applied
    pub original_rows: usize,
    pub memory_usage_mb: f64,
    pub encoding: String,
}

impl DatasetSummary {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            name: dataset.name().to_string(),
            total_rows: dataset.row_count(),
            total_columns: dataset.column_count(),
            original_rows: dataset.original_row_count(),
            memory_usage_mb: round_to(dataset.approx_bytes() as f64 / (1024.0 * 1024.0), 2),
            encoding: dataset.encoding().to_string(),
        }
    }

    /// "name: R rows x C columns" with a note when rows were dropped
    pub fn describe(&self) -> String {
        let mut text = format!(
            "{}: {} rows x {} columns (~{} MB)",
            self.name, self.total_rows, self.total_columns, self.memory_usage_mb
        );
        if self.original_rows > self.total_rows {
            text.push_str(&format!(
                ", first {} of {} rows analyzed",
                self.total_rows, self.original_rows
            ));
        }
        text
    }
}

/// Per-column structural facts for schema interpretation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFacts {
    pub name: String,
    pub kind: ColumnKind,
    pub null_count: usize,
    pub null_percentage: f64,
    pub unique_count: usize,
    /// First non-null values, or a single "All null values" marker
    pub sample_values: Vec<String>,
}

impl ColumnFacts {
    pub fn from_column(column: &Column, max_samples: usize) -> Self {
        let total = column.len();
        let null_count = column.null_count();
        let samples = column.samples(max_samples);
        Self {
            name: column.name().to_string(),
            kind: column.kind(),
            null_count,
            null_percentage: percentage(null_count, total),
            unique_count: column.unique_count(),
            sample_values: if samples.is_empty() {
                vec!["All null values".to_string()]
            } else {
                samples
            },
        }
    }
}

/// Coarse shape label derived from skewness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionShape {
    Normal,
    RightSkewed,
    LeftSkewed,
}

impl DistributionShape {
    pub fn from_skewness(skew: f64) -> Self {
        if skew.abs() < SKEW_NORMAL_THRESHOLD {
            Self::Normal
        } else if skew > SKEW_NORMAL_THRESHOLD {
            Self::RightSkewed
        } else {
            Self::LeftSkewed
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "normal distribution",
            Self::RightSkewed => "right skewed",
            Self::LeftSkewed => "left skewed",
        }
    }
}

/// Distribution summary of a numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1)
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub q25: f64,
    pub q75: f64,
    pub skewness: f64,
    pub shape: DistributionShape,
}

impl NumericSummary {
    /// `None` when the column has no numeric values
    pub fn from_values(column: &str, values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len() as f64;
        let sum = sorted.iter().sum::<f64>();
        let mean = if sum.is_finite() {
            sum / n
        } else {
            sorted.iter().map(|v| v / n).sum::<f64>()
        };
        let moments = Moments::new(&sorted, mean);
        let skewness = moments.skewness();

        Some(Self {
            column: column.to_string(),
            count: sorted.len(),
            mean,
            median: quantile(&sorted, 0.5),
            std: moments.std(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            q25: quantile(&sorted, 0.25),
            q75: quantile(&sorted, 0.75),
            skewness,
            shape: DistributionShape::from_skewness(skewness),
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q75 - self.q25
    }
}

/// Linear-interpolated quantile of already sorted data
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        len => {
            let pos = q.clamp(0.0, 1.0) * (len - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            let frac = pos - lower as f64;
            let span = sorted[upper] - sorted[lower];
            if span.is_finite() {
                sorted[lower] + span * frac
            } else {
                sorted[lower] * (1.0 - frac) + sorted[upper] * frac
            }
        }
    }
}

/// Central moments of deviations divided by their largest magnitude, so
/// squares and cubes of large values stay finite
struct Moments {
    n: f64,
    scale: f64,
    m2: f64,
    m3: f64,
}

impl Moments {
    fn new(values: &[f64], mean: f64) -> Self {
        let n = values.len() as f64;
        let scale = values
            .iter()
            .map(|v| (v - mean).abs())
            .fold(0.0, f64::max);
        if scale == 0.0 || !scale.is_finite() {
            return Self {
                n,
                scale: 0.0,
                m2: 0.0,
                m3: 0.0,
            };
        }
        let deviations = values.iter().map(|v| (v - mean) / scale);
        let (m2, m3) = deviations.fold((0.0, 0.0), |(m2, m3), d| (m2 + d * d, m3 + d * d * d));
        Self {
            n,
            scale,
            m2: m2 / n,
            m3: m3 / n,
        }
    }

    /// Sample standard deviation (n - 1)
    fn std(&self) -> f64 {
        if self.n < 2.0 {
            return 0.0;
        }
        let std = self.scale * (self.m2 * self.n / (self.n - 1.0)).sqrt();
        if std.is_finite() { std } else { f64::MAX }
    }

    /// Adjusted Fisher-Pearson sample skewness; 0 when undefined
    fn skewness(&self) -> f64 {
        if self.n < 3.0 || self.m2 <= f64::EPSILON {
            return 0.0;
        }
        let g1 = self.m3 / self.m2.powf(1.5);
        let skew = g1 * (self.n * (self.n - 1.0)).sqrt() / (self.n - 2.0);
        if skew.is_finite() { skew } else { 0.0 }
    }
}

/// Frequency summary of a categorical column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub column: String,
    pub cardinality: usize,
    pub total_count: usize,
    pub top_value: Option<String>,
    pub top_frequency: usize,
    /// Most frequent values, ties broken by first appearance
    pub top_values: Vec<(String, usize)>,
}

impl CategoricalSummary {
    pub fn from_column(column: &Column) -> Self {
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        let mut total = 0;
        for (order, value) in column.present().enumerate() {
            total += 1;
            counts.entry(value).or_insert((0, order)).0 += 1;
        }

        let mut ranked: Vec<(&str, usize, usize)> =
            counts.into_iter().map(|(v, (c, o))| (v, c, o)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        let cardinality = ranked.len();
        let top_values: Vec<(String, usize)> = ranked
            .into_iter()
            .take(TOP_VALUES)
            .map(|(v, c, _)| (v.to_string(), c))
            .collect();

        Self {
            column: column.name().to_string(),
            cardinality,
            total_count: total,
            top_value: top_values.first().map(|(v, _)| v.clone()),
            top_frequency: top_values.first().map_or(0, |(_, c)| *c),
            top_values,
        }
    }
}

/// Percentage rounded to two decimals; 0 for an empty total
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(count as f64 * 100.0 / total as f64, 2)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
