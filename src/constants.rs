//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// LLM provider defaults
pub mod llm {
    pub const DEFAULT_PROVIDER: &str = "openai";

    pub const DEFAULT_MODEL: &str = "gpt-4.1";

    pub const SUPPORTED_PROVIDERS: &[&str] = &["openai", "ollama"];

    /// Per-call timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    pub const DEFAULT_MAX_TOKENS: usize = 4096;
}

/// Dataset loading and descriptive evidence
pub mod analysis {
    /// Rows kept after loading; the remainder is dropped
    pub const MAX_ROWS: usize = 10_000;

    /// Non-null sample values per column
    pub const MAX_SAMPLE_VALUES: usize = 5;

    /// Columns described individually in prompts
    pub const MAX_PROMPT_COLUMNS: usize = 20;

    /// Number of most frequent values reported for categorical columns
    pub const TOP_VALUES: usize = 5;

    /// |skewness| below this is reported as a normal distribution
    pub const SKEW_NORMAL_THRESHOLD: f64 = 0.5;

    /// Cell values treated as missing (compared case-insensitively)
    pub const MISSING_MARKERS: &[&str] = &["", "na", "n/a", "nan", "null", "none"];
}

/// Data quality issue thresholds (percentages)
pub mod quality {
    pub const MISSING_CRITICAL_PCT: f64 = 50.0;

    pub const MISSING_WARNING_PCT: f64 = 20.0;

    pub const DUPLICATE_WARNING_PCT: f64 = 5.0;

    pub const OUTLIER_WARNING_PCT: f64 = 10.0;

    /// IQR multiplier for outlier fences
    pub const IQR_MULTIPLIER: f64 = 1.5;

    /// Inconsistent-category check only runs below this many unique values
    pub const MAX_UNIQUE_FOR_CONSISTENCY: usize = 100;

    /// Affected-row samples passed to the model per issue
    pub const ISSUE_SAMPLE_VALUES: usize = 5;
}

/// ML advisor prompt shaping
pub mod advisor {
    /// Columns listed in the key-columns digest
    pub const KEY_COLUMNS: usize = 10;

    /// Columns listed in the feature-planning summary
    pub const SUMMARY_COLUMNS: usize = 15;

    /// Columns with fewer unique values are flagged as low cardinality
    pub const LOW_CARDINALITY: usize = 20;

    /// Null percentage above which a column is flagged
    pub const NULL_FLAG_PCT: f64 = 5.0;
}

/// Truncation limits applied when threading outputs into later prompts
pub mod threading {
    pub const DEPLOYMENT_SUMMARY_PART: usize = 100;

    pub const PRD_FEATURE_PLAN: usize = 500;

    pub const PRD_SETUP: usize = 300;

    pub const PRD_SERVING: usize = 200;

    pub const PRD_EXECUTIVE: usize = 400;

    pub const PRD_RISKS: usize = 300;

    pub const PRD_BUDGET: usize = 200;
}

/// Report and document output
pub mod report {
    pub const PRD_FILE_NAME: &str = "ML_Product_Requirements_Document.md";

    pub const PRD_TITLE: &str = "ML Product Requirements Document";
}

/// Session cache
pub mod session {
    /// Bumped when the cached JSON layout changes
    pub const CACHE_VERSION: u32 = 1;
}
