//! The seven agent signatures.

use super::{FieldKind, InputField, OutputField, Signature};

pub const BUSINESS_TYPES: &[&str] = &[
    "Identifier",
    "Categorical",
    "Numeric Metric",
    "Date/Time",
    "Text",
    "Boolean",
];

pub const CONFIDENCE_LEVELS: &[&str] = &["high", "medium", "low"];

pub const COLUMN_RECOMMENDATIONS: &[&str] = &["Keep", "Review", "Consider dropping"];

pub const USE_CASES: &[&str] = &[
    "classification",
    "regression",
    "clustering",
    "time_series",
    "anomaly_detection",
    "none",
];

const fn text(name: &'static str, description: &'static str) -> OutputField {
    OutputField {
        name,
        description,
        kind: FieldKind::Text,
    }
}

const fn input(name: &'static str, description: &'static str) -> InputField {
    InputField { name, description }
}

// -----------------------------------------------------------------------------
// Schema
// -----------------------------------------------------------------------------

const COLUMN_INTERPRETATION: &[OutputField] = &[
    text("column_name", "Exact column name from the input"),
    OutputField {
        name: "business_type",
        description: "Business meaning of the column",
        kind: FieldKind::Choice(BUSINESS_TYPES),
    },
    OutputField {
        name: "confidence",
        description: "Confidence in the classification",
        kind: FieldKind::Choice(CONFIDENCE_LEVELS),
    },
    text("rationale", "One sentence explaining the classification"),
    OutputField {
        name: "recommendation",
        description: "Whether to keep the column for modeling",
        kind: FieldKind::Choice(COLUMN_RECOMMENDATIONS),
    },
];

pub static SCHEMA_INTERPRETER: Signature = Signature {
    name: "SchemaInterpreter",
    expertise: "data analyst",
    task: "interpreting the business meaning of dataset columns",
    instructions: "For every column listed in column_facts, infer its business type from the \
storage type, null rate, unique count and sample values. Identifiers usually have one unique \
value per row; low-cardinality text is categorical; measured quantities are numeric metrics. \
Return exactly one entry per listed column, in the listed order, using the exact column name.",
    inputs: &[
        input("dataset_summary", "Row count, column count and approximate memory use"),
        input(
            "column_facts",
            "Per column: storage type, null count and percentage, unique count, sample values",
        ),
    ],
    outputs: &[OutputField {
        name: "columns",
        description: "One interpretation per column",
        kind: FieldKind::Records(COLUMN_INTERPRETATION),
    }],
};

// -----------------------------------------------------------------------------
// Profile
// -----------------------------------------------------------------------------

const COLUMN_INSIGHT: &[OutputField] = &[
    text("column_name", "Exact column name from the input"),
    text(
        "pattern_detected",
        "Numeric: normal, right skewed, left skewed, bimodal or uniform. \
Categorical: high cardinality, low cardinality, binary or dominant category",
    ),
    text("insight", "One sentence on what the statistics reveal for the business"),
    text(
        "actionable_suggestion",
        "Concrete next step for an analyst, e.g. investigate outliers or group rare categories",
    ),
];

pub static STATISTICAL_INSIGHTS: Signature = Signature {
    name: "StatisticalInsightGenerator",
    expertise: "statistician",
    task: "turning descriptive statistics into business insight",
    instructions: "Interpret the statistics of each profiled column. Name the distribution \
pattern, state what it means for the business, and suggest one concrete action. Return one \
insight per numeric column in numeric_insights and one per categorical column in \
categorical_insights, then a short overall observation about the dataset.",
    inputs: &[
        input(
            "numeric_profiles",
            "Per numeric column: count, mean, median, std, min, max, quartiles, skewness, shape",
        ),
        input(
            "categorical_profiles",
            "Per categorical column: cardinality, non-null count, top values with frequencies",
        ),
    ],
    outputs: &[
        OutputField {
            name: "numeric_insights",
            description: "One entry per numeric column",
            kind: FieldKind::Records(COLUMN_INSIGHT),
        },
        OutputField {
            name: "categorical_insights",
            description: "One entry per categorical column",
            kind: FieldKind::Records(COLUMN_INSIGHT),
        },
        text("overall_observation", "Two or three sentences about the dataset as a whole"),
    ],
};

// -----------------------------------------------------------------------------
// Quality
// -----------------------------------------------------------------------------

const ISSUE_RECOMMENDATION: &[OutputField] = &[
    text("issue_id", "Id of the issue being addressed, exactly as given"),
    text(
        "recommended_action",
        "Specific fix, e.g. impute with median, drop duplicates, cap outliers",
    ),
    text("code_snippet", "pandas code applying the fix"),
    text("impact_description", "What changes in the data after the fix"),
];

pub static QUALITY_RECOMMENDER: Signature = Signature {
    name: "QualityRecommender",
    expertise: "data engineer",
    task: "data cleaning and data quality remediation",
    instructions: "For each detected issue, recommend one fix with a pandas snippet and \
describe its impact. Use the issue ids exactly as given. When no issues were detected return \
an empty recommendations list and say so in the overall assessment.",
    inputs: &[
        input("dataset_summary", "Row count, column count and approximate memory use"),
        input(
            "detected_issues",
            "Issues with id, type, column, severity, count, percentage and sample values",
        ),
    ],
    outputs: &[
        OutputField {
            name: "recommendations",
            description: "One recommendation per detected issue",
            kind: FieldKind::Records(ISSUE_RECOMMENDATION),
        },
        text(
            "overall_assessment",
            "Two sentences on whether the data is usable for modeling as it stands",
        ),
    ],
};

// -----------------------------------------------------------------------------
// ML advisor
// -----------------------------------------------------------------------------

pub static ML_USE_CASE_ADVISOR: Signature = Signature {
    name: "MlUseCaseAdvisor",
    expertise: "machine learning engineer",
    task: "framing ML problems and planning feature engineering",
    instructions: "Decide the primary ML use case this dataset supports and the column that \
should be predicted. A numeric metric that depends on other columns suggests regression; a \
categorical or boolean outcome suggests classification; no plausible target suggests \
clustering or none. Score readiness from 0 to 100 considering size, quality and signal. Then \
write the feature engineering plan and training guidance following planning_instructions.",
    inputs: &[
        input("dataset_overview", "Row count, column count and column type mix"),
        input("key_columns", "Important columns with business type, null rate and cardinality"),
        input("quality_issues", "Summary of detected data quality problems"),
        input("column_summary", "Columns with type, cardinality and null notes"),
        input(
            "planning_instructions",
            "Required plan structure and use-case specific focus areas",
        ),
    ],
    outputs: &[
        OutputField {
            name: "detected_use_case",
            description: "Primary ML use case",
            kind: FieldKind::Choice(USE_CASES),
        },
        text("target_variable", "Exact name of the recommended target column, or 'None'"),
        text("target_reasoning", "Two sentences on why this target makes sense"),
        OutputField {
            name: "suitability_score",
            description: "ML readiness score from 0 to 100",
            kind: FieldKind::Integer { min: 0, max: 100 },
        },
        text("alternative_use_case", "Alternative ML approach, or 'None'"),
        text(
            "feature_plan",
            "Markdown feature engineering plan with transformations per column",
        ),
        text(
            "training_recommendations",
            "Model choices, validation strategy and tuning hints in three or four sentences",
        ),
        text("mlflow_setup", "Experiment tracking recommendations in two or three sentences"),
    ],
};

// -----------------------------------------------------------------------------
// Deployment
// -----------------------------------------------------------------------------

pub static DEPLOYMENT_PLANNER: Signature = Signature {
    name: "DatabricksDeploymentPlanner",
    expertise: "MLOps architect",
    task: "taking ML models to production on Databricks",
    instructions: "Write an end-to-end deployment strategy for the use case, covering \
infrastructure, people and timeline, governance and operations. Every field is markdown with \
## headers and bullet points. Use concrete numbers for durations, headcount and costs, and \
tie each section back to the dataset and use case given.",
    inputs: &[
        input("ml_use_case", "Use case, target variable and readiness score"),
        input("feature_plan", "Feature engineering strategy"),
        input("training_plan", "Model training recommendations"),
        input("data_summary", "Dataset size and quality summary"),
    ],
    outputs: &[
        text(
            "databricks_setup",
            "Unity Catalog layout, cluster configuration and MLflow experiment setup",
        ),
        text(
            "serving_strategy",
            "Serving endpoint configuration, API design, versioning and scaling",
        ),
        text(
            "monitoring_plan",
            "Drift detection, performance tracking, alerting and dashboards",
        ),
        text(
            "data_strategy",
            "Pipeline architecture, refresh frequency, retention and backups",
        ),
        text(
            "team_requirements",
            "Roles, FTE estimates, skills and ramp-up timeline",
        ),
        text(
            "implementation_roadmap",
            "Phases in weeks (POC, development, UAT, production) with milestones",
        ),
        text(
            "risk_mitigation",
            "Technical, organizational and data risks with mitigations and owners",
        ),
        text(
            "cost_estimation",
            "Compute, storage and serving costs with monthly estimates and optimizations",
        ),
        text(
            "governance_framework",
            "Permissions, model approval workflow, access controls and compliance",
        ),
        text(
            "success_metrics",
            "Business KPIs, model metrics, operational SLAs and reporting cadence",
        ),
        text(
            "business_impact",
            "ROI estimate, value drivers, efficiency gains and stakeholder plan",
        ),
        text(
            "testing_framework",
            "Unit, integration, model validation and data tests plus CI/CD",
        ),
        text(
            "operational_playbook",
            "Incident response, degradation handling, pipeline recovery and rollback",
        ),
        text(
            "enablement_plan",
            "Documentation, stakeholder training, runbooks and knowledge transfer",
        ),
        text(
            "future_enhancements",
            "Feature store, A/B testing, AutoML and advanced monitoring roadmap",
        ),
    ],
};

// -----------------------------------------------------------------------------
// Business communication
// -----------------------------------------------------------------------------

pub static BUSINESS_COMMUNICATION: Signature = Signature {
    name: "BusinessCommunicationGenerator",
    expertise: "product strategist",
    task: "explaining ML initiatives to executives and stakeholders",
    instructions: "Translate the technical plan into material a non-technical audience can \
act on. Use plain language, markdown headers and bullets, and concrete figures from the \
inputs.",
    inputs: &[
        input("ml_use_case", "Use case, target variable and readiness score"),
        input("deployment_summary", "Team size, timeline and cost highlights"),
        input("technical_risks", "Technical and organizational risks"),
        input("success_metrics", "Business KPIs and model performance metrics"),
    ],
    outputs: &[
        text(
            "executive_summary",
            "One page covering problem, solution, value, investment and timeline",
        ),
        text(
            "risk_matrix",
            "Markdown table rating each risk by impact and likelihood (High/Medium/Low)",
        ),
        text(
            "timeline_visual",
            "Mermaid gantt chart with POC, Development, UAT and Production phases",
        ),
        text(
            "budget_justification",
            "Cost breakdown against expected returns with payback period",
        ),
        text(
            "stakeholder_talking_points",
            "Key messages for executives, technical teams, finance and operations",
        ),
    ],
};

// -----------------------------------------------------------------------------
// PRD
// -----------------------------------------------------------------------------

pub static PRD_GENERATOR: Signature = Signature {
    name: "PrdGenerator",
    expertise: "ML product manager",
    task: "writing product requirements documents for ML products",
    instructions: "Write a production-ready PRD in markdown for the ML product described by \
the inputs. Start with a title block (project, owner TBD, status Draft) and use these \
numbered sections: 1 Executive Summary, 2 Problem Statement, 3 Goals & Success Metrics (with \
a metrics table of owner, baseline, target and timeline), 4 User Personas & Journeys, \
5 Functional Requirements (prioritized P0/P1/P2 user stories with acceptance criteria, then \
non-functional requirements), 6 Technical Architecture, 7 ML-Specific Considerations, \
8 Risk Assessment, 9 Implementation Roadmap, 10 Operating Model, 11 Go-to-Market, \
12 Compliance & Legal, 13 Budget & Resources, 14 Dependencies & Assumptions, 15 Out of Scope, \
16 Open Questions, 17 Appendix. Be specific to this use case and dataset, reuse the figures \
given in the inputs, and mark genuinely unknown values as TBD instead of inventing them.",
    inputs: &[
        input("ml_use_case", "Use case, target variable and suitability"),
        input("feature_engineering", "Feature engineering plan and training strategy"),
        input("deployment_strategy", "Infrastructure, serving and timeline highlights"),
        input("business_summary", "Executive summary, risks and budget"),
        input("quality_issues", "Data quality summary and open issues"),
    ],
    outputs: &[text("prd_document", "The complete PRD in markdown")],
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn all() -> [&'static Signature; 7] {
        [
            &SCHEMA_INTERPRETER,
            &STATISTICAL_INSIGHTS,
            &QUALITY_RECOMMENDER,
            &ML_USE_CASE_ADVISOR,
            &DEPLOYMENT_PLANNER,
            &BUSINESS_COMMUNICATION,
            &PRD_GENERATOR,
        ]
    }

    #[test]
    fn test_names_unique() {
        let names: HashSet<&str> = all().iter().map(|s| s.name).collect();
        assert_eq!(names.len(), 7);
    }

    #[test]
    fn test_no_signature_declares_reasoning() {
        for sig in all() {
            assert!(sig.output_names().all(|n| n != crate::signatures::REASONING_FIELD));
            let inputs: HashSet<&str> = sig.inputs.iter().map(|f| f.name).collect();
            assert_eq!(inputs.len(), sig.inputs.len(), "{} repeats an input", sig.name);
        }
    }

    #[test]
    fn test_output_counts() {
        assert_eq!(DEPLOYMENT_PLANNER.outputs.len(), 15);
        assert_eq!(BUSINESS_COMMUNICATION.outputs.len(), 5);
        assert_eq!(ML_USE_CASE_ADVISOR.outputs.len(), 8);
        assert_eq!(PRD_GENERATOR.outputs.len(), 1);
    }
}
