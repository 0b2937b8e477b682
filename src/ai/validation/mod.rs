//! LLM Response Validation
//!
//! Turns raw model text into a JSON value. Field-level checks against an
//! agent's declared outputs live with the signatures.

mod json_repair;

pub use json_repair::{JsonRepairer, extract_json_from_response};
