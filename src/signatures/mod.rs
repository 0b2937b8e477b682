//! Agent Signatures
//!
//! A signature declares what one agent sends to the model and what it must
//! get back. The same declaration drives three things:
//!
//! - the prompt (`render_prompt`), with inputs in declared order
//! - the JSON Schema passed to the provider (`json_schema`)
//! - validation of the response (`parse_output`)
//!
//! Every response carries a free-text `reasoning` field ahead of the declared
//! outputs. It is returned separately and is never a declared output.

pub mod catalog;

pub use catalog::{
    BUSINESS_COMMUNICATION, DEPLOYMENT_PLANNER, ML_USE_CASE_ADVISOR, PRD_GENERATOR,
    QUALITY_RECOMMENDER, SCHEMA_INTERPRETER, STATISTICAL_INSIGHTS,
};

use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::ai::PromptBuilder;
use crate::types::{ErrorCategory, PlanError, Result};

/// Name of the reasoning field requested before the declared outputs
pub const REASONING_FIELD: &str = "reasoning";

/// Expected shape of one output field
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Free text; scalars are coerced, lists of scalars become bullets
    Text,
    /// Whole number within an inclusive range
    Integer { min: i64, max: i64 },
    /// One of a fixed set of values, matched case-insensitively
    Choice(&'static [&'static str]),
    /// List of objects, each validated against the nested fields
    Records(&'static [OutputField]),
}

#[derive(Debug, Clone, Copy)]
pub struct InputField {
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct OutputField {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: FieldKind,
}

/// Declarative input/output contract of one agent
#[derive(Debug)]
pub struct Signature {
    pub name: &'static str,
    /// Role line: "You are an expert {expertise} specializing in {task}."
    pub expertise: &'static str,
    pub task: &'static str,
    pub instructions: &'static str,
    pub inputs: &'static [InputField],
    pub outputs: &'static [OutputField],
}

/// Validated model output: declared fields plus the separate reasoning text
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedOutput {
    pub fields: BTreeMap<String, Value>,
    pub reasoning: String,
}

impl Signature {
    pub fn output_names(&self) -> impl Iterator<Item = &'static str> {
        self.outputs.iter().map(|f| f.name)
    }

    /// JSON Schema for the response object. `title` is the signature name.
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        properties.insert(
            REASONING_FIELD.to_string(),
            json!({
                "type": "string",
                "description": "Step-by-step reasoning over the inputs, written before the answer"
            }),
        );
        let mut required = vec![Value::from(REASONING_FIELD)];
        for field in self.outputs {
            properties.insert(field.name.to_string(), field_schema(field));
            required.push(Value::from(field.name));
        }

        json!({
            "title": self.name,
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false
        })
    }

    /// Render the prompt. `inputs` must name exactly the declared inputs;
    /// they are emitted in declared order regardless of argument order.
    pub fn render_prompt(&self, inputs: &[(&str, String)]) -> Result<String> {
        let declared: HashSet<&str> = self.inputs.iter().map(|f| f.name).collect();
        if let Some((extra, _)) = inputs.iter().find(|(n, _)| !declared.contains(n)) {
            return Err(PlanError::generation(
                self.name,
                format!("undeclared input '{}'", extra),
            ));
        }

        let mut builder = PromptBuilder::new()
            .role(self.expertise, self.task)
            .instructions(self.instructions);

        for field in self.inputs {
            let value = inputs
                .iter()
                .find(|(n, _)| *n == field.name)
                .map(|(_, v)| v.as_str())
                .ok_or_else(|| {
                    PlanError::generation(self.name, format!("missing input '{}'", field.name))
                })?;
            builder = builder.input(field.name, value);
        }

        let mut outputs = vec![(
            REASONING_FIELD,
            "Think step by step about the inputs first; this field comes before all others",
        )];
        outputs.extend(self.outputs.iter().map(|f| (f.name, f.description)));

        Ok(builder
            .outputs(outputs)
            .focus(
                "the inputs above",
                &[
                    "Base every statement on the provided inputs; do not invent columns or figures",
                    "Populate every output field; use an empty list or 'None' when nothing applies",
                ],
            )
            .build())
    }

    /// Validate a response object against the declared outputs.
    ///
    /// Every declared field must be present with the declared kind. Fields
    /// that are not declared are dropped.
    pub fn parse_output(&self, content: &Value) -> Result<ParsedOutput> {
        let object = content
            .as_object()
            .ok_or_else(|| parse_error(format!("expected a JSON object, got {}", kind_of(content))))?;

        let reasoning = match object.get(REASONING_FIELD) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => coerce_text(other).unwrap_or_default(),
            None => String::new(),
        };

        let mut fields = BTreeMap::new();
        for field in self.outputs {
            let raw = object
                .get(field.name)
                .filter(|v| !v.is_null())
                .ok_or_else(|| parse_error(format!("missing output field '{}'", field.name)))?;
            let value = coerce(field, raw).map_err(|msg| parse_error(format!("{}: {}", field.name, msg)))?;
            fields.insert(field.name.to_string(), value);
        }

        let extras: Vec<&str> = object
            .keys()
            .map(String::as_str)
            .filter(|k| *k != REASONING_FIELD && !self.outputs.iter().any(|f| f.name == *k))
            .collect();
        if !extras.is_empty() {
            debug!("{}: dropping undeclared fields {:?}", self.name, extras);
        }

        Ok(ParsedOutput { fields, reasoning })
    }
}

fn parse_error(message: String) -> PlanError {
    PlanError::llm_with_category(ErrorCategory::ParseError, message)
}

fn field_schema(field: &OutputField) -> Value {
    let mut schema = match field.kind {
        FieldKind::Text => json!({ "type": "string" }),
        FieldKind::Integer { min, max } => {
            json!({ "type": "integer", "minimum": min, "maximum": max })
        }
        FieldKind::Choice(options) => json!({ "type": "string", "enum": options }),
        FieldKind::Records(nested) => {
            let properties: Map<String, Value> = nested
                .iter()
                .map(|f| (f.name.to_string(), field_schema(f)))
                .collect();
            let required: Vec<&str> = nested.iter().map(|f| f.name).collect();
            json!({
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                    "additionalProperties": false
                }
            })
        }
    };
    schema["description"] = Value::from(field.description);
    schema
}

fn coerce(field: &OutputField, raw: &Value) -> std::result::Result<Value, String> {
    match field.kind {
        FieldKind::Text => coerce_text(raw)
            .map(Value::String)
            .ok_or_else(|| format!("expected text, got {}", kind_of(raw))),
        FieldKind::Integer { min, max } => {
            let n = match raw {
                Value::Number(n) => n
                    .as_i64()
                    .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            }
            .ok_or_else(|| format!("expected an integer, got {}", raw))?;
            if !(min..=max).contains(&n) {
                return Err(format!("{} is outside {}..={}", n, min, max));
            }
            Ok(Value::from(n))
        }
        FieldKind::Choice(options) => {
            let text = raw
                .as_str()
                .ok_or_else(|| format!("expected one of {:?}, got {}", options, raw))?;
            options
                .iter()
                .find(|o| o.eq_ignore_ascii_case(text.trim()))
                .map(|o| Value::from(*o))
                .ok_or_else(|| format!("'{}' is not one of {:?}", text, options))
        }
        FieldKind::Records(nested) => {
            let items = raw
                .as_array()
                .ok_or_else(|| format!("expected a list, got {}", kind_of(raw)))?;
            items
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    let object = item
                        .as_object()
                        .ok_or_else(|| format!("item {} is not an object", idx))?;
                    let mut record = Map::new();
                    for sub in nested {
                        let value = object
                            .get(sub.name)
                            .filter(|v| !v.is_null())
                            .ok_or_else(|| format!("item {} is missing '{}'", idx, sub.name))?;
                        let value =
                            coerce(sub, value).map_err(|m| format!("item {}: {}: {}", idx, sub.name, m))?;
                        record.insert(sub.name.to_string(), value);
                    }
                    Ok(Value::Object(record))
                })
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Value::Array)
        }
    }
}

fn coerce_text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Array(_) | Value::Object(_) | Value::Null => None,
                scalar => coerce_text(scalar).map(|s| format!("- {}", s)),
            })
            .collect::<Option<Vec<_>>>()
            .map(|lines| lines.join("\n")),
        Value::Object(_) | Value::Null => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
