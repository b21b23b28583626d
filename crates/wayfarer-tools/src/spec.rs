//! Spec - Tool parameter schemas
//!
//! A `ToolSpec` is what the LLM is shown when asked which tool to call next,
//! and what arguments are checked against before anything leaves the process.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// JSON string
    String,
    /// JSON number
    Number,
    /// JSON boolean
    Boolean,
}

impl ParamType {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

/// One parameter of a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub param_type: ParamType,
    /// Whether the parameter must be present
    pub required: bool,
    /// Description for LLM consumption
    pub description: String,
}

impl ParamSpec {
    /// Required parameter
    #[must_use]
    pub fn required(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            required: true,
            description: description.to_string(),
        }
    }

    /// Optional parameter
    #[must_use]
    pub fn optional(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }
}

/// Tool metadata and schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique tool name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Parameters in declaration order
    pub parameters: Vec<ParamSpec>,
}

impl ToolSpec {
    /// Create a new tool spec
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Add a parameter
    #[must_use]
    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.parameters.push(param);
        self
    }

    /// Look up a parameter by name
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Normalize and check `arguments` against this spec.
    ///
    /// Numbers and booleans given for string parameters are converted to
    /// strings. Empty strings count as missing for required parameters.
    /// Unknown keys are dropped. Returns the normalized argument object.
    pub fn validate(&self, arguments: &Value) -> Result<Value> {
        let object = arguments.as_object().ok_or_else(|| {
            Error::invalid(&self.name, "arguments must be a JSON object")
        })?;

        let mut normalized = serde_json::Map::new();

        for param in &self.parameters {
            let value = match object.get(&param.name) {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) if s.trim().is_empty() => None,
                Some(v) => Some(coerce(param.param_type, v)),
            };

            match value {
                None if param.required => {
                    return Err(Error::invalid(
                        &self.name,
                        format!("missing required field `{}`", param.name),
                    ));
                }
                None => {}
                Some(v) if !param.param_type.matches(&v) => {
                    return Err(Error::invalid(
                        &self.name,
                        format!(
                            "field `{}` must be a {}",
                            param.name,
                            param.param_type.as_str()
                        ),
                    ));
                }
                Some(v) => {
                    normalized.insert(param.name.clone(), v);
                }
            }
        }

        Ok(Value::Object(normalized))
    }

    /// One menu entry for a decision prompt
    #[must_use]
    pub fn describe(&self) -> String {
        let params = self
            .parameters
            .iter()
            .map(|p| {
                format!(
                    "{} ({}{}): {}",
                    p.name,
                    p.param_type.as_str(),
                    if p.required { ", required" } else { "" },
                    p.description
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("**{}**: {}\n  参数: {}", self.name, self.description, params)
    }
}

fn coerce(param_type: ParamType, value: &Value) -> Value {
    match (param_type, value) {
        (ParamType::String, Value::Number(n)) => Value::String(n.to_string()),
        (ParamType::String, Value::Bool(b)) => Value::String(b.to_string()),
        (ParamType::String, Value::String(s)) => Value::String(s.trim().to_string()),
        _ => value.clone(),
    }
}
