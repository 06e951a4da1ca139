//! Tool input schemas and argument validation.
//!
//! An [`InputSchema`] declares the parameters a tool accepts. The registry
//! validates every invocation against it before the handler runs, so handlers
//! receive [`Arguments`] whose declared fields are known to be well typed.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::fmt;

use crate::tool::HandlerError;

/// JSON type expected for a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    /// JSON Schema type keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
            ParamType::Object => "object",
        }
    }

    /// Check whether a JSON value has this type
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Number => value.is_number(),
            ParamType::Integer => {
                value.is_i64()
                    || value.is_u64()
                    || value.as_f64().is_some_and(|n| n.is_finite() && n.fract() == 0.0)
            }
            ParamType::Boolean => value.is_boolean(),
            ParamType::Array => value.is_array(),
            ParamType::Object => value.is_object(),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declaration of a single parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub param_type: ParamType,
    pub required: bool,
    pub description: Option<String>,
}

impl ParamSpec {
    pub fn required(param_type: ParamType) -> Self {
        Self {
            param_type,
            required: true,
            description: None,
        }
    }

    pub fn optional(param_type: ParamType) -> Self {
        Self {
            param_type,
            required: false,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Why a set of arguments was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// The offending field (`arguments` when the payload itself is not an object)
    pub field: String,
    pub reason: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}': {}", self.field, self.reason)
    }
}

/// Ordered mapping from parameter name to its declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSchema {
    params: Vec<(String, ParamSpec)>,
}

impl InputSchema {
    /// Schema for a tool that takes no arguments
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a parameter. A later declaration with the same name replaces the earlier one.
    pub fn param(mut self, name: impl Into<String>, spec: ParamSpec) -> Self {
        let name = name.into();
        if let Some(slot) = self.params.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = spec;
        } else {
            self.params.push((name, spec));
        }
        self
    }

    /// Add a required parameter with a description
    pub fn required(
        self,
        name: impl Into<String>,
        param_type: ParamType,
        description: impl Into<String>,
    ) -> Self {
        self.param(
            name,
            ParamSpec::required(param_type).with_description(description),
        )
    }

    /// Add an optional parameter with a description
    pub fn optional(
        self,
        name: impl Into<String>,
        param_type: ParamType,
        description: impl Into<String>,
    ) -> Self {
        self.param(
            name,
            ParamSpec::optional(param_type).with_description(description),
        )
    }

    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, spec)| spec)
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &ParamSpec)> {
        self.params.iter().map(|(n, spec)| (n.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Render as a JSON Schema object for tool discovery
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for (name, spec) in &self.params {
            let mut property = Map::new();
            property.insert("type".to_string(), json!(spec.param_type.as_str()));
            if let Some(description) = &spec.description {
                property.insert("description".to_string(), json!(description));
            }
            properties.insert(name.clone(), Value::Object(property));

            if spec.required {
                required.push(json!(name));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Validate raw invocation arguments.
    ///
    /// `null` is treated as an empty object. Fields are checked in declaration
    /// order and the first violation is reported. Undeclared fields pass through.
    pub fn validate(&self, arguments: Value) -> Result<Arguments, SchemaViolation> {
        let map = match arguments {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            other => {
                return Err(SchemaViolation {
                    field: "arguments".to_string(),
                    reason: format!("expected an object, got {}", json_type_name(&other)),
                });
            }
        };

        for (name, spec) in &self.params {
            match map.get(name) {
                None | Some(Value::Null) if spec.required => {
                    return Err(SchemaViolation {
                        field: name.clone(),
                        reason: "missing required field".to_string(),
                    });
                }
                None | Some(Value::Null) => {}
                Some(value) if !spec.param_type.matches(value) => {
                    return Err(SchemaViolation {
                        field: name.clone(),
                        reason: format!(
                            "expected {}, got {}",
                            spec.param_type,
                            json_type_name(value)
                        ),
                    });
                }
                Some(_) => {}
            }
        }

        Ok(Arguments(map))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Arguments that passed schema validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Fetch a string field the schema declared as required
    pub fn require_str(&self, key: &str) -> Result<&str, HandlerError> {
        self.get_str(key)
            .ok_or_else(|| HandlerError::MissingArgument(key.to_string()))
    }

    /// Deserialize the arguments into a typed parameter struct
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| HandlerError::InvalidResponse(format!("argument decoding failed: {e}")))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}
