//! Shape description types

use serde_json::{json, Map, Value};

/// Expected structure of a JSON value
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Accepts any value unchanged
    #[allow(dead_code)] // Used by workflows that pass values through unchecked
    Any,
    String,
    /// Number with optional inclusive bounds
    Number {
        min: Option<f64>,
        max: Option<f64>,
    },
    #[allow(dead_code)] // No weather payload carries a boolean yet
    Boolean,
    /// Object with declared fields; undeclared keys are stripped on validation
    Object { fields: Vec<Field> },
    /// Homogeneous array
    Array { items: Box<Shape> },
}

/// A named member of an object shape
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub shape: Shape,
    pub required: bool,
    pub description: Option<String>,
}

impl Field {
    pub fn required(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            required: true,
            description: None,
        }
    }

    #[allow(dead_code)] // Every weather field is required
    pub fn optional(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            required: false,
            description: None,
        }
    }

    /// Attach a human-readable description (surfaced in JSON Schema)
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Shape {
    pub fn string() -> Self {
        Shape::String
    }

    pub fn number() -> Self {
        Shape::Number {
            min: None,
            max: None,
        }
    }

    /// Number constrained to `[min, max]`
    pub fn number_in(min: f64, max: f64) -> Self {
        Shape::Number {
            min: Some(min),
            max: Some(max),
        }
    }

    #[allow(dead_code)] // No weather payload carries a boolean yet
    pub fn boolean() -> Self {
        Shape::Boolean
    }

    pub fn object(fields: Vec<Field>) -> Self {
        Shape::Object { fields }
    }

    pub fn array(items: Shape) -> Self {
        Shape::Array {
            items: Box::new(items),
        }
    }

    /// Short kind name used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Any => "any",
            Shape::String => "string",
            Shape::Number { .. } => "number",
            Shape::Boolean => "boolean",
            Shape::Object { .. } => "object",
            Shape::Array { .. } => "array",
        }
    }

    /// Describe what this shape expects, including bounds
    pub fn expectation(&self) -> String {
        match self {
            Shape::Number {
                min: Some(min),
                max: Some(max),
            } => format!("number in [{min}, {max}]"),
            Shape::Number {
                min: Some(min),
                max: None,
            } => format!("number >= {min}"),
            Shape::Number {
                min: None,
                max: Some(max),
            } => format!("number <= {max}"),
            other => other.kind_name().to_string(),
        }
    }

    /// Render as a JSON Schema document (the format tool definitions use)
    pub fn to_json_schema(&self) -> Value {
        match self {
            Shape::Any => json!({}),
            Shape::String => json!({ "type": "string" }),
            Shape::Boolean => json!({ "type": "boolean" }),
            Shape::Number { min, max } => {
                let mut schema = Map::new();
                schema.insert("type".to_string(), json!("number"));
                if let Some(min) = min {
                    schema.insert("minimum".to_string(), json!(min));
                }
                if let Some(max) = max {
                    schema.insert("maximum".to_string(), json!(max));
                }
                Value::Object(schema)
            }
            Shape::Array { items } => json!({
                "type": "array",
                "items": items.to_json_schema(),
            }),
            Shape::Object { fields } => {
                let mut properties = Map::new();
                let mut required = Vec::new();
                for field in fields {
                    let mut property = field.shape.to_json_schema();
                    if let (Some(description), Value::Object(map)) =
                        (&field.description, &mut property)
                    {
                        map.insert("description".to_string(), json!(description));
                    }
                    properties.insert(field.name.clone(), property);
                    if field.required {
                        required.push(json!(field.name));
                    }
                }
                json!({
                    "type": "object",
                    "properties": properties,
                    "required": required,
                })
            }
        }
    }
}
