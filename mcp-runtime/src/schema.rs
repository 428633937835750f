//! Tool input validation and its JSON-schema projection.
//!
//! A tool declares its arguments as an ordered list of [`Field`]s. The same
//! declaration drives `tools/list` (via [`InputSchema::to_json_schema`]) and
//! argument checking (via [`InputSchema::parse`]).

use serde_json::{Map, Value, json};

use crate::error::{Error, Result};

// =============================================================================
// Kinds
// =============================================================================

/// Closed set of argument shapes.
#[derive(Clone, Debug, PartialEq)]
pub enum Kind {
    String,
    Number,
    Integer { min: Option<i64> },
    Boolean,
    Array(Box<Kind>),
    /// Free-form JSON object.
    Object,
    /// Object whose values all share one kind.
    Record(Box<Kind>),
    Optional(Box<Kind>),
    Union(Vec<Kind>),
    Enum(&'static [&'static str]),
    Any,
}

impl Kind {
    pub fn integer() -> Self {
        Kind::Integer { min: None }
    }

    pub fn integer_min(min: i64) -> Self {
        Kind::Integer { min: Some(min) }
    }

    pub fn array(inner: Kind) -> Self {
        Kind::Array(Box::new(inner))
    }

    pub fn record(inner: Kind) -> Self {
        Kind::Record(Box::new(inner))
    }

    pub fn optional(self) -> Self {
        match self {
            Kind::Optional(_) => self,
            other => Kind::Optional(Box::new(other)),
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Kind::Optional(_))
    }

    /// Check `value`, recording violations under `path`. Returns the
    /// normalized value when the check passes.
    fn check(&self, value: &Value, path: &str, violations: &mut Vec<String>) -> Option<Value> {
        match self {
            Kind::String if value.is_string() => Some(value.clone()),
            Kind::Number if value.is_number() => Some(value.clone()),
            Kind::Boolean if value.is_boolean() => Some(value.clone()),
            Kind::Object if value.is_object() => Some(value.clone()),
            Kind::Any => Some(value.clone()),
            Kind::Integer { min } => {
                let Some(n) = as_integer(value) else {
                    violations.push(mismatch(path, self, value));
                    return None;
                };
                if let Some(min) = min {
                    if n < *min {
                        violations.push(format!("{path}: must be greater than or equal to {min}"));
                        return None;
                    }
                }
                Some(Value::from(n))
            }
            Kind::Array(inner) => {
                let Some(items) = value.as_array() else {
                    violations.push(mismatch(path, self, value));
                    return None;
                };
                let before = violations.len();
                let checked: Vec<Value> = items
                    .iter()
                    .enumerate()
                    .filter_map(|(i, item)| inner.check(item, &format!("{path}[{i}]"), violations))
                    .collect();
                (violations.len() == before).then_some(Value::Array(checked))
            }
            Kind::Record(inner) => {
                let Some(entries) = value.as_object() else {
                    violations.push(mismatch(path, self, value));
                    return None;
                };
                let before = violations.len();
                let mut checked = Map::new();
                for (key, entry) in entries {
                    if let Some(v) = inner.check(entry, &format!("{path}.{key}"), violations) {
                        checked.insert(key.clone(), v);
                    }
                }
                (violations.len() == before).then_some(Value::Object(checked))
            }
            Kind::Optional(inner) => {
                if value.is_null() {
                    Some(Value::Null)
                } else {
                    inner.check(value, path, violations)
                }
            }
            Kind::Union(options) => {
                for option in options {
                    let mut scratch = Vec::new();
                    if let Some(v) = option.check(value, path, &mut scratch) {
                        return Some(v);
                    }
                }
                violations.push(mismatch(path, self, value));
                None
            }
            Kind::Enum(allowed) => match value.as_str() {
                Some(s) if allowed.contains(&s) => Some(value.clone()),
                Some(s) => {
                    violations.push(format!(
                        "{path}: invalid value '{s}', expected one of: {}",
                        allowed.join(", ")
                    ));
                    None
                }
                None => {
                    violations.push(mismatch(path, self, value));
                    None
                }
            },
            Kind::String | Kind::Number | Kind::Boolean | Kind::Object => {
                violations.push(mismatch(path, self, value));
                None
            }
        }
    }

    /// Human-readable name used in violation messages.
    pub fn display_name(&self) -> String {
        match self {
            Kind::String => "string".to_string(),
            Kind::Number => "number".to_string(),
            Kind::Integer { .. } => "integer".to_string(),
            Kind::Boolean => "boolean".to_string(),
            Kind::Array(inner) => format!("{}[]", inner.display_name()),
            Kind::Object | Kind::Record(_) => "object".to_string(),
            Kind::Optional(inner) => format!("{}?", inner.display_name()),
            Kind::Union(options) => options
                .iter()
                .map(Kind::display_name)
                .collect::<Vec<_>>()
                .join(" | "),
            Kind::Enum(allowed) => format!("enum({})", allowed.join("|")),
            Kind::Any => "any".to_string(),
        }
    }

    pub fn json_schema(&self) -> Value {
        match self {
            Kind::String => json!({ "type": "string" }),
            Kind::Number => json!({ "type": "number" }),
            Kind::Integer { min: Some(min) } => json!({ "type": "integer", "minimum": min }),
            Kind::Integer { min: None } => json!({ "type": "integer" }),
            Kind::Boolean => json!({ "type": "boolean" }),
            Kind::Array(inner) => json!({ "type": "array", "items": inner.json_schema() }),
            Kind::Object => json!({ "type": "object" }),
            Kind::Record(inner) => {
                json!({ "type": "object", "additionalProperties": inner.json_schema() })
            }
            Kind::Optional(inner) => inner.json_schema(),
            Kind::Union(options) => {
                json!({ "anyOf": options.iter().map(Kind::json_schema).collect::<Vec<_>>() })
            }
            Kind::Enum(allowed) => json!({ "type": "string", "enum": allowed }),
            Kind::Any => json!({}),
        }
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn mismatch(path: &str, expected: &Kind, received: &Value) -> String {
    format!(
        "{path}: expected {}, received {}",
        expected.display_name(),
        value_type_name(received)
    )
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Input schema
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub kind: Kind,
    pub description: &'static str,
}

impl Field {
    pub fn new(name: &'static str, kind: Kind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
        }
    }

    pub fn is_required(&self) -> bool {
        !self.kind.is_optional()
    }
}

/// Ordered argument declaration of one tool.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputSchema {
    fields: Vec<Field>,
}

impl InputSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, kind: Kind, description: &'static str) -> Self {
        self.fields.push(Field::new(name, kind, description));
        self
    }

    pub fn extend(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn required(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.is_required())
            .map(|f| f.name)
            .collect()
    }

    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut schema = field.kind.json_schema();
            if let Some(obj) = schema.as_object_mut() {
                obj.insert("description".to_string(), json!(field.description));
            }
            properties.insert(field.name.to_string(), schema);
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": self.required(),
        })
    }

    /// Validate raw arguments. Every violation is collected; unknown keys and
    /// explicit nulls for optional fields are dropped.
    pub fn parse(&self, args: &Value) -> Result<Map<String, Value>> {
        let empty = Map::new();
        let provided = match args {
            Value::Null => &empty,
            Value::Object(map) => map,
            other => {
                return Err(Error::validation(format!(
                    "arguments: expected object, received {}",
                    value_type_name(other)
                )));
            }
        };

        let mut violations = Vec::new();
        let mut parsed = Map::new();
        for field in &self.fields {
            match provided.get(field.name) {
                None | Some(Value::Null) if field.kind.is_optional() => {}
                None => violations.push(format!("{}: required", field.name)),
                Some(value) => {
                    if let Some(v) = field.kind.check(value, field.name, &mut violations) {
                        parsed.insert(field.name.to_string(), v);
                    }
                }
            }
        }

        if violations.is_empty() {
            Ok(parsed)
        } else {
            Err(Error::Validation(violations))
        }
    }
}
