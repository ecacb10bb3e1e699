//! Structured-config types: declarative field schemas validated from JSON
//! documents or from bound values, standing in for an external
//! model-validation service.

use std::path::PathBuf;

use serde_json::json;

use super::DispatchError;
use super::params::{Bindings, ParamSpec, Record, TypeTag, Value};

/// A named, documented, ordered collection of fields. Used both as the
/// handler of an intermediate node (constructing a shared options object from
/// bound values) and as the type of a positional parameter (validating a JSON
/// token).
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    doc: String,
    fields: Vec<ParamSpec>,
}

impl Schema {
    pub fn new(name: impl Into<String>, doc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: doc.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field. Field order is declaration order; required fields are
    /// those without defaults, exactly as for parameters.
    #[must_use]
    pub fn with_field(mut self, field: ParamSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn fields(&self) -> &[ParamSpec] {
        &self.fields
    }

    /// Parse a raw token as a JSON document and construct a validated record.
    ///
    /// # Errors
    /// Returns a [`DispatchError::ValueCoercion`] whose message is this
    /// validator's own report; the dispatcher passes it through opaquely.
    pub fn validate_json(&self, raw: &str) -> Result<Value, DispatchError> {
        let document: serde_json::Value =
            serde_json::from_str(raw).map_err(|err| DispatchError::ValueCoercion {
                message: format!("invalid JSON for {}: {err}", self.name),
            })?;
        self.validate_value(&document)
    }

    /// Validate an already-parsed JSON document. Unknown keys are ignored;
    /// missing optional fields take their defaults.
    ///
    /// # Errors
    /// Returns a [`DispatchError::ValueCoercion`] listing every field that
    /// failed.
    pub fn validate_value(&self, document: &serde_json::Value) -> Result<Value, DispatchError> {
        let Some(entries) = document.as_object() else {
            return Err(DispatchError::ValueCoercion {
                message: format!("{} expects a JSON object", self.name),
            });
        };
        let mut record = Record::new(self.name.clone());
        let mut errors = Vec::new();
        for field in &self.fields {
            match entries.get(field.name()) {
                Some(value) => match coerce_json(field.tag(), value) {
                    Ok(coerced) => record.push(field.name(), coerced),
                    Err(message) => errors.push(format!("{}: {message}", field.name())),
                },
                None => match field.default() {
                    Some(default) => record.push(field.name(), default.clone()),
                    None => errors.push(format!("{}: field required", field.name())),
                },
            }
        }
        if errors.is_empty() {
            Ok(Value::Record(record))
        } else {
            Err(self.validation_failure(&errors))
        }
    }

    /// Construct a record from values bound by the dispatcher, filling
    /// defaults for unbound fields.
    pub(crate) fn build(&self, bindings: &Bindings) -> Result<Value, DispatchError> {
        let mut record = Record::new(self.name.clone());
        let mut errors = Vec::new();
        for field in &self.fields {
            match bindings
                .get(field.name())
                .cloned()
                .or_else(|| field.default().cloned())
            {
                Some(value) => record.push(field.name(), value),
                None => errors.push(format!("{}: field required", field.name())),
            }
        }
        if errors.is_empty() {
            Ok(Value::Record(record))
        } else {
            Err(self.validation_failure(&errors))
        }
    }

    fn validation_failure(&self, errors: &[String]) -> DispatchError {
        let plural = if errors.len() == 1 { "" } else { "s" };
        DispatchError::ValueCoercion {
            message: format!(
                "{} validation error{plural} for {}: {}",
                errors.len(),
                self.name,
                errors.join("; ")
            ),
        }
    }

    /// Render the schema as a JSON-Schema document.
    #[must_use]
    pub fn json_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();
        for field in &self.fields {
            let entry = match field.tag() {
                TypeTag::Schema(inner) => inner.json_schema(),
                tag => {
                    let mut entry = serde_json::Map::new();
                    entry.insert("type".into(), json!(json_type_name(tag)));
                    if !field.description().is_empty() {
                        entry.insert("description".into(), json!(field.description()));
                    }
                    if let Some(default) = field.default() {
                        entry.insert("default".into(), value_to_json(default));
                    }
                    serde_json::Value::Object(entry)
                }
            };
            if field.is_required() {
                required.push(json!(field.name()));
            }
            properties.insert(field.name().to_string(), entry);
        }
        json!({
            "title": self.name,
            "description": self.doc,
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

fn json_type_name(tag: &TypeTag) -> &'static str {
    match tag {
        TypeTag::Str | TypeTag::Path => "string",
        TypeTag::Bool => "boolean",
        TypeTag::Int => "integer",
        TypeTag::Float => "number",
        TypeTag::Schema(_) => "object",
    }
}

fn coerce_json(tag: &TypeTag, value: &serde_json::Value) -> Result<Value, String> {
    match tag {
        TypeTag::Str => value
            .as_str()
            .map(|text| Value::Str(text.to_string()))
            .ok_or_else(|| "expected string".to_string()),
        TypeTag::Bool => value
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| "expected boolean".to_string()),
        TypeTag::Int => value
            .as_i64()
            .map(Value::Int)
            .ok_or_else(|| "expected integer".to_string()),
        TypeTag::Float => value
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| "expected number".to_string()),
        TypeTag::Path => value
            .as_str()
            .map(|text| Value::Path(PathBuf::from(text)))
            .ok_or_else(|| "expected string path".to_string()),
        TypeTag::Schema(inner) => inner
            .validate_value(value)
            .map_err(|err| err.to_string()),
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Unit => serde_json::Value::Null,
        Value::Bool(v) => json!(v),
        Value::Int(v) => json!(v),
        Value::Float(v) => serde_json::Number::from_f64(*v)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Str(v) => json!(v),
        Value::Path(v) => json!(v.display().to_string()),
        Value::Json(v) => v.clone(),
        Value::Record(record) => {
            let mut entries = serde_json::Map::new();
            for (name, field) in record.fields() {
                entries.insert(name.to_string(), value_to_json(field));
            }
            serde_json::Value::Object(entries)
        }
    }
}
