//! Parameter descriptors and the dynamic value vocabulary bound by the parser.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use super::DispatchError;
use super::schema::Schema;

/// Lowercase literals accepted as true by boolean coercion. Anything else
/// coerces to false rather than failing.
pub(crate) const TRUTHY_LITERALS: [&str; 4] = ["true", "1", "yes", "y"];

/// A value bound from a token, produced by a handler, or constructed from a
/// schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Path(PathBuf),
    Json(serde_json::Value),
    Record(Record),
}

impl Value {
    /// Field access on a [`Record`] value; `None` for every other variant.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(record) => record.get(name),
            _ => None,
        }
    }

    /// The canonical human-readable form used for default values in help
    /// text: booleans as `true`/`false`, strings double-quoted, paths in
    /// constructor-call form, numbers plain, records and JSON compact.
    #[must_use]
    pub fn default_display(&self) -> String {
        match self {
            Value::Unit => "()".to_string(),
            Value::Bool(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Str(v) => format!("{v:?}"),
            Value::Path(v) => format!("Path({:?})", v.display().to_string()),
            Value::Json(v) => v.to_string(),
            Value::Record(v) => v.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => f.write_str("()"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(v) => f.write_str(v),
            Value::Path(v) => write!(f, "{}", v.display()),
            Value::Json(v) => write!(f, "{v}"),
            Value::Record(v) => write!(f, "{v}"),
        }
    }
}

/// A constructed instance of a [`Schema`]; fields keep declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    type_name: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub(crate) fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, value: Value) {
        self.fields.push((name.into(), value));
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return write!(f, "{} {{}}", self.type_name);
        }
        write!(f, "{} {{ ", self.type_name)?;
        for (index, (name, value)) in self.fields.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {}", value.default_display())?;
        }
        f.write_str(" }")
    }
}

/// Type tag attached to a parameter, driving token coercion.
#[derive(Debug, Clone)]
pub enum TypeTag {
    /// Identity coercion: the raw token unchanged.
    Str,
    /// Truthy-set coercion; unrecognised literals become false, never errors.
    Bool,
    Int,
    Float,
    Path,
    /// Structured-config type: the token is a JSON document validated against
    /// the schema.
    Schema(Arc<Schema>),
}

impl TypeTag {
    /// Wrap a schema as a parameter type.
    #[must_use]
    pub fn schema(schema: Schema) -> Self {
        Self::Schema(Arc::new(schema))
    }

    /// Stable name shown in help text.
    pub fn display_name(&self) -> &str {
        match self {
            TypeTag::Str => "str",
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Path => "Path",
            TypeTag::Schema(schema) => schema.name(),
        }
    }

    /// Coerce one raw token into a typed value.
    ///
    /// # Errors
    /// Returns a [`DispatchError::ValueCoercion`] carrying the constructing
    /// type's message when the token cannot be interpreted.
    pub fn coerce(&self, raw: &str) -> Result<Value, DispatchError> {
        match self {
            TypeTag::Str => Ok(Value::Str(raw.to_string())),
            TypeTag::Bool => Ok(Value::Bool(
                TRUTHY_LITERALS.contains(&raw.to_lowercase().as_str()),
            )),
            TypeTag::Int => raw.parse::<i64>().map(Value::Int).map_err(|_| {
                DispatchError::ValueCoercion {
                    message: format!("invalid integer '{raw}'"),
                }
            }),
            TypeTag::Float => raw.parse::<f64>().map(Value::Float).map_err(|_| {
                DispatchError::ValueCoercion {
                    message: format!("invalid number '{raw}'"),
                }
            }),
            TypeTag::Path => Ok(Value::Path(PathBuf::from(raw))),
            TypeTag::Schema(schema) => schema.validate_json(raw),
        }
    }
}

/// Describes one named parameter of a handler.
///
/// Invariant: a parameter is required exactly when it has no default.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    name: String,
    tag: TypeTag,
    default: Option<Value>,
    description: String,
}

impl ParamSpec {
    /// A required positional parameter.
    pub fn required(name: impl Into<String>, tag: TypeTag, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag,
            default: None,
            description: description.into(),
        }
    }

    /// An optional parameter bound via `--name[=value]` syntax.
    pub fn optional(
        name: impl Into<String>,
        tag: TypeTag,
        default: Value,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            tag,
            default: Some(default),
            description: description.into(),
        }
    }

    /// A boolean option defaulting to false, settable by bare presence.
    pub fn toggle(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::optional(name, TypeTag::Bool, Value::Bool(false), description)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &TypeTag {
        &self.tag
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// True iff the type is boolean and the default is false; such options
    /// accept presence without an inline value.
    pub fn is_toggle(&self) -> bool {
        matches!(self.tag, TypeTag::Bool) && matches!(self.default, Some(Value::Bool(false)))
    }

    /// Coerce one raw token against this parameter's type tag.
    ///
    /// # Errors
    /// Propagates the [`DispatchError::ValueCoercion`] of the tag.
    pub fn coerce(&self, raw: &str) -> Result<Value, DispatchError> {
        self.tag.coerce(raw)
    }

    /// Help line for a required positional, at the given indentation.
    #[must_use]
    pub fn arg_help(&self, indent: usize) -> String {
        format!(
            "{:indent$}<{}> - {}: {}",
            "",
            self.name,
            self.tag.display_name(),
            self.description
        )
    }

    /// Help line for an option, at the given indentation.
    #[must_use]
    pub fn opt_help(&self, indent: usize) -> String {
        let flag = if self.is_toggle() {
            format!("[--{}]", self.name)
        } else {
            format!("[--{}=value]", self.name)
        };
        match &self.default {
            Some(default) => format!(
                "{:indent$}{flag} - {}: {}. Default: {}",
                "",
                self.tag.display_name(),
                self.description,
                default.default_display()
            ),
            None => format!(
                "{:indent$}{flag} - {}: {}",
                "",
                self.tag.display_name(),
                self.description
            ),
        }
    }
}

/// The per-dispatch mapping of bound values at one node, threaded explicitly
/// through the recursion.
#[derive(Debug, Default)]
pub struct Bindings {
    entries: Vec<(String, Value)>,
}

impl Bindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bind(&mut self, name: &str, value: Value) {
        self.entries.push((name.to_string(), value));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_strings_pass_through_unchanged() {
        let spec = ParamSpec::required("name", TypeTag::Str, "");
        assert_eq!(
            spec.coerce("Hello World").unwrap(),
            Value::Str("Hello World".into())
        );
    }

    #[test]
    fn boolean_coercion_accepts_the_truthy_set_and_nothing_else() {
        for literal in ["true", "1", "yes", "y", "TRUE", "Yes", "Y"] {
            assert_eq!(
                TypeTag::Bool.coerce(literal).unwrap(),
                Value::Bool(true),
                "{literal} should be truthy"
            );
        }
        for literal in ["false", "0", "no", "n", "anything", ""] {
            assert_eq!(
                TypeTag::Bool.coerce(literal).unwrap(),
                Value::Bool(false),
                "{literal} should coerce to false, not fail"
            );
        }
    }

    #[test]
    fn numeric_and_path_coercion() {
        assert_eq!(TypeTag::Int.coerce("42").unwrap(), Value::Int(42));
        assert_eq!(TypeTag::Float.coerce("2.5").unwrap(), Value::Float(2.5));
        assert_eq!(
            TypeTag::Path.coerce("./data").unwrap(),
            Value::Path(PathBuf::from("./data"))
        );

        let err = TypeTag::Int.coerce("forty").unwrap_err();
        assert_eq!(err.to_string(), "invalid integer 'forty'");
    }

    #[test]
    fn toggle_requires_boolean_false_default() {
        assert!(ParamSpec::toggle("help", "Show help").is_toggle());
        assert!(
            !ParamSpec::optional("flag", TypeTag::Bool, Value::Bool(true), "").is_toggle(),
            "true-defaulted booleans are not toggles"
        );
        assert!(!ParamSpec::required("flag", TypeTag::Bool, "").is_toggle());
    }

    #[test]
    fn help_lines_match_the_documented_format() {
        let config = ParamSpec::required(
            "config",
            TypeTag::schema(Schema::new("Config", "")),
            "",
        );
        assert_eq!(config.arg_help(0), "<config> - Config: ");

        let help = ParamSpec::toggle("help", "Show help");
        assert_eq!(help.opt_help(0), "[--help] - bool: Show help. Default: false");

        let data = ParamSpec::optional(
            "data",
            TypeTag::Path,
            Value::Path(PathBuf::from("./data")),
            "directory to store all server data",
        );
        assert_eq!(
            data.opt_help(4),
            "    [--data=value] - Path: directory to store all server data. Default: Path(\"./data\")"
        );
    }

    #[test]
    fn record_display_and_lookup() {
        let mut record = Record::new("Config");
        record.push("name", Value::Str("test".into()));
        assert_eq!(record.to_string(), "Config { name: \"test\" }");
        assert_eq!(record.get("name"), Some(&Value::Str("test".into())));
        assert_eq!(record.get("missing"), None);

        let value = Value::Record(record);
        assert_eq!(value.field("name"), Some(&Value::Str("test".into())));
        assert_eq!(Value::Unit.field("name"), None);
    }

    #[test]
    fn bindings_preserve_first_bound_values() {
        let mut bindings = Bindings::new();
        assert!(bindings.is_empty());
        bindings.bind("data", Value::Str("one".into()));
        assert_eq!(bindings.len(), 1);
        assert!(bindings.contains("data"));
        assert_eq!(bindings.get("data"), Some(&Value::Str("one".into())));
        assert_eq!(bindings.get("missing"), None);
    }
}
