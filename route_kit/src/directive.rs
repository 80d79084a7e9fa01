//! Validation directives attached to fields, e.g. `"required,min=4,max=255"`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::schema::{Format, SchemaNode};

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// The recognised tokens of one binding string.
///
/// Parsing never fails: unknown tokens and tokens with an unparseable numeric
/// argument are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    pub required: bool,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub len: Option<i64>,
    pub email: bool,
    pub url: bool,
    pub number: bool,
}

impl Directives {
    pub fn parse(binding: &str) -> Self {
        let mut directives = Directives::default();
        for token in binding.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (key, value) = match token.split_once('=') {
                Some((key, value)) => (key.trim(), Some(value.trim())),
                None => (token, None),
            };
            match (key, value) {
                ("required", None) => directives.required = true,
                ("email", None) => directives.email = true,
                ("url", None) => directives.url = true,
                ("number", None) => directives.number = true,
                ("min", Some(v)) => directives.min = parse_int(key, v).or(directives.min),
                ("max", Some(v)) => directives.max = parse_int(key, v).or(directives.max),
                ("len", Some(v)) => directives.len = parse_int(key, v).or(directives.len),
                _ => tracing::trace!(token, "ignoring unrecognised directive"),
            }
        }
        directives
    }

    /// Folds the constraints into `node` where they apply to its type.
    ///
    /// `required` is not applied here; the owning object lists the field.
    /// `url` and `number` are recognised but set nothing.
    pub fn apply(&self, node: &mut SchemaNode) {
        match node {
            SchemaNode::Integer { minimum, maximum } | SchemaNode::Number { minimum, maximum } => {
                if self.min.is_some() {
                    *minimum = self.min;
                }
                if self.max.is_some() {
                    *maximum = self.max;
                }
            }
            SchemaNode::String {
                min_length,
                max_length,
                length,
                format,
            } => {
                if self.min.is_some() {
                    *min_length = self.min;
                }
                if self.max.is_some() {
                    *max_length = self.max;
                }
                if self.len.is_some() {
                    *length = self.len;
                }
                if self.email {
                    *format = Some(Format::Email);
                }
            }
            _ => {}
        }
    }

    /// Checks one field value against the constraints.
    ///
    /// `required` rejects a missing value and the zero value of its kind
    /// (`null`, `""`, `0`, `false`). Other constraints skip `null`. `min`,
    /// `max` and `len` bound the character count of strings, the value of
    /// numbers and the length of arrays.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        if self.required && is_zero(value) {
            return Err("is required".to_string());
        }
        let measure = match value {
            Value::Null => return Ok(()),
            Value::String(s) => {
                if self.email && !EMAIL.is_match(s) {
                    return Err(format!("{s:?} is not a valid email address"));
                }
                Some((s.chars().count() as f64, "length"))
            }
            Value::Number(n) => n.as_f64().map(|n| (n, "value")),
            Value::Array(items) => Some((items.len() as f64, "length")),
            Value::Bool(_) | Value::Object(_) => None,
        };
        let Some((measure, what)) = measure else {
            return Ok(());
        };
        if let Some(min) = self.min {
            if measure < min as f64 {
                return Err(format!("{what} must be at least {min}, got {measure}"));
            }
        }
        if let Some(max) = self.max {
            if measure > max as f64 {
                return Err(format!("{what} must be at most {max}, got {measure}"));
            }
        }
        if let Some(len) = self.len {
            if measure != len as f64 {
                return Err(format!("{what} must be exactly {len}, got {measure}"));
            }
        }
        Ok(())
    }
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Bool(b) => !b,
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn parse_int(key: &str, value: &str) -> Option<i64> {
    match value.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::debug!(key, value, "skipping directive with non-integer argument");
            None
        }
    }
}
