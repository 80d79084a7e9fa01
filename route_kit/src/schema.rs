use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// String formats a directive can set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Email,
}

/// A compiled JSON-Schema node.
///
/// Each variant carries only the constraint keys that are valid for its `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SchemaNode {
    String {
        #[serde(rename = "minLength", default, skip_serializing_if = "Option::is_none")]
        min_length: Option<i64>,
        #[serde(rename = "maxLength", default, skip_serializing_if = "Option::is_none")]
        max_length: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<Format>,
    },
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<i64>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<i64>,
    },
    Boolean,
    Array {
        items: Box<SchemaNode>,
    },
    Object {
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        properties: IndexMap<String, SchemaNode>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        required: Vec<String>,
    },
}

impl SchemaNode {
    pub fn string() -> Self {
        SchemaNode::String {
            min_length: None,
            max_length: None,
            length: None,
            format: None,
        }
    }

    pub fn integer() -> Self {
        SchemaNode::Integer {
            minimum: None,
            maximum: None,
        }
    }

    pub fn number() -> Self {
        SchemaNode::Number {
            minimum: None,
            maximum: None,
        }
    }

    pub fn array(items: SchemaNode) -> Self {
        SchemaNode::Array {
            items: Box::new(items),
        }
    }

    /// An object with no properties; also the fallback for unknown kinds.
    pub fn empty_object() -> Self {
        SchemaNode::Object {
            properties: IndexMap::new(),
            required: Vec::new(),
        }
    }

    /// The wire value of the `type` key.
    pub fn type_name(&self) -> &'static str {
        match self {
            SchemaNode::String { .. } => "string",
            SchemaNode::Integer { .. } => "integer",
            SchemaNode::Number { .. } => "number",
            SchemaNode::Boolean => "boolean",
            SchemaNode::Array { .. } => "array",
            SchemaNode::Object { .. } => "object",
        }
    }

    pub fn properties(&self) -> Option<&IndexMap<String, SchemaNode>> {
        match self {
            SchemaNode::Object { properties, .. } => Some(properties),
            _ => None,
        }
    }

    /// Field names listed in `required`; empty for non-objects.
    pub fn required(&self) -> &[String] {
        match self {
            SchemaNode::Object { required, .. } => required,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unset_constraints_are_omitted() {
        assert_eq!(serde_json::to_value(SchemaNode::string()).unwrap(), json!({"type": "string"}));
        assert_eq!(serde_json::to_value(SchemaNode::empty_object()).unwrap(), json!({"type": "object"}));
        assert_eq!(serde_json::to_value(SchemaNode::Boolean).unwrap(), json!({"type": "boolean"}));
    }

    #[test]
    fn string_constraints_use_camel_case_keys() {
        let node = SchemaNode::String {
            min_length: Some(4),
            max_length: Some(255),
            length: None,
            format: Some(Format::Email),
        };
        assert_eq!(
            serde_json::to_value(node).unwrap(),
            json!({"type": "string", "minLength": 4, "maxLength": 255, "format": "email"})
        );
    }

    #[test]
    fn nested_nodes_serialize_in_declaration_order() {
        let mut properties = IndexMap::new();
        properties.insert("title".to_string(), SchemaNode::string());
        properties.insert("age".to_string(), SchemaNode::integer());
        let node = SchemaNode::array(SchemaNode::Object {
            properties,
            required: vec!["title".to_string()],
        });
        assert_eq!(
            serde_json::to_string(&node).unwrap(),
            r#"{"type":"array","items":{"type":"object","properties":{"title":{"type":"string"},"age":{"type":"integer"}},"required":["title"]}}"#
        );
    }

    #[test]
    fn reads_back_documents() {
        let node: SchemaNode =
            serde_json::from_value(json!({"type": "number", "minimum": 5})).unwrap();
        assert_eq!(
            node,
            SchemaNode::Number {
                minimum: Some(5),
                maximum: None
            }
        );
        assert_eq!(node.type_name(), "number");
    }
}
