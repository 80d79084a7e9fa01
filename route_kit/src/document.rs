//! The OpenAPI-shaped document the registry assembles.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::SchemaNode;

pub const JSON_MEDIA_TYPE: &str = "application/json";
pub const DEFAULT_OPENAPI_VERSION: &str = "3.0.0";
/// Every response gets this description; nothing status-specific is derived.
pub const DEFAULT_RESPONSE_DESCRIPTION: &str = "Default description";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub openapi: String,
    pub info: Info,
    pub components: Components,
    pub paths: IndexMap<String, PathItem>,
}

/// Operations of one path, keyed by lowercase method name.
pub type PathItem = IndexMap<String, Operation>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Info {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: None,
        }
    }
}

/// Reserved; `schemas` stays empty unless populated by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub schemas: IndexMap<String, SchemaNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub responses: BTreeMap<u16, Response>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamIn {
    Path,
    Query,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "in")]
    pub location: ParamIn,
    pub name: String,
    pub required: bool,
    pub schema: SchemaNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: SchemaNode,
}

/// A single `application/json` entry, the only media type emitted.
pub fn json_content(schema: SchemaNode) -> IndexMap<String, MediaType> {
    IndexMap::from([(JSON_MEDIA_TYPE.to_string(), MediaType { schema })])
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    pub content: IndexMap<String, MediaType>,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub content: IndexMap<String, MediaType>,
    pub description: String,
}

impl Document {
    /// A skeleton with empty `paths` and `components.schemas`.
    pub fn new(openapi: impl Into<String>, info: Info) -> Self {
        Self {
            openapi: openapi.into(),
            info,
            components: Components::default(),
            paths: IndexMap::new(),
        }
    }

    pub fn operation(&self, path: &str, method: &str) -> Option<&Operation> {
        self.paths.get(path)?.get(method)
    }

    /// Compact JSON encoding; what gets served to documentation browsers.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn to_pretty_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn skeleton_keeps_components_and_paths() {
        let doc = Document::new(DEFAULT_OPENAPI_VERSION, Info::new("Go CRUD Example", "1.0.0"));
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({
                "openapi": "3.0.0",
                "info": {"title": "Go CRUD Example", "version": "1.0.0"},
                "components": {"schemas": {}},
                "paths": {}
            })
        );
    }

    #[test]
    fn empty_operation_is_an_empty_object() {
        assert_eq!(serde_json::to_value(Operation::default()).unwrap(), json!({}));
    }

    #[test]
    fn responses_are_keyed_by_status_code() {
        let mut op = Operation::default();
        op.responses.insert(
            404,
            Response {
                content: json_content(SchemaNode::string()),
                description: DEFAULT_RESPONSE_DESCRIPTION.to_string(),
            },
        );
        op.responses.insert(
            200,
            Response {
                content: json_content(SchemaNode::Boolean),
                description: DEFAULT_RESPONSE_DESCRIPTION.to_string(),
            },
        );
        let encoded = serde_json::to_string(&op).unwrap();
        assert!(encoded.starts_with(r#"{"responses":{"200":"#));
        assert_eq!(
            serde_json::to_value(&op).unwrap()["responses"]["404"],
            json!({
                "content": {"application/json": {"schema": {"type": "string"}}},
                "description": "Default description"
            })
        );
    }

    #[test]
    fn parameter_uses_in_key() {
        let param = Parameter {
            location: ParamIn::Query,
            name: "page".into(),
            required: false,
            schema: SchemaNode::integer(),
        };
        assert_eq!(
            serde_json::to_string(&param).unwrap(),
            r#"{"in":"query","name":"page","required":false,"schema":{"type":"integer"}}"#
        );
    }
}
