use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::document::{Info, DEFAULT_OPENAPI_VERSION};
use crate::error::Result;

/// Document settings, read from the `[docs]` table of a TOML file:
///
/// ```toml
/// [docs]
/// title = "Article Service API"
/// version = "1.0.0"
/// max_depth = 32
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DocConfig {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    /// Value of the document's top-level `openapi` key.
    pub openapi: String,
    /// Recursion limit for schema compilation; unlimited when unset.
    pub max_depth: Option<usize>,
}

impl Default for DocConfig {
    fn default() -> Self {
        Self {
            title: "API".to_string(),
            version: "1.0.0".to_string(),
            description: None,
            openapi: DEFAULT_OPENAPI_VERSION.to_string(),
            max_depth: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    docs: DocConfig,
}

impl DocConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(s)?;
        Ok(file.docs)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn info(&self) -> Info {
        Info {
            title: self.title.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
        }
    }
}
