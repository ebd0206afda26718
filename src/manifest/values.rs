//! Template values loaded from `config.yaml`

use serde_json::{Map, Value};
use std::path::Path;

use crate::common::{Error, Result};

/// Template values, always a mapping at the root
#[derive(Debug, Clone, PartialEq)]
pub struct Values(Value);

impl Values {
    /// Load values from a YAML file
    ///
    /// A missing or malformed file is fatal: every template depends on it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
        Self::parse(&content).map_err(|e| match e {
            Error::ConfigParse(msg) => {
                Error::ConfigParse(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parse values from YAML text
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self(Value::Object(Map::new())));
        }
        let value: Value =
            serde_yaml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        match value {
            Value::Null => Ok(Self(Value::Object(Map::new()))),
            Value::Object(map) => Ok(Self(Value::Object(map))),
            other => Err(Error::ConfigParse(format!(
                "expected a mapping at the document root, found {}",
                crate::verify::kind_of(&other)
            ))),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}
