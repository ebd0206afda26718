//! Test case configuration types
//!
//! Defines the data structures for deserializing the rendered
//! `deps/testcases.yaml` list.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::common::{Error, Result};
use crate::manifest::Renderer;

/// Template identifier of the test-case list
pub const TESTCASES: &str = "testcases";

/// One named scenario: cluster setup, an HTTP probe, and the expected
/// partial response
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TestCase {
    /// Name of the test case (not required to be unique)
    pub name: String,
    /// Manifest template identifiers to apply before probing, in order
    #[serde(default)]
    pub context: Vec<String>,
    /// Request to send
    pub request: RequestSpec,
    /// Expected partial response
    #[serde(default)]
    pub response: ExpectedResponse,
}

/// HTTP request issued against the service under test
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RequestSpec {
    /// HTTP method (default: GET)
    #[serde(default = "default_method")]
    pub method: String,
    /// Target URL
    pub url: String,
    /// Query parameters; sequence values repeat the parameter
    #[serde(default)]
    pub queries: Map<String, Value>,
    /// Request headers
    #[serde(default)]
    pub headers: Map<String, Value>,
    /// JSON body, sent only when present
    #[serde(default)]
    pub body: Option<Value>,
}

fn default_method() -> String {
    "GET".to_string()
}

/// Expected response; headers and body only need to be included in the
/// actual response
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ExpectedResponse {
    /// Expected status code (default: 200)
    #[serde(default = "default_status_code")]
    pub status_code: u16,
    /// Expected headers, names compared case-insensitively
    #[serde(default)]
    pub headers: Map<String, Value>,
    /// Expected body; a string matches the raw text, anything else is
    /// compared against the body parsed as JSON. Absent means `{}`, which
    /// any JSON object satisfies.
    #[serde(default)]
    pub body: Option<Value>,
}

fn default_status_code() -> u16 {
    200
}

impl Default for ExpectedResponse {
    fn default() -> Self {
        Self {
            status_code: default_status_code(),
            headers: Map::new(),
            body: None,
        }
    }
}

/// Parse a test-case list from YAML text
pub fn parse_test_cases(content: &str) -> Result<Vec<TestCase>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_yaml::from_str(content)
        .map_err(|e| Error::ConfigParse(format!("Failed to parse test cases: {}", e)))
}

/// Render `templates/testcases.yaml.j2` and load the cases from the
/// rendered file
pub fn load_test_cases(renderer: &Renderer) -> Result<(PathBuf, Vec<TestCase>)> {
    let path = renderer.render(TESTCASES)?;
    let cases = read_test_cases(&path)?;
    Ok((path, cases))
}

/// Load test cases from an already rendered file
pub fn read_test_cases(path: &Path) -> Result<Vec<TestCase>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, &e))?;
    parse_test_cases(&content)
}

/// Keep only the cases named in `names`, in suite order
///
/// An empty filter keeps everything. A name that matches no case is an
/// error.
pub fn filter_cases(cases: Vec<TestCase>, names: &[String]) -> Result<Vec<TestCase>> {
    if names.is_empty() {
        return Ok(cases);
    }
    if let Some(unknown) = names.iter().find(|n| !cases.iter().any(|c| &c.name == *n)) {
        return Err(Error::CaseNotFound(unknown.clone()));
    }
    Ok(cases
        .into_iter()
        .filter(|c| names.contains(&c.name))
        .collect())
}
