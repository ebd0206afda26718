//! HTTP probe
//!
//! Sends the request described by a test case and checks status, headers
//! and body, in that order, stopping at the first mismatch.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use serde_json::{Map, Value};
use std::time::Duration;

use super::include::mismatch;
use super::{Probe, Verification};
use crate::common::Result;
use crate::testing::{ExpectedResponse, RequestSpec};

/// Probe backed by a reqwest client
///
/// Redirects are never followed so that a redirect response can itself be
/// the expectation.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration, insecure: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(insecure)
            .build()?;
        Ok(Self { client })
    }

    async fn attempt(
        &self,
        method: &Method,
        request: &RequestSpec,
        expected: &ExpectedResponse,
    ) -> std::result::Result<(), String> {
        let mut builder = self
            .client
            .request(method.clone(), &request.url)
            .query(&query_pairs(&request.queries))
            .headers(header_map(&request.headers)?);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| format!("failed to {} to {}: {}", method, request.url, e))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| format!("failed to read response from {}: {}", request.url, e))?;

        tracing::debug!(status, body_len = body.len(), "Received response");
        check_response(expected, status, &headers, &body)
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn verify(
        &self,
        name: &str,
        request: &RequestSpec,
        expected: &ExpectedResponse,
    ) -> Verification {
        let method = match Method::from_bytes(request.method.to_ascii_uppercase().as_bytes()) {
            Ok(method) => method,
            Err(_) => return Verification::fail(format!("invalid method '{}'", request.method)),
        };

        tracing::debug!(%method, url = %request.url, "Sending request");
        match self.attempt(&method, request, expected).await {
            Ok(()) => Verification::pass(format!(
                "Successfully verified {} via {} {}",
                name, method, request.url
            )),
            Err(message) => Verification::fail(message),
        }
    }
}

/// Compare a received response with the expectation
pub(crate) fn check_response(
    expected: &ExpectedResponse,
    status: u16,
    headers: &HeaderMap,
    body: &str,
) -> std::result::Result<(), String> {
    if status != expected.status_code {
        return Err(format!(
            "Status code unexpected: expected: {}, actually: {}",
            expected.status_code, status
        ));
    }

    let expected_headers = expected
        .headers
        .iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), header_expectation(v)))
        .collect::<Map<_, _>>();
    let actual_headers = actual_headers(headers, &expected_headers);
    if let Some(found) = mismatch(
        &Value::Object(expected_headers),
        &Value::Object(actual_headers),
    ) {
        return Err(format!("Header unexpected {}", found));
    }

    // no expectation still requires a JSON body
    let empty = Value::Object(Map::new());
    match expected.body.as_ref().unwrap_or(&empty) {
        Value::String(text) if text != body => Err(format!(
            "Response body unexpected: expected {:?}, actually {:?}",
            text, body
        )),
        Value::String(_) => Ok(()),
        expected_body => {
            let actual: Value = serde_json::from_str(body).map_err(|e| {
                format!("Response format unexpected: not json-formatted ({})", e)
            })?;
            match mismatch(expected_body, &actual) {
                Some(found) => Err(format!("Response body unexpected {}", found)),
                None => Ok(()),
            }
        }
    }
}

/// Response headers as a mapping of lower-case name to text value
///
/// Repeated headers are joined with `, `, unless the expectation for that
/// name is a sequence: then each occurrence is kept as its own element.
fn actual_headers(headers: &HeaderMap, expected: &Map<String, Value>) -> Map<String, Value> {
    let mut map = Map::new();
    for name in headers.keys() {
        let values = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>();
        let value = match expected.get(name.as_str()) {
            Some(Value::Array(_)) => Value::Array(values.into_iter().map(Value::String).collect()),
            _ => Value::String(values.join(", ")),
        };
        map.insert(name.as_str().to_string(), value);
    }
    map
}

/// Header values are text on the wire; YAML may have typed them
fn header_expectation(value: &Value) -> Value {
    match value {
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| Value::String(scalar_text(item))).collect())
        }
        Value::Object(_) => value.clone(),
        scalar => Value::String(scalar_text(scalar)),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn query_pairs(queries: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in queries {
        match value {
            Value::Array(items) => {
                pairs.extend(items.iter().map(|item| (key.clone(), scalar_text(item))))
            }
            other => pairs.push((key.clone(), scalar_text(other))),
        }
    }
    pairs
}

fn header_map(headers: &Map<String, Value>) -> std::result::Result<HeaderMap, String> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| format!("invalid header name '{}': {}", key, e))?;
        let value = HeaderValue::from_str(&scalar_text(value))
            .map_err(|e| format!("invalid value for header '{}': {}", key, e))?;
        map.append(name, value);
    }
    Ok(map)
}
