//! HTTP provider for Gemini-style generation and embedding endpoints.
//!
//! The embedding path is deliberately defensive about response layout:
//! upstream SDK upgrades have shipped the vector as `{"embedding":
//! {"values": [...]}}`, as a bare array, and under renamed keys. See
//! [`extract_vector`] for the recognition order.

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::{EmbeddingProvider, GenerationProvider, GenerationRequest};
use crate::error::CoreError;

/// Provider backed by a Gemini-compatible REST API.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    embedding_model: String,
}

impl GeminiProvider {
    /// Create a provider against the public Gemini endpoint.
    pub fn new(api_key: impl Into<String>, embedding_model: impl Into<String>) -> Self {
        Self::with_base_url(
            "https://generativelanguage.googleapis.com/v1beta",
            api_key,
            embedding_model,
        )
    }

    /// Create a provider against a custom base URL (tests, proxies).
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            embedding_model: embedding_model.into(),
        }
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, reqwest::Error> {
        self.client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await
    }
}

#[async_trait::async_trait]
impl GenerationProvider for GeminiProvider {
    #[instrument(skip_all, fields(model = %request.model))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String, CoreError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, request.model);
        let body = serde_json::json!({
            "systemInstruction": { "parts": [{ "text": request.system_prompt }] },
            "contents": [{ "parts": [{ "text": request.user_prompt }] }],
            "generationConfig": { "temperature": request.temperature },
        });

        let response = self
            .post_json(&url, &body)
            .await
            .map_err(|err| CoreError::generation(err.to_string()))?;

        response
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| CoreError::generation("response carried no candidate text"))
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for GeminiProvider {
    #[instrument(skip_all, fields(model = %self.embedding_model, text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CoreError> {
        let url = format!(
            "{}/models/{}:embedContent",
            self.base_url, self.embedding_model
        );
        let body = serde_json::json!({
            "content": { "parts": [{ "text": text }] },
        });

        let response = self
            .post_json(&url, &body)
            .await
            .map_err(|err| CoreError::embedding(err.to_string()))?;

        let payload = response.get("embedding").unwrap_or(&response);
        let vector = extract_vector(payload)?;
        debug!(dims = vector.len(), "embedding extracted");
        Ok(vector)
    }
}

/// Locate a numeric array inside an embedding response payload.
///
/// Recognition order:
///
/// 1. a nested `values` field holding an array,
/// 2. the payload itself being a bare array,
/// 3. generic inspection: the first array-valued property of an object.
///
/// # Errors
///
/// Returns [`CoreError::EmbeddingShape`] if none of the shapes match or the
/// located array holds non-numeric elements.
pub fn extract_vector(payload: &Value) -> Result<Vec<f32>, CoreError> {
    if let Some(values) = payload.get("values").and_then(Value::as_array) {
        return numeric_array(values);
    }
    if let Some(values) = payload.as_array() {
        return numeric_array(values);
    }
    if let Some(object) = payload.as_object() {
        for (key, value) in object {
            if let Some(values) = value.as_array() {
                warn!(key = %key, "embedding vector found under unexpected property");
                return numeric_array(values);
            }
        }
    }
    Err(CoreError::EmbeddingShape(shape_summary(payload)))
}

fn numeric_array(values: &[Value]) -> Result<Vec<f32>, CoreError> {
    values
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect::<Option<Vec<f32>>>()
        .ok_or_else(|| CoreError::EmbeddingShape("array holds non-numeric elements".to_string()))
}

/// One-line description of an unrecognised payload, for error messages.
fn shape_summary(payload: &Value) -> String {
    match payload {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).take(8).collect();
            format!("object with keys [{}]", keys.join(", "))
        }
        Value::Array(_) => "array (unreachable)".to_string(),
        other => format!("{} value", json_type_name(other)),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_nested_values_field() {
        let payload = json!({ "values": [0.1, 0.2, 0.3] });
        let vector = extract_vector(&payload).unwrap();
        assert_eq!(vector.len(), 3);
        assert!((vector[1] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn extracts_bare_array() {
        let payload = json!([1.0, -2.5]);
        assert_eq!(extract_vector(&payload).unwrap(), vec![1.0, -2.5]);
    }

    #[test]
    fn extracts_first_array_valued_property() {
        let payload = json!({ "model": "m", "embedding_v2": [0.5, 0.5] });
        assert_eq!(extract_vector(&payload).unwrap(), vec![0.5, 0.5]);
    }

    #[test]
    fn values_field_wins_over_other_arrays() {
        let payload = json!({ "aux": [9.0], "values": [1.0] });
        assert_eq!(extract_vector(&payload).unwrap(), vec![1.0]);
    }

    #[test]
    fn rejects_payload_without_array() {
        let payload = json!({ "model": "m", "tokens": 12 });
        let err = extract_vector(&payload).unwrap_err();
        assert!(matches!(err, CoreError::EmbeddingShape(_)));
        assert!(err.to_string().contains("model"));
    }

    #[test]
    fn rejects_non_numeric_elements() {
        let payload = json!({ "values": [0.1, "oops"] });
        assert!(matches!(
            extract_vector(&payload),
            Err(CoreError::EmbeddingShape(_))
        ));
    }

    #[test]
    fn rejects_scalar_payload() {
        assert!(matches!(
            extract_vector(&json!("not a vector")),
            Err(CoreError::EmbeddingShape(_))
        ));
    }
}
