//! Google Gemini API client (native generateContent, not OpenAI-compat).
//!
//! The model decides per turn whether to answer in text or to request a
//! capability invocation; this client only serializes the transcript, sends
//! it, and parses the ordered response parts.

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::transcript::{Entry, Transcript};

/// Default base URL for the Gemini API.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// A single capability definition exposed to the model as a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// One ordered part of a model response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePart {
    Text(String),
    FunctionCall { name: String, args: Value },
}

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Gemini request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed Gemini response: {0}")]
    Malformed(String),
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, GEMINI_API_BASE_URL.to_string())
    }

    /// Custom base URL, for tests against a mock server.
    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            base_url,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn api_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    /// Send the full transcript plus tool declarations, return the ordered
    /// response parts. No retry; any failure propagates.
    pub async fn generate(
        &self,
        system: &str,
        transcript: &Transcript,
        tools: &[ToolDef],
    ) -> Result<Vec<ResponsePart>, GeminiError> {
        let body = json!({
            "systemInstruction": {"parts": [{"text": system}]},
            "contents": render_contents(transcript),
            "tools": convert_tools(tools),
        });

        let resp = self
            .client
            .post(self.api_url())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(GeminiError::Api { status, message });
        }

        let payload: Value = resp.json().await?;
        parse_parts(&payload)
    }
}

/// Convert capability defs to Gemini `functionDeclarations`.
fn convert_tools(tools: &[ToolDef]) -> Vec<Value> {
    let declarations: Vec<Value> = tools
        .iter()
        .map(|t| {
            json!({
                "name": t.name,
                "description": t.description,
                "parameters": t.input_schema,
            })
        })
        .collect();
    vec![json!({"functionDeclarations": declarations})]
}

/// Render the transcript as role-tagged Gemini contents.
///
/// USER-tagged lines go out with role `user`, SYSTEM-tagged lines with
/// role `model`, and images as `user` contents with inline JPEG data.
pub(crate) fn render_contents(transcript: &Transcript) -> Vec<Value> {
    transcript
        .entries()
        .iter()
        .map(|entry| match entry {
            Entry::Text(text) => {
                let role = if entry.is_user() { "user" } else { "model" };
                json!({"role": role, "parts": [{"text": text}]})
            }
            Entry::Image(jpeg) => json!({
                "role": "user",
                "parts": [{
                    "inlineData": {
                        "mimeType": "image/jpeg",
                        "data": B64.encode(jpeg),
                    }
                }]
            }),
        })
        .collect()
}

/// Extract the ordered parts of the first candidate.
fn parse_parts(payload: &Value) -> Result<Vec<ResponsePart>, GeminiError> {
    let candidate = payload["candidates"]
        .get(0)
        .ok_or_else(|| GeminiError::Malformed("no candidates in response".to_string()))?;

    let mut parts = Vec::new();
    if let Some(raw_parts) = candidate["content"]["parts"].as_array() {
        for part in raw_parts {
            if let Some(text) = part["text"].as_str() {
                parts.push(ResponsePart::Text(text.to_string()));
            } else if let Some(fc) = part["functionCall"].as_object() {
                let name = fc
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string();
                let args = fc
                    .get("args")
                    .cloned()
                    .unwrap_or(Value::Object(Default::default()));
                parts.push(ResponsePart::FunctionCall { name, args });
            }
        }
    }
    Ok(parts)
}
