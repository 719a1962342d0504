use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::snippet;

const API_URL: &str = "https://api.openai.com/v1/responses";

/// Request body for the OpenAI Responses API.
#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct Response {
    /// Top-level convenience field; not always present.
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

/// Error body shared by every OpenAI endpoint.
#[derive(Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Deserialize)]
pub(crate) struct ErrorDetail {
    pub message: String,
}

/// Best human-readable message for a failed OpenAI call.
pub(crate) fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => err.error.message,
        Err(_) => snippet(body).to_string(),
    }
}

pub async fn complete_async(
    http: &reqwest::Client,
    api_key: &str,
    model: &str,
    system: &str,
    user_message: &str,
) -> Result<String> {
    let request = Request {
        model,
        instructions: system,
        input: user_message,
    };

    let response = http
        .post(API_URL)
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await
        .context("Failed to send request to OpenAI API")?;

    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read OpenAI API response")?;

    if !status.is_success() {
        anyhow::bail!("OpenAI API error ({}): {}", status, error_message(&body));
    }

    parse_text(&body)
}

fn parse_text(body: &str) -> Result<String> {
    let parsed: Response =
        serde_json::from_str(body).context("Failed to parse OpenAI API response")?;

    if let Some(text) = parsed.output_text.filter(|t| !t.is_empty()) {
        return Ok(text);
    }

    parsed
        .output
        .iter()
        .flat_map(|item| &item.content)
        .find(|block| block.block_type == "output_text" && !block.text.is_empty())
        .map(|block| block.text.clone())
        .with_context(|| format!("OpenAI returned no text. Raw response: {}", snippet(body)))
}
