use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::snippet;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 2048;

#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// Only the text blocks matter; tool-use blocks have no `text`.
#[derive(Deserialize)]
struct Response {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
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
        max_tokens: MAX_TOKENS,
        system,
        messages: [Message {
            role: "user",
            content: user_message,
        }],
    };

    let response = http
        .post(API_URL)
        .header("x-api-key", api_key)
        .header("anthropic-version", API_VERSION)
        .json(&request)
        .send()
        .await
        .context("Failed to send request to Anthropic API")?;

    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read Anthropic API response")?;

    if !status.is_success() {
        if let Ok(err) = serde_json::from_str::<ErrorResponse>(&body) {
            anyhow::bail!("Anthropic API error ({}): {}", status, err.error.message);
        }
        anyhow::bail!("Anthropic API error ({}): {}", status, snippet(&body));
    }

    parse_text(&body)
}

fn parse_text(body: &str) -> Result<String> {
    let parsed: Response =
        serde_json::from_str(body).context("Failed to parse Anthropic API response")?;

    let text: String = parsed.content.iter().map(|b| b.text.as_str()).collect();
    if text.trim().is_empty() {
        anyhow::bail!("Anthropic returned no text. Raw response: {}", snippet(body));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_text_blocks() {
        let body = r#"{"content":[{"type":"text","text":"Hair: "},{"type":"text","text":"silver"}]}"#;
        assert_eq!(parse_text(body).unwrap(), "Hair: silver");
    }

    #[test]
    fn empty_reply_is_an_error() {
        let body = r#"{"content":[]}"#;
        assert!(parse_text(body).is_err());
    }

    #[test]
    fn request_shape() {
        let request = Request {
            model: "claude-test",
            max_tokens: MAX_TOKENS,
            system: "You are a helpful assistant.",
            messages: [Message {
                role: "user",
                content: "hi",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["system"], "You are a helpful assistant.");
        assert_eq!(json["max_tokens"], 2048);
    }
}
