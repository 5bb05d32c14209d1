use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::model::{Message, RemoteError, RemoteErrorKind};
use crate::providers::http_errors::{classify_response_failure, remote_transport_error};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

fn completions_url(base_url: &str) -> String {
    format!("{}/v1/chat/completions", base_url.trim_end_matches('/'))
}

fn to_wire_messages(messages: &[Message]) -> Vec<ChatMessage> {
    messages
        .iter()
        .map(|msg| ChatMessage {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        })
        .collect()
}

fn extract_reply(parsed: ChatCompletionResponse) -> Result<String, RemoteError> {
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| RemoteError::other("Model response contained no choices"))
}

pub async fn chat(
    client: &Client,
    cfg: &Config,
    messages: &[Message],
) -> Result<String, RemoteError> {
    let api_url = completions_url(&cfg.api_base_url);
    let body = ChatCompletionRequest {
        model: cfg.model.clone(),
        temperature: cfg.temperature,
        messages: to_wire_messages(messages),
    };
    debug!(
        api_url = %api_url,
        model = %cfg.model,
        message_count = messages.len(),
        "sending chat completion request"
    );

    let response = client
        .post(&api_url)
        .bearer_auth(&cfg.api_key)
        .json(&body)
        .send()
        .await
        .map_err(|err| {
            warn!(
                api_url = %api_url,
                model = %cfg.model,
                error = %err,
                "chat completion request failed"
            );
            remote_transport_error(err, &api_url, cfg.model_timeout_secs)
        })?;

    let status = response.status();
    if !status.is_success() {
        let response_body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string());
        warn!(
            api_url = %api_url,
            model = %cfg.model,
            status = %status,
            response_body_len = response_body.len(),
            "chat completion returned non-success status"
        );
        return Err(classify_response_failure(status, &response_body));
    }

    let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
        RemoteError::new(
            RemoteErrorKind::Other,
            format!("Failed to parse model chat response: {err}"),
        )
    })?;
    let reply = extract_reply(parsed)?;
    debug!(
        model = %cfg.model,
        response_len = reply.len(),
        "received chat completion response"
    );
    Ok(reply)
}
