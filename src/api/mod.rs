mod http_errors;

use anyhow::{Context, Result, anyhow};
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::message::Message;
use http_errors::api_request_error;

/// Per-request knobs for a chat completion.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub json_mode: bool,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelInfo>,
}

/// One entry of the remote model catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub owned_by: String,
}

fn chat_completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn models_url(base_url: &str) -> String {
    format!("{}/models", base_url.trim_end_matches('/'))
}

fn model_url(base_url: &str, model_id: &str) -> String {
    format!("{}/models/{}", base_url.trim_end_matches('/'), model_id)
}

fn to_wire_messages(messages: &[Message]) -> Vec<WireMessage> {
    messages
        .iter()
        .map(|msg| WireMessage {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        })
        .collect()
}

fn build_request(model: &str, messages: &[Message], stream: bool, opts: &ChatOptions) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: to_wire_messages(messages),
        stream,
        max_tokens: opts.max_tokens,
        response_format: opts.json_mode.then_some(ResponseFormat {
            kind: "json_object",
        }),
    }
}

async fn send_request(
    client: &Client,
    cfg: &Config,
    api_url: &str,
    body: &ChatRequest,
) -> Result<reqwest::Response> {
    let response = client
        .post(api_url)
        .bearer_auth(cfg.api_key.as_deref().unwrap_or_default())
        .json(body)
        .send()
        .await
        .map_err(|err| {
            warn!(api_url = %api_url, model = %body.model, error = %err, "chat request failed");
            api_request_error(err, api_url, cfg.request_timeout_secs)
        })?;

    if !response.status().is_success() {
        let status = response.status();
        let response_body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string());
        warn!(
            api_url = %api_url,
            status = %status,
            response_body_len = response_body.len(),
            "chat request returned non-success status"
        );
        return Err(anyhow!(
            "Chat request failed with status {}: {}",
            status,
            response_body
        ));
    }

    Ok(response)
}

/// Request a completion for the full transcript and wait for the whole
/// response body.
pub async fn chat(
    client: &Client,
    cfg: &Config,
    model: &str,
    messages: &[Message],
    opts: &ChatOptions,
) -> Result<String> {
    let api_url = chat_completions_url(&cfg.base_url);
    let body = build_request(model, messages, false, opts);
    debug!(
        api_url = %api_url,
        model = %model,
        message_count = messages.len(),
        "sending chat request"
    );

    let response = send_request(client, cfg, &api_url, &body).await?;
    let parsed: ChatResponse = response
        .json()
        .await
        .context("Failed to parse chat completion response")?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| anyhow!("Chat completion response contained no choices"))?;

    debug!(model = %model, response_len = content.len(), "received chat response");
    Ok(content.trim().to_string())
}

#[derive(Debug, PartialEq, Eq)]
enum StreamEvent {
    Delta(String),
    Done,
}

/// Parse one server-sent-event line from the streaming endpoint.
/// Lines that carry no delta content (comments, empty keep-alives,
/// chunks without a `delta.content` field) yield `None`.
fn parse_stream_line(line: &str) -> Option<StreamEvent> {
    let payload = line.strip_prefix("data:")?.trim();
    if payload == "[DONE]" {
        return Some(StreamEvent::Done);
    }
    let value: Value = serde_json::from_str(payload).ok()?;
    let delta = value
        .get("choices")?
        .get(0)?
        .get("delta")?
        .get("content")?
        .as_str()?;
    Some(StreamEvent::Delta(delta.to_string()))
}

/// Accumulates streamed body chunks and joins the delta fragments.
/// Chunk boundaries fall anywhere, so bytes are buffered until a full
/// line is available.
#[derive(Debug, Default)]
struct StreamJoiner {
    buffer: Vec<u8>,
    joined: String,
    done: bool,
}

impl StreamJoiner {
    /// Feed one body chunk. Returns true once the done marker was seen;
    /// later chunks are then irrelevant.
    fn push_chunk(&mut self, bytes: &[u8]) -> bool {
        if self.done {
            return true;
        }
        self.buffer.extend_from_slice(bytes);
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            match parse_stream_line(line.trim_end()) {
                Some(StreamEvent::Delta(delta)) => self.joined.push_str(&delta),
                Some(StreamEvent::Done) => {
                    self.done = true;
                    return true;
                }
                None => {}
            }
        }
        self.done
    }

    /// A stream may end without the done marker and without a trailing
    /// newline; whatever event is still sitting in the buffer gets
    /// parsed rather than dropped.
    fn finish(mut self) -> String {
        if !self.done && !self.buffer.is_empty() {
            let line = String::from_utf8_lossy(&self.buffer);
            if let Some(StreamEvent::Delta(delta)) = parse_stream_line(line.trim_end()) {
                self.joined.push_str(&delta);
            }
        }
        self.joined
    }
}

/// Request a streamed completion and join the fragments. The joined
/// text is returned only once the stream is exhausted, so callers can
/// safely run Markdown rendering over it.
pub async fn chat_stream(
    client: &Client,
    cfg: &Config,
    model: &str,
    messages: &[Message],
    opts: &ChatOptions,
) -> Result<String> {
    let api_url = chat_completions_url(&cfg.base_url);
    let body = build_request(model, messages, true, opts);
    debug!(api_url = %api_url, model = %model, "sending streaming chat request");

    let response = send_request(client, cfg, &api_url, &body).await?;

    let mut stream = response.bytes_stream();
    let mut joiner = StreamJoiner::default();

    while let Some(chunk) = stream.next().await {
        let bytes = chunk.map_err(|err| api_request_error(err, &api_url, cfg.request_timeout_secs))?;
        if joiner.push_chunk(&bytes) {
            break;
        }
    }

    let joined = joiner.finish();
    debug!(model = %model, response_len = joined.len(), "streamed chat response complete");
    Ok(joined)
}

/// Fetch the remote model catalog.
pub async fn list_models(client: &Client, cfg: &Config) -> Result<Vec<ModelInfo>> {
    let api_url = models_url(&cfg.base_url);
    debug!(api_url = %api_url, "listing models");

    let response = client
        .get(&api_url)
        .bearer_auth(cfg.api_key.as_deref().unwrap_or_default())
        .send()
        .await
        .map_err(|err| api_request_error(err, &api_url, cfg.request_timeout_secs))?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Model listing failed with status {}",
            response.status()
        ));
    }

    let parsed: ModelList = response
        .json()
        .await
        .context("Failed to parse model list response")?;
    Ok(parsed.data)
}

/// Fetch the full metadata document for one model.
pub async fn retrieve_model(client: &Client, cfg: &Config, model_id: &str) -> Result<Value> {
    let api_url = model_url(&cfg.base_url, model_id);
    debug!(api_url = %api_url, "retrieving model info");

    let response = client
        .get(&api_url)
        .bearer_auth(cfg.api_key.as_deref().unwrap_or_default())
        .send()
        .await
        .map_err(|err| api_request_error(err, &api_url, cfg.request_timeout_secs))?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Model info request for '{}' failed with status {}",
            model_id,
            response.status()
        ));
    }

    response
        .json()
        .await
        .context("Failed to parse model info response")
}
