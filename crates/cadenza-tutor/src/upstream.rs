//! Minimal OpenAI-compatible chat-completions client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Connection settings for the upstream model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
  pub base_url:             String,
  pub model:                String,
  /// Used when the caller has no key of their own.
  pub api_key:              Option<String>,
  pub max_tokens:           u32,
  pub temperature:          f32,
  pub request_timeout_secs: u64,
  pub connect_timeout_secs: u64,
}

impl Default for UpstreamConfig {
  fn default() -> Self {
    Self {
      base_url:             DEFAULT_BASE_URL.to_owned(),
      model:                DEFAULT_MODEL.to_owned(),
      api_key:              None,
      max_tokens:           1024,
      temperature:          0.7,
      request_timeout_secs: 60,
      connect_timeout_secs: 10,
    }
  }
}

pub struct ChatClient {
  http:        reqwest::Client,
  base_url:    String,
  model:       String,
  max_tokens:  u32,
  temperature: f32,
}

impl ChatClient {
  pub fn new(config: &UpstreamConfig) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.request_timeout_secs))
      .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
      .build()
      .map_err(|e| Error::ClientBuild(e.to_string()))?;
    Ok(Self {
      http,
      base_url: config.base_url.trim_end_matches('/').to_owned(),
      model: config.model.clone(),
      max_tokens: config.max_tokens,
      temperature: config.temperature,
    })
  }

  /// One system + one user turn; returns the first choice's text.
  pub async fn complete(&self, api_key: &str, system: &str, user: &str) -> Result<String> {
    let messages = [
      CcMessage { role: "system", content: system },
      CcMessage { role: "user", content: user },
    ];
    let body = CcRequest {
      model:       &self.model,
      max_tokens:  self.max_tokens,
      temperature: self.temperature,
      messages:    &messages,
    };

    let url = format!("{}/chat/completions", self.base_url);
    tracing::debug!(%url, model = %self.model, "calling upstream model");
    let response = self.http.post(url).bearer_auth(api_key).json(&body).send().await?;

    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
      return Err(Error::Status { status: status.as_u16(), body: text });
    }
    parse_completion(&text)
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct CcRequest<'a> {
  model:       &'a str,
  max_tokens:  u32,
  temperature: f32,
  messages:    &'a [CcMessage<'a>],
}

#[derive(Serialize)]
struct CcMessage<'a> {
  role:    &'a str,
  content: &'a str,
}

#[derive(Deserialize)]
struct CcResponse {
  choices: Vec<CcChoice>,
}

#[derive(Deserialize)]
struct CcChoice {
  message: CcReplyMessage,
}

#[derive(Deserialize)]
struct CcReplyMessage {
  content: Option<String>,
}

fn parse_completion(body: &str) -> Result<String> {
  let parsed: CcResponse =
    serde_json::from_str(body).map_err(|e| Error::Parse(e.to_string()))?;
  parsed
    .choices
    .into_iter()
    .next()
    .and_then(|c| c.message.content)
    .filter(|c| !c.trim().is_empty())
    .ok_or_else(|| Error::Parse("response has no message content".into()))
}
