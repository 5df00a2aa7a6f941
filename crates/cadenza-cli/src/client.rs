//! Async HTTP client wrapping the Cadenza JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Connection settings for the Cadenza API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub email:    String,
  pub password: String,
}

/// Async HTTP client for the Cadenza JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      // Model-backed tutor calls can take a while.
      .timeout(Duration::from_secs(90))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    let req = self.client.request(method, self.url(path));
    if self.config.email.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.email, Some(&self.config.password))
    }
  }

  async fn send(&self, req: RequestBuilder, what: &str) -> Result<Value> {
    let resp = req.send().await.with_context(|| format!("{what} failed"))?;
    let status = resp.status();
    if status == StatusCode::NO_CONTENT {
      return Ok(Value::Null);
    }
    let body = resp.text().await.with_context(|| format!("reading {what} response"))?;
    if !status.is_success() {
      return Err(anyhow!("{what} → {status}: {}", error_message(&body)));
    }
    serde_json::from_str(&body).with_context(|| format!("decoding {what} response"))
  }

  pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
    let what = format!("GET {path}");
    self.send(self.request(Method::GET, path).query(query), &what).await
  }

  pub async fn post(&self, path: &str, body: &impl Serialize) -> Result<Value> {
    let what = format!("POST {path}");
    self.send(self.request(Method::POST, path).json(body), &what).await
  }

  pub async fn put(&self, path: &str, body: &impl Serialize) -> Result<Value> {
    let what = format!("PUT {path}");
    self.send(self.request(Method::PUT, path).json(body), &what).await
  }

  pub async fn patch(&self, path: &str, body: &impl Serialize) -> Result<Value> {
    let what = format!("PATCH {path}");
    self.send(self.request(Method::PATCH, path).json(body), &what).await
  }

  pub async fn delete(&self, path: &str) -> Result<Value> {
    let what = format!("DELETE {path}");
    self.send(self.request(Method::DELETE, path), &what).await
  }
}

/// Decode a response into one of the API's own types.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
  serde_json::from_value(value).context("unexpected response shape")
}

/// The `error` field of an API error body, or the raw body.
fn error_message(body: &str) -> String {
  serde_json::from_str::<Value>(body)
    .ok()
    .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_owned))
    .unwrap_or_else(|| body.trim().to_owned())
}
