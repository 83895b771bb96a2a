//! The remote call gateway.
//!
//! Every request to the server goes through [`Gateway::execute`], which
//! attaches the session's bearer credential and turns non-2xx responses into
//! typed [`GatewayError`]s. A 401 clears the session (broadcasting a logout)
//! before the call fails.

use std::{sync::Arc, time::Duration};

use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{GatewayError, Result, session::Session};

/// Async HTTP gateway to the task-tracking server.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct Gateway {
  client:   Client,
  base_url: String,
  session:  Arc<Session>,
}

impl Gateway {
  pub fn new(base_url: impl Into<String>, session: Arc<Session>) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_owned(),
      session,
    })
  }

  pub fn session(&self) -> &Arc<Session> { &self.session }

  fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }

  // ── Verbs ─────────────────────────────────────────────────────────────────

  pub async fn get<R: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<Option<R>> {
    self.execute(Method::GET, path, query, None).await
  }

  pub async fn send<B, R>(&self, method: Method, path: &str, body: &B) -> Result<Option<R>>
  where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
  {
    let body = serde_json::to_value(body)?;
    self.execute(method, path, &[], Some(body)).await
  }

  pub async fn delete(&self, path: &str) -> Result<()> {
    self
      .execute::<serde_json::Value>(Method::DELETE, path, &[], None)
      .await
      .map(|_| ())
  }

  // ── Core ──────────────────────────────────────────────────────────────────

  /// Issue one request. Resolves to `None` for 204 or an empty body.
  pub async fn execute<R: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    query: &[(&str, String)],
    body: Option<serde_json::Value>,
  ) -> Result<Option<R>> {
    let mut request = self.client.request(method.clone(), self.url(path)).query(query);
    if let Some(token) = self.session.token() {
      request = request.bearer_auth(token);
    }
    if let Some(body) = &body {
      request = request.json(body);
    }

    debug!(%method, path, "calling server");
    let response = request.send().await?;
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
      warn!(%method, path, "credential rejected");
      self.session.invalidate();
      return Err(GatewayError::Unauthorized);
    }

    if !status.is_success() {
      let text = response.text().await.unwrap_or_default();
      let message = error_message(status, &text);
      debug!(%method, path, status = status.as_u16(), %message, "call failed");
      return Err(GatewayError::Status { status: status.as_u16(), message });
    }

    if status == StatusCode::NO_CONTENT {
      return Ok(None);
    }

    let text = response.text().await?;
    if text.trim().is_empty() {
      return Ok(None);
    }
    Ok(Some(serde_json::from_str(&text)?))
  }
}

/// Use the body's `message` field if the server sent one, otherwise a
/// generic status-coded message.
fn error_message(status: StatusCode, body: &str) -> String {
  serde_json::from_str::<serde_json::Value>(body)
    .ok()
    .and_then(|v| v.get("message")?.as_str().map(str::to_owned))
    .filter(|m| !m.is_empty())
    .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Unwrap a response that must carry a body.
pub(crate) fn required<R>(value: Option<R>) -> Result<R> {
  value.ok_or(GatewayError::EmptyBody)
}

#[cfg(test)]
mod tests;
