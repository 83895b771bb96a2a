//! Login and registration payloads.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/auth/login` and `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
  pub email:    String,
  pub password: String,
}

/// Returned by a successful login or registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
  pub access_token: String,
}
