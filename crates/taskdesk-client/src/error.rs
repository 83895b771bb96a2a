//! Error types for `taskdesk-client`.

use thiserror::Error;

/// A failed remote call, as surfaced by the [`Gateway`](crate::Gateway).
#[derive(Debug, Error)]
pub enum GatewayError {
  /// The server rejected (or did not receive) a valid credential. The
  /// gateway has already cleared the session and broadcast a logout.
  #[error("Unauthorized")]
  Unauthorized,

  /// Any other non-2xx response. `message` is taken from the response body
  /// when the server supplied one.
  #[error("{message}")]
  Status { status: u16, message: String },

  #[error("network error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("unexpected response body: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("server returned an empty body")]
  EmptyBody,
}

impl GatewayError {
  /// Unauthorized failures are owned by the global logout path; views must
  /// not surface or react to them locally.
  pub fn is_unauthorized(&self) -> bool { matches!(self, Self::Unauthorized) }
}

/// A view refused an action before any network call was made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViewError {
  #[error("access denied")]
  AccessDenied,

  #[error("not permitted for your role")]
  Forbidden,

  #[error("another change is still being saved")]
  Busy,

  #[error(transparent)]
  Invalid(#[from] taskdesk_core::Error),
}

pub type Result<T, E = GatewayError> = std::result::Result<T, E>;
