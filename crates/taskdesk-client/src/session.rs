//! Process-wide session context: the bearer credential, its decoded claims,
//! and the logout signal.
//!
//! The credential lives in a [`watch`] channel so readers can take a
//! snapshot per render and be told when it changes. Logouts go out on a
//! [`broadcast`] channel. A logout is only broadcast on the transition from
//! "credential present" to "absent", so concurrent 401s produce one signal.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;
use taskdesk_core::Role;
use tokio::sync::{broadcast, watch};
use tracing::info;

// ─── Credential ───────────────────────────────────────────────────────────────

/// Claims carried in the credential's payload segment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Claims {
  /// The account email.
  pub sub:  Option<String>,
  pub uid:  Option<i64>,
  pub role: Option<String>,
  pub exp:  Option<i64>,
}

impl Claims {
  /// Decode the middle segment of a `header.payload.signature` token.
  /// The signature is not checked; the server is the authority.
  pub fn decode(token: &str) -> Option<Self> {
    let mut segments = token.split('.');
    let _header = segments.next()?;
    let payload = segments.next()?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
  }
}

/// An opaque bearer token plus whatever could be decoded from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
  token:  String,
  claims: Option<Claims>,
}

impl Credential {
  pub fn new(token: impl Into<String>) -> Self {
    let token = token.into();
    let claims = Claims::decode(&token);
    Self { token, claims }
  }

  pub fn token(&self) -> &str { &self.token }

  pub fn claims(&self) -> Option<&Claims> { self.claims.as_ref() }

  /// Pure projection of the role claim. Missing, undecodable, or
  /// unrecognised claims all yield `None`.
  pub fn role(&self) -> Option<Role> {
    self.claims.as_ref()?.role.as_deref()?.parse().ok()
  }

  pub fn email(&self) -> Option<&str> { self.claims.as_ref()?.sub.as_deref() }
}

// ─── Session ──────────────────────────────────────────────────────────────────

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
  /// The user asked to log out.
  Explicit,
  /// A call came back 401.
  Unauthorized,
}

/// Shared session state. Wrap in an `Arc` and hand to every component that
/// calls the server or gates on role.
pub struct Session {
  credential: watch::Sender<Option<Credential>>,
  logout:     broadcast::Sender<LogoutReason>,
}

impl Default for Session {
  fn default() -> Self { Self::new() }
}

impl Session {
  pub fn new() -> Self {
    let (credential, _) = watch::channel(None);
    let (logout, _) = broadcast::channel(8);
    Self { credential, logout }
  }

  /// Snapshot of the current credential.
  pub fn credential(&self) -> Option<Credential> { self.credential.borrow().clone() }

  pub fn token(&self) -> Option<String> {
    self.credential.borrow().as_ref().map(|c| c.token.clone())
  }

  pub fn role(&self) -> Option<Role> { self.credential.borrow().as_ref()?.role() }

  pub fn is_authenticated(&self) -> bool { self.credential.borrow().is_some() }

  /// Store a freshly issued credential (login or registration).
  pub fn set_credential(&self, token: impl Into<String>) {
    let credential = Credential::new(token);
    info!(
      email = credential.email().unwrap_or("?"),
      role = ?credential.role(),
      "session started"
    );
    self.credential.send_replace(Some(credential));
  }

  /// Explicit logout. Returns `true` if a credential was cleared.
  pub fn logout(&self) -> bool { self.clear(LogoutReason::Explicit) }

  /// The server rejected the credential. Returns `true` if a credential was
  /// cleared (and hence a logout broadcast).
  pub fn invalidate(&self) -> bool { self.clear(LogoutReason::Unauthorized) }

  fn clear(&self, reason: LogoutReason) -> bool {
    let cleared = self.credential.send_if_modified(|c| c.take().is_some());
    if cleared {
      info!(?reason, "session ended");
      // No subscribers is fine; nobody is listening for the signal.
      let _ = self.logout.send(reason);
    }
    cleared
  }

  /// Subscribe to the logout signal.
  pub fn subscribe_logout(&self) -> broadcast::Receiver<LogoutReason> {
    self.logout.subscribe()
  }

  /// Subscribe to every credential change (set and clear).
  pub fn watch(&self) -> watch::Receiver<Option<Credential>> { self.credential.subscribe() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_support::token_with;

  #[test]
  fn role_is_decoded_from_claims() {
    let cred = Credential::new(token_with(r#"{"sub":"a@b.c","uid":1,"role":"ADMIN"}"#));
    assert_eq!(cred.role(), Some(Role::Admin));
    assert_eq!(cred.email(), Some("a@b.c"));
  }

  #[test]
  fn garbage_or_unknown_role_yields_no_role() {
    assert_eq!(Credential::new("not-a-token").role(), None);
    assert_eq!(Credential::new("a.%%%.c").role(), None);
    assert_eq!(Credential::new(token_with(r#"{"role":"ROOT"}"#)).role(), None);
    assert_eq!(Credential::new(token_with(r#"{"sub":"x"}"#)).role(), None);
  }

  #[test]
  fn padded_payload_still_decodes() {
    let payload = base64::engine::general_purpose::URL_SAFE.encode(r#"{"role":"USER"}"#);
    let cred = Credential::new(format!("h.{payload}.s"));
    assert_eq!(cred.role(), Some(Role::User));
  }

  #[tokio::test]
  async fn invalidate_broadcasts_once() {
    let session = Session::new();
    let mut rx = session.subscribe_logout();
    session.set_credential(token_with(r#"{"role":"USER"}"#));

    assert!(session.invalidate());
    assert!(!session.invalidate());
    assert!(!session.logout());

    assert_eq!(rx.recv().await.unwrap(), LogoutReason::Unauthorized);
    assert!(rx.try_recv().is_err());
    assert!(!session.is_authenticated());
    assert_eq!(session.role(), None);
  }

  #[tokio::test]
  async fn watchers_see_set_and_clear() {
    let session = Session::new();
    let mut watch = session.watch();

    session.set_credential(token_with(r#"{"role":"ADMIN"}"#));
    watch.changed().await.unwrap();
    assert!(watch.borrow_and_update().is_some());

    session.logout();
    watch.changed().await.unwrap();
    assert!(watch.borrow_and_update().is_none());
  }

  #[test]
  fn logout_without_credential_is_silent() {
    let session = Session::new();
    let mut rx = session.subscribe_logout();
    assert!(!session.logout());
    assert!(rx.try_recv().is_err());
  }
}
