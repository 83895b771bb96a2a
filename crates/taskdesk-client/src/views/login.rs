//! Sign-in and registration.

use std::sync::Arc;

use taskdesk_core::auth::Credentials;
use tracing::warn;

use crate::{Session, service::AuthService};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginMode {
  #[default]
  Login,
  Register,
}

pub struct LoginForm<A: AuthService> {
  api:          Arc<A>,
  session:      Arc<Session>,
  pub email:    String,
  pub password: String,
  mode:         LoginMode,
  error:        Option<String>,
  busy:         bool,
}

impl<A: AuthService> LoginForm<A> {
  pub fn new(api: Arc<A>, session: Arc<Session>) -> Self {
    Self {
      api,
      session,
      email: String::new(),
      password: String::new(),
      mode: LoginMode::default(),
      error: None,
      busy: false,
    }
  }

  pub fn mode(&self) -> LoginMode { self.mode }

  pub fn error(&self) -> Option<&str> { self.error.as_deref() }

  pub fn is_busy(&self) -> bool { self.busy }

  pub fn toggle_mode(&mut self) {
    self.mode = match self.mode {
      LoginMode::Login => LoginMode::Register,
      LoginMode::Register => LoginMode::Login,
    };
    self.error = None;
  }

  /// Log in or register with the current fields. On success the issued
  /// token becomes the session credential and the password is cleared; on
  /// failure the message is kept on the form and the session is untouched.
  pub async fn submit(&mut self) -> bool {
    if self.busy {
      return false;
    }
    self.busy = true;
    self.error = None;

    let credentials = Credentials {
      email:    self.email.trim().to_owned(),
      password: self.password.clone(),
    };
    let result = match self.mode {
      LoginMode::Login => self.api.login(credentials).await,
      LoginMode::Register => self.api.register(credentials).await,
    };
    self.busy = false;

    match result {
      Ok(response) => {
        self.session.set_credential(response.access_token);
        self.password.clear();
        true
      }
      Err(e) => {
        warn!(mode = ?self.mode, error = %e, "sign-in failed");
        self.error = Some(e.to_string());
        false
      }
    }
  }
}
