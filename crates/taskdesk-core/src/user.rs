//! User accounts as seen by the search endpoint and the admin list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  EntityRef, Result, Role, Selectable,
  filter::{FilterSet, replace},
};

/// Lightweight search result from `GET /api/users?q=`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOption {
  pub id:    i64,
  pub email: String,
}

impl Selectable for UserOption {
  fn entity_ref(&self) -> EntityRef { EntityRef::new(self.id, self.email.clone()) }
}

/// Admin-level view of an account from `GET /api/admin/users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
  pub id:         i64,
  pub email:      String,
  pub role:       String,
  pub created_at: Option<DateTime<Utc>>,
}

impl UserAccount {
  /// The account's role, or `None` if the server sent one we don't know.
  pub fn role(&self) -> Option<Role> { self.role.parse().ok() }
}

/// Body of `PATCH /api/admin/users/{id}/role`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RoleUpdate {
  pub role: Role,
}

// ─── Filter ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserFilterField {
  Query,
}

/// Filters accepted by `GET /api/admin/users`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
  q: String,
}

impl FilterSet for UserFilter {
  type Field = UserFilterField;

  fn get(&self, field: UserFilterField) -> &str {
    match field {
      UserFilterField::Query => &self.q,
    }
  }

  fn set(&mut self, field: UserFilterField, value: &str) -> Result<bool> {
    match field {
      UserFilterField::Query => Ok(replace(&mut self.q, value.trim().to_owned())),
    }
  }

  fn query_params(&self) -> Vec<(&'static str, String)> {
    if self.q.is_empty() {
      Vec::new()
    } else {
      vec![("q", self.q.clone())]
    }
  }
}
