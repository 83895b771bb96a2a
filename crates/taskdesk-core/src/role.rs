//! Authorization roles carried in the credential's role claim.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Authorization level of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
  User,
  Admin,
}

impl Role {
  pub const ALL: [Role; 2] = [Role::User, Role::Admin];

  pub fn as_str(self) -> &'static str {
    match self {
      Role::User => "USER",
      Role::Admin => "ADMIN",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Role {
  type Err = Error;

  /// Exact match only. Anything else is an unrecognised role, which callers
  /// must treat as "no role".
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "USER" => Ok(Role::User),
      "ADMIN" => Ok(Role::Admin),
      other => Err(Error::UnknownRole(other.to_owned())),
    }
  }
}
