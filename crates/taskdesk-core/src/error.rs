//! Error types for `taskdesk-core`.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
  #[error("title must not be blank")]
  BlankTitle,

  #[error("title must be at most {max} characters")]
  TitleTooLong { max: usize },

  #[error("description must be at most {max} characters")]
  DescriptionTooLong { max: usize },

  #[error("unknown role: {0:?}")]
  UnknownRole(String),

  #[error("unknown task status: {0:?}")]
  UnknownStatus(String),

  #[error("invalid date {0:?}, expected YYYY-MM-DD")]
  InvalidDate(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
