//! The filter half of a list view's fetch state.
//!
//! A filter set maps a fixed set of fields to string values. An empty value
//! means "no constraint" and is never sent to the server.

use std::fmt::Debug;

use chrono::NaiveDate;

use crate::Result;

/// A typed set of filter fields for one list endpoint.
///
/// `set` reports whether the value actually changed so that owners can
/// trigger exactly one reload per real change.
pub trait FilterSet: Clone + Default + PartialEq + Debug + Send + Sync + 'static {
  type Field: Copy + Eq + Debug + Send + Sync + 'static;

  /// Current raw value of `field` (`""` when unconstrained).
  fn get(&self, field: Self::Field) -> &str;

  /// Validate and store `value`. Returns `Ok(true)` if the stored value
  /// changed.
  fn set(&mut self, field: Self::Field, value: &str) -> Result<bool>;

  /// Query parameters for the non-empty fields, in a stable order.
  fn query_params(&self) -> Vec<(&'static str, String)>;

  /// `true` when no field constrains the result set.
  fn is_unconstrained(&self) -> bool { self.query_params().is_empty() }
}

/// Parse an optional ISO calendar date. Empty input means "no date".
pub fn parse_date(raw: &str) -> Result<Option<NaiveDate>> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Ok(None);
  }
  NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
    .map(Some)
    .map_err(|_| crate::Error::InvalidDate(trimmed.to_owned()))
}

/// Replace `slot` with `value` and report whether it changed.
pub(crate) fn replace(slot: &mut String, value: String) -> bool {
  if *slot == value {
    return false;
  }
  *slot = value;
  true
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_date_accepts_iso_and_empty() {
    assert_eq!(parse_date("").unwrap(), None);
    assert_eq!(parse_date("  ").unwrap(), None);
    assert_eq!(
      parse_date("2026-03-01").unwrap(),
      NaiveDate::from_ymd_opt(2026, 3, 1)
    );
  }

  #[test]
  fn parse_date_rejects_garbage() {
    assert!(parse_date("01/03/2026").is_err());
    assert!(parse_date("2026-13-01").is_err());
  }
}
