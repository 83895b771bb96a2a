//! The selection contract shared by search-select controls and their owners.

/// A reference to a selectable entity: an optional identifier plus the label
/// shown to the user.
///
/// "No selection" is `id = None, label = ""`. An explicit unassignment hands
/// the owner this value, which is distinct from the owner not being called at
/// all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityRef {
  pub id:    Option<i64>,
  pub label: String,
}

impl EntityRef {
  pub fn new(id: i64, label: impl Into<String>) -> Self {
    Self { id: Some(id), label: label.into() }
  }

  /// The "no selection" value.
  pub fn none() -> Self { Self::default() }

  pub fn is_none(&self) -> bool { self.id.is_none() }

  /// Label to render, or `placeholder` when nothing is selected.
  pub fn display_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
    if self.label.is_empty() { placeholder } else { &self.label }
  }
}

/// Anything a search-select control can offer as a candidate.
pub trait Selectable {
  fn entity_ref(&self) -> EntityRef;
}
