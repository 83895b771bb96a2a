//! Paged results and pager arithmetic.

use serde::{Deserialize, Serialize};

/// Page size used by list views unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// One page of a server-side result set.
///
/// `total_pages == 0` means the result set is empty, not "one page".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
  #[serde(default = "Vec::new")]
  pub content:        Vec<T>,
  #[serde(default)]
  pub total_pages:    u32,
  #[serde(default)]
  pub total_elements: u64,
  #[serde(default)]
  pub number:         u32,
  #[serde(default)]
  pub size:           u32,
}

impl<T> Page<T> {
  pub fn empty() -> Self {
    Self {
      content:        Vec::new(),
      total_pages:    0,
      total_elements: 0,
      number:         0,
      size:           0,
    }
  }

  pub fn is_empty(&self) -> bool { self.content.is_empty() }
}

/// A fetch request: filter values plus a 0-based page index and page size.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest<F> {
  pub filter: F,
  pub page:   u32,
  pub size:   u32,
}

impl<F: crate::FilterSet> PageRequest<F> {
  /// `page`, `size`, then the filter's non-empty fields.
  pub fn query_params(&self) -> Vec<(&'static str, String)> {
    let mut params = vec![("page", self.page.to_string()), ("size", self.size.to_string())];
    params.extend(self.filter.query_params());
    params
  }
}

/// Pager state derived from the current page index and the server's page
/// count. Clamping is the client's job; the server never does it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
  pub page:        u32,
  pub total_pages: u32,
}

impl Pager {
  pub fn new(page: u32, total_pages: u32) -> Self { Self { page, total_pages } }

  /// "Prev" is enabled iff we are past the first page.
  pub fn can_prev(&self) -> bool { self.page > 0 }

  /// "Next" is disabled when there are no results or we are on the last page.
  pub fn can_next(&self) -> bool {
    self.total_pages != 0 && self.page < self.total_pages - 1
  }

  /// Page count shown to the user; an empty set reads as one page.
  pub fn display_total(&self) -> u32 { self.total_pages.max(1) }

  pub fn label(&self) -> String {
    format!("Page {} / {}", self.page + 1, self.display_total())
  }

  /// The nearest valid page index for the current page count.
  pub fn clamped(&self) -> u32 {
    if self.total_pages == 0 {
      0
    } else {
      self.page.min(self.total_pages - 1)
    }
  }
}
