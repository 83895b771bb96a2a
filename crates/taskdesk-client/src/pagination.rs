//! Filtered pagination orchestrator.
//!
//! Binds a [`FilterSet`] and a page index to the page of entities last
//! fetched for them. Any filter change resets the page index to 0 and then
//! loads; any page change loads. Overlapping loads follow last-issued-wins.
//!
//! Mutations are fire-and-reload: a successful mutation always triggers a
//! fresh [`load`](ListController::load), a failed one surfaces its message
//! and leaves the list alone. A per-view busy flag serialises mutations.

use std::{future::Future, sync::Arc};

use taskdesk_core::{FilterSet, Page, PageRequest, Pager, page::DEFAULT_PAGE_SIZE};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
  GatewayError,
  latest::{LatestWins, Ticket},
  service::ListSource,
};

/// Handle for one submitted mutation, so owners can react to its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutationId(u64);

/// What applying one internal message did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEvent {
  Loaded,
  /// The server reported fewer pages than our index assumed; the index was
  /// pulled back to this page and a new load issued.
  Clamped(u32),
  LoadFailed,
  /// A load for superseded filter/page state finished and was ignored.
  Discarded,
  /// A call hit 401. The global logout path owns the consequences.
  Unauthorized,
  MutationSucceeded(MutationId),
  MutationFailed(MutationId),
}

enum Msg<T> {
  Loaded { ticket: Ticket, result: Result<Page<T>, GatewayError> },
  Mutated { id: MutationId, result: Result<(), GatewayError> },
}

type ItemOf<S> = <S as ListSource>::Item;
type FieldOf<S> = <<S as ListSource>::Filter as FilterSet>::Field;

pub struct ListController<S: ListSource> {
  source:        Arc<S>,
  filter:        S::Filter,
  page:          u32,
  page_size:     u32,
  data:          Option<Page<ItemOf<S>>>,
  loading:       bool,
  error:         Option<String>,
  busy:          bool,
  loads:         LatestWins,
  next_mutation: u64,
  tx:            mpsc::UnboundedSender<Msg<ItemOf<S>>>,
  rx:            mpsc::UnboundedReceiver<Msg<ItemOf<S>>>,
}

impl<S: ListSource> ListController<S> {
  pub fn new(source: Arc<S>) -> Self { Self::with_page_size(source, DEFAULT_PAGE_SIZE) }

  pub fn with_page_size(source: Arc<S>, page_size: u32) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      source,
      filter: S::Filter::default(),
      page: 0,
      page_size: page_size.max(1),
      data: None,
      loading: false,
      error: None,
      busy: false,
      loads: LatestWins::new(),
      next_mutation: 0,
      tx,
      rx,
    }
  }

  // ── Accessors ─────────────────────────────────────────────────────────────

  pub fn filter(&self) -> &S::Filter { &self.filter }

  pub fn page(&self) -> u32 { self.page }

  pub fn page_size(&self) -> u32 { self.page_size }

  /// The last successfully fetched page, if any.
  pub fn data(&self) -> Option<&Page<ItemOf<S>>> { self.data.as_ref() }

  pub fn items(&self) -> &[ItemOf<S>] {
    self.data.as_ref().map(|p| p.content.as_slice()).unwrap_or_default()
  }

  pub fn total_pages(&self) -> u32 { self.data.as_ref().map_or(0, |p| p.total_pages) }

  pub fn is_loading(&self) -> bool { self.loading }

  pub fn error(&self) -> Option<&str> { self.error.as_deref() }

  pub fn is_busy(&self) -> bool { self.busy }

  pub fn pager(&self) -> Pager { Pager::new(self.page, self.total_pages()) }

  /// Surface a locally produced message (e.g. form validation).
  pub fn set_error(&mut self, message: impl Into<String>) { self.error = Some(message.into()); }

  pub fn clear_error(&mut self) { self.error = None; }

  /// Takes effect from the next load.
  pub fn set_page_size(&mut self, page_size: u32) { self.page_size = page_size.max(1); }

  // ── Triggers ──────────────────────────────────────────────────────────────

  /// Fetch the page for the current filter and page index.
  pub fn load(&mut self) {
    let ticket = self.loads.issue();
    self.loading = true;
    self.error = None;

    let request = PageRequest {
      filter: self.filter.clone(),
      page:   self.page,
      size:   self.page_size,
    };
    debug!(page = request.page, filter = ?request.filter, "loading page");

    let source = Arc::clone(&self.source);
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = source.fetch(request).await;
      let _ = tx.send(Msg::Loaded { ticket, result });
    });
  }

  /// Change one filter field. A real change resets the page index to 0 and
  /// loads once; setting the same value again does nothing. Invalid values
  /// are rejected before anything changes.
  pub fn set_filter(&mut self, field: FieldOf<S>, value: &str) -> taskdesk_core::Result<bool> {
    let changed = self.filter.set(field, value)?;
    if changed {
      self.page = 0;
      self.load();
    }
    Ok(changed)
  }

  /// Replace the whole filter, reset to page 0, and load.
  pub fn apply_filter(&mut self, filter: S::Filter) {
    self.filter = filter;
    self.page = 0;
    self.load();
  }

  /// Clear every filter, reset to page 0, and load.
  pub fn reset_filters(&mut self) { self.apply_filter(S::Filter::default()); }

  /// Explicit re-run of the current filter from the first page.
  pub fn search(&mut self) {
    self.page = 0;
    self.load();
  }

  /// Move to `page` if it differs from the current one, then load.
  pub fn go_to(&mut self, page: u32) -> bool {
    if page == self.page {
      return false;
    }
    self.page = page;
    self.load();
    true
  }

  pub fn next_page(&mut self) -> bool {
    if !self.pager().can_next() {
      return false;
    }
    self.go_to(self.page + 1)
  }

  pub fn prev_page(&mut self) -> bool {
    if !self.pager().can_prev() {
      return false;
    }
    self.go_to(self.page - 1)
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  /// Run a mutating call. Refused (returns `None`) while another mutation
  /// from this view is in flight.
  pub fn mutate<F>(&mut self, action: &'static str, call: F) -> Option<MutationId>
  where
    F: Future<Output = Result<(), GatewayError>> + Send + 'static,
  {
    if self.busy {
      debug!(action, "mutation refused while busy");
      return None;
    }
    self.busy = true;
    self.error = None;
    self.next_mutation += 1;
    let id = MutationId(self.next_mutation);

    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = call.await;
      match &result {
        Ok(()) => info!(action, "mutation succeeded"),
        Err(e) => warn!(action, error = %e, "mutation failed"),
      }
      let _ = tx.send(Msg::Mutated { id, result });
    });
    Some(id)
  }

  // ── Async plumbing ────────────────────────────────────────────────────────

  /// Apply every message that is ready without waiting.
  pub fn pump(&mut self) -> Vec<ListEvent> {
    let mut events = Vec::new();
    while let Ok(msg) = self.rx.try_recv() {
      events.push(self.apply(msg));
    }
    events
  }

  /// Wait for the next message and apply it.
  pub async fn next_event(&mut self) -> ListEvent {
    match self.rx.recv().await {
      Some(msg) => self.apply(msg),
      None => ListEvent::Discarded,
    }
  }

  fn apply(&mut self, msg: Msg<ItemOf<S>>) -> ListEvent {
    match msg {
      Msg::Loaded { ticket, result } => self.apply_load(ticket, result),
      Msg::Mutated { id, result } => {
        self.busy = false;
        match result {
          Ok(()) => {
            self.load();
            ListEvent::MutationSucceeded(id)
          }
          Err(e) => {
            if !e.is_unauthorized() {
              self.error = Some(e.to_string());
            }
            ListEvent::MutationFailed(id)
          }
        }
      }
    }
  }

  fn apply_load(&mut self, ticket: Ticket, result: Result<Page<ItemOf<S>>, GatewayError>) -> ListEvent {
    if !self.loads.is_current(ticket) {
      debug!("discarding superseded page");
      return ListEvent::Discarded;
    }
    self.loading = false;

    match result {
      Ok(page) => {
        let clamped = Pager::new(self.page, page.total_pages).clamped();
        self.data = Some(page);
        if clamped != self.page {
          debug!(from = self.page, to = clamped, "page index out of range");
          self.page = clamped;
          self.load();
          return ListEvent::Clamped(clamped);
        }
        ListEvent::Loaded
      }
      Err(GatewayError::Unauthorized) => ListEvent::Unauthorized,
      Err(e) => {
        warn!(error = %e, "load failed; keeping previous page");
        self.error = Some(e.to_string());
        ListEvent::LoadFailed
      }
    }
  }
}
