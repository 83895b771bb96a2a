//! Search-select combobox.
//!
//! Lets the user pick zero or one entity from a remotely searchable set. The
//! owner keeps the selected [`EntityRef`]; the combobox owns everything
//! else: open state, query text, debounced lookups, the result list, and the
//! keyboard cursor.
//!
//! ```text
//! Closed ──open──▶ Open(Empty) ──query ≥ 2, quiet 250ms──▶ Open(Querying)
//!                       ▲                                      │
//!                       └──── query < 2 ────┐                  ▼
//!                                           Open(Results) | Open(NoResults)
//! any Open(*) ──escape / dismiss / commit / clear──▶ Closed
//! ```
//!
//! Lookups follow last-issued-wins: every query change invalidates the
//! outstanding ticket, so a slow early response can never replace a newer
//! one. Search failures degrade to "no matches".

use std::{sync::Arc, time::Duration};

use taskdesk_core::{EntityRef, Selectable};
use tokio::sync::mpsc;
use tracing::debug;

use crate::{
  GatewayError,
  debounce::{Debouncer, SEARCH_DEBOUNCE},
  latest::{LatestWins, Ticket},
  service::SearchSource,
};

/// Queries shorter than this (after trimming, in chars) never hit the server.
pub const MIN_QUERY_CHARS: usize = 2;

// ─── State ────────────────────────────────────────────────────────────────────

/// What the open dropdown is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
  /// Query too short to search.
  Empty,
  /// A lookup is in flight.
  Querying,
  Results,
  NoResults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboState {
  Closed,
  Open(Listing),
}

/// Keys the combobox understands while open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboKey {
  Down,
  Up,
  Enter,
  Escape,
}

/// What applying one internal message did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
  /// The debounce elapsed and a lookup for this query went out.
  Issued(String),
  /// A lookup result was applied.
  Applied,
  /// A result or timer arrived for a superseded query and was dropped.
  Discarded,
}

enum Msg<T> {
  Fire { ticket: Ticket, query: String },
  Settled { ticket: Ticket, result: Result<Vec<T>, GatewayError> },
}

// ─── Combobox ─────────────────────────────────────────────────────────────────

pub struct Combobox<S: SearchSource> {
  source:         Arc<S>,
  state:          ComboState,
  query:          String,
  results:        Vec<S::Item>,
  active:         Option<usize>,
  disabled:       bool,
  focus_pending:  bool,
  lookups:        LatestWins,
  debounce:       Debouncer,
  tx:             mpsc::UnboundedSender<Msg<S::Item>>,
  rx:             mpsc::UnboundedReceiver<Msg<S::Item>>,
}

impl<S: SearchSource> Combobox<S> {
  pub fn new(source: Arc<S>) -> Self { Self::with_debounce(source, SEARCH_DEBOUNCE) }

  pub fn with_debounce(source: Arc<S>, delay: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      source,
      state: ComboState::Closed,
      query: String::new(),
      results: Vec::new(),
      active: None,
      disabled: false,
      focus_pending: false,
      lookups: LatestWins::new(),
      debounce: Debouncer::new(delay),
      tx,
      rx,
    }
  }

  // ── Accessors ─────────────────────────────────────────────────────────────

  pub fn state(&self) -> ComboState { self.state }

  pub fn is_open(&self) -> bool { matches!(self.state, ComboState::Open(_)) }

  pub fn query(&self) -> &str { &self.query }

  pub fn results(&self) -> &[S::Item] { &self.results }

  pub fn active(&self) -> Option<usize> { self.active }

  pub fn is_disabled(&self) -> bool { self.disabled }

  /// Returns `true` once after `open` so the renderer can focus the input.
  pub fn take_focus_request(&mut self) -> bool { std::mem::take(&mut self.focus_pending) }

  // ── Open / close ──────────────────────────────────────────────────────────

  /// A disabled combobox refuses to open and closes if it is open.
  pub fn set_disabled(&mut self, disabled: bool) {
    self.disabled = disabled;
    if disabled {
      self.close();
    }
  }

  /// `Closed → Open(Empty)`. Starts from a blank query so nothing stale
  /// flashes. No-op if already open or disabled.
  pub fn open(&mut self) {
    if self.disabled || self.is_open() {
      return;
    }
    self.reset_query_state();
    self.state = ComboState::Open(Listing::Empty);
    self.focus_pending = true;
  }

  pub fn toggle(&mut self) {
    if self.is_open() { self.close() } else { self.open() }
  }

  /// Close without committing, discarding query, results, and any pending
  /// or in-flight lookup.
  pub fn close(&mut self) {
    self.reset_query_state();
    self.state = ComboState::Closed;
  }

  /// Pointer or focus moved outside the control.
  pub fn dismiss(&mut self) { self.close(); }

  fn reset_query_state(&mut self) {
    self.debounce.cancel();
    self.lookups.invalidate();
    self.query.clear();
    self.results.clear();
    self.active = None;
    self.focus_pending = false;
  }

  // ── Query ─────────────────────────────────────────────────────────────────

  /// Store the raw text and (re)schedule the lookup. Ignored while closed.
  pub fn set_query(&mut self, text: impl Into<String>) {
    if !self.is_open() {
      return;
    }
    self.query = text.into();
    self.active = None;
    self.debounce.cancel();
    self.lookups.invalidate();

    let trimmed = self.query.trim();
    if trimmed.chars().count() < MIN_QUERY_CHARS {
      self.results.clear();
      self.state = ComboState::Open(Listing::Empty);
      return;
    }

    let ticket = self.lookups.issue();
    let query = trimmed.to_owned();
    let tx = self.tx.clone();
    self.debounce.schedule(async move {
      let _ = tx.send(Msg::Fire { ticket, query });
    });
  }

  pub fn push_char(&mut self, c: char) {
    let mut text = self.query.clone();
    text.push(c);
    self.set_query(text);
  }

  pub fn pop_char(&mut self) {
    let mut text = self.query.clone();
    if text.pop().is_some() {
      self.set_query(text);
    }
  }

  // ── Keyboard ──────────────────────────────────────────────────────────────

  /// Handle a key while open. Returns the committed entity on Enter.
  pub fn handle_key(&mut self, key: ComboKey) -> Option<EntityRef> {
    if !self.is_open() {
      return None;
    }
    match key {
      ComboKey::Down => {
        if let Some(last) = self.results.len().checked_sub(1) {
          self.active = Some(self.active.map_or(0, |i| (i + 1).min(last)));
        }
        None
      }
      ComboKey::Up => {
        if !self.results.is_empty() {
          self.active = Some(self.active.map_or(0, |i| i.saturating_sub(1)));
        }
        None
      }
      ComboKey::Enter => self.active.and_then(|i| self.commit(i)),
      ComboKey::Escape => {
        self.close();
        None
      }
    }
  }

  /// Pointer hover over a result row.
  pub fn set_active(&mut self, index: usize) {
    if index < self.results.len() {
      self.active = Some(index);
    }
  }

  // ── Selection ─────────────────────────────────────────────────────────────

  /// Select the result at `index` and close.
  pub fn commit(&mut self, index: usize) -> Option<EntityRef> {
    let entity = self.results.get(index)?.entity_ref();
    self.close();
    Some(entity)
  }

  /// Explicit unassignment: always hands back the "no selection" value.
  pub fn clear(&mut self) -> EntityRef {
    self.close();
    EntityRef::none()
  }

  // ── Async plumbing ────────────────────────────────────────────────────────

  /// Apply every message that is ready without waiting. Call once per UI
  /// tick.
  pub fn pump(&mut self) -> Vec<Step> {
    let mut steps = Vec::new();
    while let Ok(msg) = self.rx.try_recv() {
      steps.push(self.apply(msg));
    }
    steps
  }

  /// Wait for the next message and apply it.
  pub async fn step(&mut self) -> Step {
    match self.rx.recv().await {
      Some(msg) => self.apply(msg),
      // We hold a sender, so the channel never closes.
      None => Step::Discarded,
    }
  }

  fn apply(&mut self, msg: Msg<S::Item>) -> Step {
    match msg {
      Msg::Fire { ticket, query } => {
        if !self.is_open() || !self.lookups.is_current(ticket) {
          return Step::Discarded;
        }
        // Results from an older query must not stay on screen (or stay
        // selectable) once a newer one is in flight.
        self.results.clear();
        self.active = None;
        self.state = ComboState::Open(Listing::Querying);
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let q = query.clone();
        // Never aborted: a superseded lookup completes and is discarded.
        tokio::spawn(async move {
          let result = source.search(q).await;
          let _ = tx.send(Msg::Settled { ticket, result });
        });
        Step::Issued(query)
      }
      Msg::Settled { ticket, result } => {
        if !self.is_open() || !self.lookups.is_current(ticket) {
          debug!("discarding superseded search result");
          return Step::Discarded;
        }
        self.active = None;
        match result {
          Ok(items) if !items.is_empty() => {
            self.results = items;
            self.state = ComboState::Open(Listing::Results);
          }
          Ok(_) => {
            self.results.clear();
            self.state = ComboState::Open(Listing::NoResults);
          }
          Err(e) => {
            debug!(error = %e, "search failed; showing no matches");
            self.results.clear();
            self.state = ComboState::Open(Listing::NoResults);
          }
        }
        Step::Applied
      }
    }
  }
}
