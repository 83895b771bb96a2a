//! Interactive data layer for the Taskdesk client.
//!
//! Everything between the server and the screen lives here:
//!
//! - [`Session`] holds the bearer credential and broadcasts logout.
//! - [`Gateway`] performs authenticated HTTP calls and turns 401s into a
//!   session invalidation; [`ApiClient`] adds the typed endpoints.
//! - [`combobox::Combobox`] is the debounced, last-issued-wins search-select
//!   control.
//! - [`pagination::ListController`] keeps a fetched page consistent with its
//!   filters and page index.
//! - [`views`] composes those into role-gated screens.
//!
//! Async work is spawned on the ambient tokio runtime and reported back over
//! a channel owned by each state machine, so the owner applies results on its
//! own schedule (`pump` once per UI tick, or `step`/`next_event` in tests).

pub mod access;
pub mod api;
pub mod combobox;
pub mod debounce;
pub mod error;
pub mod gateway;
pub mod latest;
pub mod pagination;
pub mod service;
pub mod session;
pub mod views;

#[cfg(test)]
pub(crate) mod test_support;

pub use access::{Access, Capabilities};
pub use api::ApiClient;
pub use error::{GatewayError, Result, ViewError};
pub use gateway::Gateway;
pub use session::{Credential, LogoutReason, Session};
