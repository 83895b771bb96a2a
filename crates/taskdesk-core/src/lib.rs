//! Core types for the Taskdesk client.
//!
//! This crate is deliberately free of HTTP and async-runtime dependencies.
//! It holds the wire shapes exchanged with the task-tracking server, the
//! filter and pagination arithmetic shared by every list view, and the
//! [`EntityRef`] contract used by search-select controls.

pub mod auth;
pub mod entity;
pub mod error;
pub mod filter;
pub mod page;
pub mod role;
pub mod task;
pub mod user;

pub use entity::{EntityRef, Selectable};
pub use error::{Error, Result};
pub use filter::FilterSet;
pub use page::{Page, PageRequest, Pager};
pub use role::Role;
