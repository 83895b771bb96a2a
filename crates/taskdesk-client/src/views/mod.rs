//! View-level state: one struct per screen, each composed from the list
//! orchestrator, the combobox, and the role gate.

pub mod login;
pub mod tasks;
pub mod users;

pub use login::{LoginForm, LoginMode};
pub use tasks::{TaskForm, TasksView};
pub use users::UsersView;
