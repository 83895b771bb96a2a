//! Role-gated capability sets.
//!
//! Views and the front-end ask an [`Access`] what the current user may do;
//! they never compare role strings. An absent or unrecognised role maps to
//! [`Access::Denied`], which grants nothing.

use taskdesk_core::{Role, task::TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
  Admin,
  Member,
  Denied,
}

/// What one access level is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
  pub view_tasks:        bool,
  pub view_all_tasks:    bool,
  pub filter_tasks:      bool,
  pub create_tasks:      bool,
  pub edit_tasks:        bool,
  pub delete_tasks:      bool,
  /// Any status on any task, through the editor.
  pub set_any_status:    bool,
  /// One of [`Capabilities::status_choices`] on the user's own tasks.
  pub change_own_status: bool,
  pub manage_users:      bool,
}

impl Capabilities {
  pub const ADMIN: Self = Self {
    view_tasks:        true,
    view_all_tasks:    true,
    filter_tasks:      true,
    create_tasks:      true,
    edit_tasks:        true,
    delete_tasks:      true,
    set_any_status:    true,
    change_own_status: true,
    manage_users:      true,
  };

  pub const MEMBER: Self = Self {
    view_tasks:        true,
    view_all_tasks:    false,
    filter_tasks:      true,
    create_tasks:      false,
    edit_tasks:        false,
    delete_tasks:      false,
    set_any_status:    false,
    change_own_status: true,
    manage_users:      false,
  };

  pub const NONE: Self = Self {
    view_tasks:        false,
    view_all_tasks:    false,
    filter_tasks:      false,
    create_tasks:      false,
    edit_tasks:        false,
    delete_tasks:      false,
    set_any_status:    false,
    change_own_status: false,
    manage_users:      false,
  };

  /// Statuses offered in the quick status picker.
  pub fn status_choices(&self) -> &'static [TaskStatus] {
    if self.change_own_status || self.set_any_status { &TaskStatus::ALL } else { &[] }
  }
}

impl Access {
  pub fn from_role(role: Option<Role>) -> Self {
    match role {
      Some(Role::Admin) => Self::Admin,
      Some(Role::User) => Self::Member,
      None => Self::Denied,
    }
  }

  pub fn capabilities(self) -> Capabilities {
    match self {
      Self::Admin => Capabilities::ADMIN,
      Self::Member => Capabilities::MEMBER,
      Self::Denied => Capabilities::NONE,
    }
  }

  pub fn is_admin(self) -> bool { self == Self::Admin }

  pub fn is_denied(self) -> bool { self == Self::Denied }

  /// Heading of the task list.
  pub fn tasks_title(self) -> &'static str {
    match self {
      Self::Admin => "All tasks",
      Self::Member | Self::Denied => "My tasks",
    }
  }

  /// Text shown when the task list is empty.
  pub fn tasks_empty_text(self) -> &'static str {
    match self {
      Self::Admin => "No tasks yet.",
      Self::Member | Self::Denied => "No tasks assigned yet.",
    }
  }
}
