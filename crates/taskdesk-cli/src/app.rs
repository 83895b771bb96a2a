//! Application state machine and event dispatcher.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use taskdesk_client::{
  Access, ApiClient, LogoutReason, Session, ViewError,
  combobox::ComboKey,
  views::{LoginForm, TasksView, UsersView},
};
use taskdesk_core::{
  FilterSet, Role,
  page::DEFAULT_PAGE_SIZE,
  task::{Task, TaskFilterField, TaskStatus},
  user::UserAccount,
};
use tracing::info;

// ─── Screen & focus ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  Login,
  Tasks,
  /// Admin only.
  Users,
  /// Signed in, but the role claim is missing or unknown.
  Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
  Email,
  Password,
}

/// Which pane of the tasks screen receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFocus {
  List,
  Filters,
  Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
  Title,
  Description,
  Status,
  Deadline,
  Assignee,
}

impl FormField {
  pub const ALL: [FormField; 5] = [
    FormField::Title,
    FormField::Description,
    FormField::Status,
    FormField::Deadline,
    FormField::Assignee,
  ];

  pub fn label(self) -> &'static str {
    match self {
      FormField::Title => "Title",
      FormField::Description => "Description",
      FormField::Status => "Status",
      FormField::Deadline => "Deadline",
      FormField::Assignee => "Assignee",
    }
  }
}

pub const FILTER_FIELDS: [TaskFilterField; 3] =
  [TaskFilterField::Status, TaskFilterField::DeadlineFrom, TaskFilterField::DeadlineTo];

pub fn filter_label(field: TaskFilterField) -> &'static str {
  match field {
    TaskFilterField::Status => "Status",
    TaskFilterField::DeadlineFrom => "Deadline from",
    TaskFilterField::DeadlineTo => "Deadline to",
  }
}

/// Move `index` one step through `len` entries, wrapping.
fn cycle(index: usize, len: usize, forward: bool) -> usize {
  if forward { (index + 1) % len } else { (index + len - 1) % len }
}

/// Show a refused or failed action in the status bar.
fn note<T>(status_msg: &mut String, result: Result<T, ViewError>) {
  match result {
    Ok(_) => status_msg.clear(),
    Err(e) => *status_msg = format!("Error: {e}"),
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Current screen.
  pub screen: Screen,

  pub session: Arc<Session>,
  pub api:     Arc<ApiClient>,

  pub login:       LoginForm<ApiClient>,
  pub login_field: LoginField,

  /// Capability set for the signed-in user; `Denied` while signed out.
  pub access:    Access,
  /// Rows per page in list views.
  pub page_size: u32,

  /// Present while signed in with a role that may see tasks.
  pub tasks:        Option<TasksView<ApiClient>>,
  pub task_focus:   TaskFocus,
  pub task_cursor:  usize,
  pub form_field:   FormField,
  pub filter_field: TaskFilterField,
  /// Text being typed into a deadline filter; applied on Enter.
  pub filter_draft: String,

  /// Present while signed in as an admin.
  pub users:          Option<UsersView<ApiClient>>,
  pub user_cursor:    usize,
  pub user_searching: bool,

  /// A delete waiting for `y`: the screen it was asked from and the id.
  pub pending_delete: Option<(Screen, i64)>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,
}

impl App {
  pub fn new(api: ApiClient, session: Arc<Session>) -> Self {
    let api = Arc::new(api);
    Self {
      screen: Screen::Login,
      login: LoginForm::new(Arc::clone(&api), Arc::clone(&session)),
      session,
      api,
      login_field: LoginField::Email,
      access: Access::Denied,
      page_size: DEFAULT_PAGE_SIZE,
      tasks: None,
      task_focus: TaskFocus::List,
      task_cursor: 0,
      form_field: FormField::Title,
      filter_field: TaskFilterField::Status,
      filter_draft: String::new(),
      users: None,
      user_cursor: 0,
      user_searching: false,
      pending_delete: None,
      status_msg: String::new(),
    }
  }

  // ── Session ───────────────────────────────────────────────────────────────

  /// Submit the login form; on success build the screens for the new role.
  pub async fn login(&mut self) {
    self.status_msg = "Signing in…".into();
    if self.login.submit().await {
      self.enter_session();
    } else {
      self.status_msg.clear();
    }
  }

  fn enter_session(&mut self) {
    self.access = Access::from_role(self.session.role());
    info!(access = ?self.access, "entering session");

    self.users = UsersView::new(Arc::clone(&self.api), self.access)
      .ok()
      .map(|v| v.with_page_size(self.page_size));
    match TasksView::new(Arc::clone(&self.api), self.access) {
      Ok(view) => {
        let mut view = view.with_page_size(self.page_size);
        view.load();
        self.tasks = Some(view);
        self.screen = Screen::Tasks;
      }
      Err(_) => {
        self.tasks = None;
        self.screen = Screen::Denied;
      }
    }
    self.task_focus = TaskFocus::List;
    self.task_cursor = 0;
    self.user_cursor = 0;
    self.status_msg.clear();
  }

  /// The session ended, explicitly or because the server rejected the
  /// credential. Drops every signed-in view.
  pub fn on_logout(&mut self, reason: LogoutReason) {
    self.tasks = None;
    self.users = None;
    self.access = Access::Denied;
    self.screen = Screen::Login;
    self.login_field = LoginField::Email;
    self.user_searching = false;
    self.pending_delete = None;
    self.filter_draft.clear();
    self.status_msg = match reason {
      LogoutReason::Explicit => "Signed out.".into(),
      LogoutReason::Unauthorized => "Session expired. Please sign in again.".into(),
    };
  }

  // ── Tick ──────────────────────────────────────────────────────────────────

  /// Apply finished background work. Called once per frame.
  pub fn tick(&mut self) {
    if let Some(view) = self.tasks.as_mut() {
      view.pump();
      let len = view.list().items().len();
      self.task_cursor = self.task_cursor.min(len.saturating_sub(1));
    }
    if let Some(view) = self.users.as_mut() {
      view.pump();
      let len = view.list().items().len();
      self.user_cursor = self.user_cursor.min(len.saturating_sub(1));
    }
  }

  pub fn cursor_task(&self) -> Option<&Task> {
    self.tasks.as_ref()?.list().items().get(self.task_cursor)
  }

  pub fn cursor_user(&self) -> Option<&UserAccount> {
    self.users.as_ref()?.list().items().get(self.user_cursor)
  }

  /// `true` when printable keys are text rather than commands.
  pub fn is_typing(&self) -> bool {
    match self.screen {
      Screen::Login => true,
      Screen::Tasks => match self.task_focus {
        TaskFocus::List => false,
        TaskFocus::Filters => self.filter_field != TaskFilterField::Status,
        TaskFocus::Form => {
          matches!(self.form_field, FormField::Title | FormField::Description | FormField::Deadline)
            || self.tasks.as_ref().is_some_and(|v| v.assignee().is_open())
        }
      },
      Screen::Users => self.user_searching,
      Screen::Denied => false,
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    if let Some((screen, id)) = self.pending_delete.take() {
      self.confirm_delete(screen, id, key.code == KeyCode::Char('y'));
      return Ok(true);
    }

    if !self.is_typing() {
      match key.code {
        KeyCode::Char('q') => return Ok(false),
        KeyCode::Char('L') => {
          // The logout broadcast brings us back to the login screen.
          self.session.logout();
          return Ok(true);
        }
        _ => {}
      }
    }

    match self.screen {
      Screen::Login => self.handle_login_key(key).await,
      Screen::Tasks => self.handle_tasks_key(key),
      Screen::Users => self.handle_users_key(key),
      Screen::Denied => {}
    }
    Ok(true)
  }

  fn ask_delete(&mut self, what: &str, id: i64) {
    self.pending_delete = Some((self.screen, id));
    self.status_msg = format!("Delete {what} #{id}? (y/n)");
  }

  fn confirm_delete(&mut self, screen: Screen, id: i64, confirmed: bool) {
    if !confirmed {
      self.status_msg = "Delete cancelled.".into();
      return;
    }
    match screen {
      Screen::Tasks => {
        if let Some(view) = self.tasks.as_mut() {
          note(&mut self.status_msg, view.delete(id));
        }
      }
      Screen::Users => {
        if let Some(view) = self.users.as_mut() {
          note(&mut self.status_msg, view.delete(id));
        }
      }
      Screen::Login | Screen::Denied => {}
    }
  }

  async fn handle_login_key(&mut self, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
      self.login.toggle_mode();
      return;
    }
    let field = match self.login_field {
      LoginField::Email => &mut self.login.email,
      LoginField::Password => &mut self.login.password,
    };
    match key.code {
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
        self.login_field = match self.login_field {
          LoginField::Email => LoginField::Password,
          LoginField::Password => LoginField::Email,
        };
      }
      KeyCode::Backspace => {
        field.pop();
      }
      KeyCode::Char(c) => field.push(c),
      KeyCode::Enter => self.login().await,
      _ => {}
    }
  }

  // ── Tasks screen ──────────────────────────────────────────────────────────

  fn handle_tasks_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Tab {
      self.cycle_task_focus();
      return;
    }
    match self.task_focus {
      TaskFocus::List => self.handle_task_list_key(key),
      TaskFocus::Filters => self.handle_filter_key(key),
      TaskFocus::Form => self.handle_form_key(key),
    }
  }

  fn cycle_task_focus(&mut self) {
    let can_edit = self.access.capabilities().edit_tasks;
    if let Some(view) = self.tasks.as_mut() {
      view.assignee_mut().close();
    }
    let next = match self.task_focus {
      TaskFocus::List => TaskFocus::Filters,
      TaskFocus::Filters if can_edit => TaskFocus::Form,
      TaskFocus::Filters | TaskFocus::Form => TaskFocus::List,
    };
    if next == TaskFocus::Filters {
      self.focus_filter(self.filter_field);
    }
    self.task_focus = next;
  }

  fn handle_task_list_key(&mut self, key: KeyEvent) {
    let caps = self.access.capabilities();
    let cursor_id = self.cursor_task().map(|t| t.id);
    let Some(view) = self.tasks.as_mut() else { return };
    let len = view.list().items().len();

    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        if self.task_cursor + 1 < len {
          self.task_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.task_cursor = self.task_cursor.saturating_sub(1);
      }
      KeyCode::Char(']') | KeyCode::PageDown => {
        if view.list_mut().next_page() {
          self.task_cursor = 0;
        }
      }
      KeyCode::Char('[') | KeyCode::PageUp => {
        if view.list_mut().prev_page() {
          self.task_cursor = 0;
        }
      }
      KeyCode::Char('/') => {
        self.task_focus = TaskFocus::Filters;
        self.focus_filter(TaskFilterField::Status);
      }
      KeyCode::Char('r') => view.list_mut().reset_filters(),
      KeyCode::Char('g') => {
        view.refresh();
        self.task_cursor = 0;
      }

      // Quick status change for the task under the cursor.
      KeyCode::Char(c @ '1'..='3') => {
        if let Some(id) = cursor_id {
          let status = TaskStatus::ALL[c as usize - '1' as usize];
          note(&mut self.status_msg, view.change_status(id, status));
        }
      }

      // Editor (admin only; the view refuses otherwise).
      KeyCode::Char('n') if caps.create_tasks => {
        view.reset_form();
        self.task_focus = TaskFocus::Form;
        self.form_field = FormField::Title;
      }
      KeyCode::Enter | KeyCode::Char('e') if caps.edit_tasks => {
        if let Some(task) = view.list().items().get(self.task_cursor).cloned() {
          note(&mut self.status_msg, view.start_edit(&task));
          self.task_focus = TaskFocus::Form;
          self.form_field = FormField::Title;
        }
      }
      KeyCode::Char('a') if caps.edit_tasks => {
        view.assignee_mut().open();
        self.task_focus = TaskFocus::Form;
        self.form_field = FormField::Assignee;
      }
      KeyCode::Char('d') if caps.delete_tasks => {
        if let Some(id) = cursor_id {
          self.ask_delete("task", id);
        }
      }

      KeyCode::Char('u') if caps.manage_users => self.show_users(),
      _ => {}
    }
  }

  fn focus_filter(&mut self, field: TaskFilterField) {
    self.filter_field = field;
    self.filter_draft = self
      .tasks
      .as_ref()
      .map(|v| v.list().filter().get(field).to_owned())
      .unwrap_or_default();
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    let index = FILTER_FIELDS.iter().position(|f| *f == self.filter_field).unwrap_or(0);
    match key.code {
      KeyCode::Esc => {
        self.task_focus = TaskFocus::List;
        return;
      }
      KeyCode::Down => {
        self.focus_filter(FILTER_FIELDS[cycle(index, FILTER_FIELDS.len(), true)]);
        return;
      }
      KeyCode::Up => {
        self.focus_filter(FILTER_FIELDS[cycle(index, FILTER_FIELDS.len(), false)]);
        return;
      }
      _ => {}
    }

    let field = self.filter_field;
    let Some(view) = self.tasks.as_mut() else { return };

    if field == TaskFilterField::Status {
      // "" then each status, applied immediately.
      let forward = match key.code {
        KeyCode::Right | KeyCode::Enter => true,
        KeyCode::Left => false,
        _ => return,
      };
      let current = view.list().filter().status();
      let position = current.and_then(|s| TaskStatus::ALL.iter().position(|x| *x == s));
      let slot = position.map_or(0, |p| p + 1);
      let next = cycle(slot, TaskStatus::ALL.len() + 1, forward);
      let value = next.checked_sub(1).map_or("", |i| TaskStatus::ALL[i].as_str());
      note(&mut self.status_msg, view.list_mut().set_filter(field, value).map_err(ViewError::from));
      self.task_cursor = 0;
      return;
    }

    match key.code {
      KeyCode::Backspace => {
        self.filter_draft.pop();
      }
      KeyCode::Char(c) => self.filter_draft.push(c),
      KeyCode::Enter => {
        let result = view.list_mut().set_filter(field, &self.filter_draft);
        note(&mut self.status_msg, result.map_err(ViewError::from));
        self.task_cursor = 0;
      }
      _ => {}
    }
  }

  fn handle_form_key(&mut self, key: KeyEvent) {
    let Some(view) = self.tasks.as_mut() else { return };

    if view.assignee().is_open() {
      match key.code {
        KeyCode::Down => view.assignee_key(ComboKey::Down),
        KeyCode::Up => view.assignee_key(ComboKey::Up),
        KeyCode::Enter => view.assignee_key(ComboKey::Enter),
        KeyCode::Esc => view.assignee_key(ComboKey::Escape),
        KeyCode::Backspace => view.assignee_mut().pop_char(),
        KeyCode::Char(c) => view.assignee_mut().push_char(c),
        _ => {}
      }
      return;
    }

    let index = FormField::ALL.iter().position(|f| *f == self.form_field).unwrap_or(0);
    match key.code {
      KeyCode::Down => self.form_field = FormField::ALL[cycle(index, FormField::ALL.len(), true)],
      KeyCode::Up => self.form_field = FormField::ALL[cycle(index, FormField::ALL.len(), false)],
      KeyCode::Esc => {
        view.reset_form();
        self.task_focus = TaskFocus::List;
      }
      KeyCode::Left | KeyCode::Right if self.form_field == FormField::Status => {
        let form = view.form_mut();
        let i = TaskStatus::ALL.iter().position(|s| *s == form.status).unwrap_or(0);
        form.status = TaskStatus::ALL[cycle(i, TaskStatus::ALL.len(), key.code == KeyCode::Right)];
      }
      KeyCode::Enter | KeyCode::Char('a') if self.form_field == FormField::Assignee => {
        view.assignee_mut().open();
      }
      KeyCode::Backspace | KeyCode::Delete if self.form_field == FormField::Assignee => {
        view.clear_assignee();
      }
      KeyCode::Enter => {
        let result = view.submit();
        if result.is_ok() {
          self.task_focus = TaskFocus::List;
        }
        note(&mut self.status_msg, result);
      }
      KeyCode::Backspace => {
        if let Some(text) = form_text(view.form_mut(), self.form_field) {
          text.pop();
        }
      }
      KeyCode::Char(c) => {
        if let Some(text) = form_text(view.form_mut(), self.form_field) {
          text.push(c);
        }
      }
      _ => {}
    }
  }

  // ── Users screen ──────────────────────────────────────────────────────────

  fn show_users(&mut self) {
    if let Some(view) = self.users.as_mut() {
      if view.list().data().is_none() {
        view.load();
      }
      self.screen = Screen::Users;
    }
  }

  fn handle_users_key(&mut self, key: KeyEvent) {
    let cursor = self.cursor_user().map(|a| (a.id, a.role()));
    let Some(view) = self.users.as_mut() else { return };

    if self.user_searching {
      match key.code {
        KeyCode::Esc => self.user_searching = false,
        KeyCode::Enter => {
          view.search();
          self.user_searching = false;
          self.user_cursor = 0;
        }
        KeyCode::Backspace => view.pop_char(),
        KeyCode::Char(c) => view.push_char(c),
        _ => {}
      }
      return;
    }

    let len = view.list().items().len();
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        if self.user_cursor + 1 < len {
          self.user_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.user_cursor = self.user_cursor.saturating_sub(1);
      }
      KeyCode::Char(']') | KeyCode::PageDown => {
        if view.list_mut().next_page() {
          self.user_cursor = 0;
        }
      }
      KeyCode::Char('[') | KeyCode::PageUp => {
        if view.list_mut().prev_page() {
          self.user_cursor = 0;
        }
      }
      KeyCode::Char('/') => self.user_searching = true,
      KeyCode::Char('r') => {
        view.reset();
        self.user_cursor = 0;
      }
      KeyCode::Char('R') => {
        if let Some((id, role)) = cursor {
          let next = if role == Some(Role::Admin) { Role::User } else { Role::Admin };
          note(&mut self.status_msg, view.change_role(id, next));
        }
      }
      KeyCode::Char('g') => {
        view.refresh();
        self.user_cursor = 0;
      }
      KeyCode::Char('d') => {
        if let Some((id, _)) = cursor {
          self.ask_delete("user", id);
        }
      }
      KeyCode::Esc | KeyCode::Char('t') | KeyCode::Tab => self.screen = Screen::Tasks,
      _ => {}
    }
  }
}

/// The text buffer behind a free-text form field.
fn form_text(form: &mut taskdesk_client::views::TaskForm, field: FormField) -> Option<&mut String> {
  match field {
    FormField::Title => Some(&mut form.title),
    FormField::Description => Some(&mut form.description),
    FormField::Deadline => Some(&mut form.deadline),
    FormField::Status | FormField::Assignee => None,
  }
}
