//! The task list, its filters, and the admin editor.

use std::{collections::HashMap, sync::Arc};

use chrono::NaiveDate;
use taskdesk_core::{
  EntityRef,
  task::{Task, TaskPayload, TaskStatus},
};
use tracing::debug;

use crate::{
  access::{Access, Capabilities},
  combobox::{ComboKey, Combobox},
  error::ViewError,
  pagination::{ListController, ListEvent, MutationId},
  service::{AssigneeSearch, TaskList, TaskService},
};

// ─── Form ─────────────────────────────────────────────────────────────────────

/// Editor state. `editing` is the id of the task being edited, or `None`
/// when the form creates a new task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
  pub editing:     Option<i64>,
  pub title:       String,
  pub description: String,
  pub status:      TaskStatus,
  /// Raw `YYYY-MM-DD` text; empty means no deadline.
  pub deadline:    String,
  pub assignee:    EntityRef,
}

impl TaskForm {
  pub fn from_task(task: &Task) -> Self {
    let assignee = match (task.assignee_id, &task.assignee_email) {
      (Some(id), Some(email)) => EntityRef::new(id, email.clone()),
      (Some(id), None) => EntityRef::new(id, format!("#{id}")),
      (None, _) => EntityRef::none(),
    };
    Self {
      editing: Some(task.id),
      title: task.title.clone(),
      description: task.description.clone().unwrap_or_default(),
      status: task.status,
      deadline: task.deadline.as_ref().map(NaiveDate::to_string).unwrap_or_default(),
      assignee,
    }
  }

  pub fn payload(&self) -> taskdesk_core::Result<TaskPayload> {
    TaskPayload::from_form(
      &self.title,
      &self.description,
      self.status,
      &self.deadline,
      self.assignee.id,
    )
  }
}

/// What to do with the form once a mutation succeeds.
enum AfterMutation {
  ResetForm,
  ResetFormIfEditing(i64),
}

// ─── View ─────────────────────────────────────────────────────────────────────

pub struct TasksView<A: TaskService> {
  api:      Arc<A>,
  access:   Access,
  list:     ListController<TaskList<A>>,
  form:     TaskForm,
  assignee: Combobox<AssigneeSearch<A>>,
  pending:  HashMap<MutationId, AfterMutation>,
}

impl<A: TaskService> TasksView<A> {
  /// Fails closed for an unknown or absent role.
  pub fn new(api: Arc<A>, access: Access) -> Result<Self, ViewError> {
    if !access.capabilities().view_tasks {
      return Err(ViewError::AccessDenied);
    }
    let mut assignee = Combobox::new(Arc::new(AssigneeSearch(Arc::clone(&api))));
    assignee.set_disabled(!access.capabilities().edit_tasks);
    Ok(Self {
      list: ListController::new(Arc::new(TaskList(Arc::clone(&api)))),
      api,
      access,
      form: TaskForm::default(),
      assignee,
      pending: HashMap::new(),
    })
  }

  pub fn with_page_size(mut self, page_size: u32) -> Self {
    self.list.set_page_size(page_size);
    self
  }

  // ── Accessors ─────────────────────────────────────────────────────────────

  pub fn access(&self) -> Access { self.access }

  pub fn capabilities(&self) -> Capabilities { self.access.capabilities() }

  pub fn title(&self) -> &'static str { self.access.tasks_title() }

  pub fn empty_text(&self) -> &'static str { self.access.tasks_empty_text() }

  pub fn list(&self) -> &ListController<TaskList<A>> { &self.list }

  /// Filters and paging go straight through the list controller.
  pub fn list_mut(&mut self) -> &mut ListController<TaskList<A>> { &mut self.list }

  pub fn form(&self) -> &TaskForm { &self.form }

  pub fn form_mut(&mut self) -> &mut TaskForm { &mut self.form }

  pub fn assignee(&self) -> &Combobox<AssigneeSearch<A>> { &self.assignee }

  pub fn assignee_mut(&mut self) -> &mut Combobox<AssigneeSearch<A>> { &mut self.assignee }

  /// Initial fetch of the current page.
  pub fn load(&mut self) { self.list.load(); }

  /// Manual re-run: back to the first page, then load.
  pub fn refresh(&mut self) { self.list.search(); }

  // ── Editor ────────────────────────────────────────────────────────────────

  pub fn start_edit(&mut self, task: &Task) -> Result<(), ViewError> {
    self.require(self.capabilities().edit_tasks)?;
    self.assignee.close();
    self.form = TaskForm::from_task(task);
    Ok(())
  }

  pub fn reset_form(&mut self) {
    self.assignee.close();
    self.form = TaskForm::default();
  }

  /// Pass a key to the assignee picker; a committed entity becomes the
  /// form's assignee.
  pub fn assignee_key(&mut self, key: ComboKey) {
    if let Some(entity) = self.assignee.handle_key(key) {
      self.form.assignee = entity;
    }
  }

  pub fn pick_assignee(&mut self, index: usize) {
    if let Some(entity) = self.assignee.commit(index) {
      self.form.assignee = entity;
    }
  }

  pub fn clear_assignee(&mut self) { self.form.assignee = self.assignee.clear(); }

  /// Create or update from the form. Validation failures are surfaced in the
  /// list's error slot and leave the form as it is.
  pub fn submit(&mut self) -> Result<MutationId, ViewError> {
    let caps = self.capabilities();
    match self.form.editing {
      Some(_) => self.require(caps.edit_tasks)?,
      None => self.require(caps.create_tasks)?,
    }
    if self.list.is_busy() {
      return Err(ViewError::Busy);
    }
    let payload = self.form.payload().inspect_err(|e| self.list.set_error(e.to_string()))?;

    let api = Arc::clone(&self.api);
    let id = match self.form.editing {
      Some(task_id) => self
        .list
        .mutate("update task", async move { api.update_task(task_id, payload).await.map(drop) }),
      None => self
        .list
        .mutate("create task", async move { api.create_task(payload).await.map(drop) }),
    }
    .ok_or(ViewError::Busy)?;
    self.pending.insert(id, AfterMutation::ResetForm);
    Ok(id)
  }

  pub fn delete(&mut self, task_id: i64) -> Result<MutationId, ViewError> {
    self.require(self.capabilities().delete_tasks)?;
    let api = Arc::clone(&self.api);
    let id = self
      .list
      .mutate("delete task", async move { api.delete_task(task_id).await })
      .ok_or(ViewError::Busy)?;
    self.pending.insert(id, AfterMutation::ResetFormIfEditing(task_id));
    Ok(id)
  }

  /// Quick status change from the list.
  pub fn change_status(&mut self, task_id: i64, status: TaskStatus) -> Result<MutationId, ViewError> {
    self.require(self.capabilities().status_choices().contains(&status))?;
    let api = Arc::clone(&self.api);
    self
      .list
      .mutate("change task status", async move {
        api.update_task_status(task_id, status).await.map(drop)
      })
      .ok_or(ViewError::Busy)
  }

  fn require(&self, allowed: bool) -> Result<(), ViewError> {
    if allowed { Ok(()) } else { Err(ViewError::Forbidden) }
  }

  // ── Async plumbing ────────────────────────────────────────────────────────

  /// Apply everything that is ready, for both the list and the picker.
  pub fn pump(&mut self) -> Vec<ListEvent> {
    self.assignee.pump();
    let events = self.list.pump();
    for event in &events {
      self.after(*event);
    }
    events
  }

  /// Wait for the next list event and apply it.
  pub async fn next_event(&mut self) -> ListEvent {
    let event = self.list.next_event().await;
    self.after(event);
    event
  }

  fn after(&mut self, event: ListEvent) {
    match event {
      ListEvent::MutationSucceeded(id) => match self.pending.remove(&id) {
        Some(AfterMutation::ResetForm) => self.reset_form(),
        Some(AfterMutation::ResetFormIfEditing(task_id)) if self.form.editing == Some(task_id) => {
          debug!(task_id, "edited task was deleted; resetting form");
          self.reset_form();
        }
        _ => {}
      },
      ListEvent::MutationFailed(id) => {
        self.pending.remove(&id);
      }
      _ => {}
    }
  }
}
