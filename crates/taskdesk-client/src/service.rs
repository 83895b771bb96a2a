//! The seams between the interactive layer and the server.
//!
//! [`SearchSource`] and [`ListSource`] are what the combobox and the list
//! orchestrator consume. The `*Service` traits group the endpoints a view
//! needs; [`ApiClient`](crate::ApiClient) implements all of them over HTTP,
//! and tests substitute in-memory fakes.

use std::{future::Future, sync::Arc};

use taskdesk_core::{
  Page, PageRequest, Role, Selectable,
  auth::{AuthResponse, Credentials},
  filter::FilterSet,
  task::{Task, TaskFilter, TaskPayload, TaskStatus},
  user::{UserAccount, UserFilter, UserOption},
};

use crate::Result;

// ─── Primitives ───────────────────────────────────────────────────────────────

/// A free-text lookup returning candidates in server order.
pub trait SearchSource: Send + Sync + 'static {
  type Item: Selectable + Clone + Send + 'static;

  fn search(&self, query: String) -> impl Future<Output = Result<Vec<Self::Item>>> + Send;
}

/// A paged, filtered list endpoint.
pub trait ListSource: Send + Sync + 'static {
  type Filter: FilterSet;
  type Item: Clone + Send + 'static;

  fn fetch(
    &self,
    request: PageRequest<Self::Filter>,
  ) -> impl Future<Output = Result<Page<Self::Item>>> + Send;
}

// ─── Services ─────────────────────────────────────────────────────────────────

pub trait AuthService: Send + Sync + 'static {
  fn login(&self, credentials: Credentials)
  -> impl Future<Output = Result<AuthResponse>> + Send;

  fn register(
    &self,
    credentials: Credentials,
  ) -> impl Future<Output = Result<AuthResponse>> + Send;
}

/// Endpoints used by the tasks view.
pub trait TaskService: Send + Sync + 'static {
  fn list_tasks(
    &self,
    request: PageRequest<TaskFilter>,
  ) -> impl Future<Output = Result<Page<Task>>> + Send;

  fn create_task(&self, payload: TaskPayload) -> impl Future<Output = Result<Task>> + Send;

  fn update_task(
    &self,
    id: i64,
    payload: TaskPayload,
  ) -> impl Future<Output = Result<Task>> + Send;

  fn update_task_status(
    &self,
    id: i64,
    status: TaskStatus,
  ) -> impl Future<Output = Result<Task>> + Send;

  fn delete_task(&self, id: i64) -> impl Future<Output = Result<()>> + Send;

  fn search_users(&self, query: String)
  -> impl Future<Output = Result<Vec<UserOption>>> + Send;
}

/// Endpoints used by the users admin view.
pub trait UserAdminService: Send + Sync + 'static {
  fn list_users(
    &self,
    request: PageRequest<UserFilter>,
  ) -> impl Future<Output = Result<Page<UserAccount>>> + Send;

  fn update_user_role(
    &self,
    id: i64,
    role: Role,
  ) -> impl Future<Output = Result<UserAccount>> + Send;

  fn delete_user(&self, id: i64) -> impl Future<Output = Result<()>> + Send;
}

// ─── Adapters ─────────────────────────────────────────────────────────────────

/// The task list endpoint of a [`TaskService`].
pub struct TaskList<A>(pub Arc<A>);

impl<A: TaskService> ListSource for TaskList<A> {
  type Filter = TaskFilter;
  type Item = Task;

  async fn fetch(&self, request: PageRequest<TaskFilter>) -> Result<Page<Task>> {
    self.0.list_tasks(request).await
  }
}

/// Assignee lookup through a [`TaskService`]'s user search.
pub struct AssigneeSearch<A>(pub Arc<A>);

impl<A: TaskService> SearchSource for AssigneeSearch<A> {
  type Item = UserOption;

  async fn search(&self, query: String) -> Result<Vec<UserOption>> {
    self.0.search_users(query).await
  }
}

/// The user list endpoint of a [`UserAdminService`].
pub struct UserList<A>(pub Arc<A>);

impl<A: UserAdminService> ListSource for UserList<A> {
  type Filter = UserFilter;
  type Item = UserAccount;

  async fn fetch(&self, request: PageRequest<UserFilter>) -> Result<Page<UserAccount>> {
    self.0.list_users(request).await
  }
}
