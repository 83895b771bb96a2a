//! Fakes and helpers shared by the unit tests.

use std::{
  collections::VecDeque,
  sync::{Arc, Mutex},
  time::Duration,
};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use taskdesk_core::{
  FilterSet, Page, PageRequest, Role,
  auth::{AuthResponse, Credentials},
  task::{Task, TaskFilter, TaskPayload, TaskStatus},
  user::{UserAccount, UserFilter, UserOption},
};

use crate::{
  GatewayError, Result,
  service::{AuthService, SearchSource, TaskService, UserAdminService},
};

// ─── Tokens & servers ─────────────────────────────────────────────────────────

/// An unsigned token whose claims segment is `payload`.
pub(crate) fn token_with(payload: &str) -> String {
  format!(
    "{}.{}.sig",
    URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#),
    URL_SAFE_NO_PAD.encode(payload)
  )
}

pub(crate) fn token_for(role: &str) -> String {
  token_with(&format!(r#"{{"sub":"someone@example.com","uid":1,"role":"{role}"}}"#))
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub(crate) async fn serve(router: axum::Router) -> String {
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, router).await.unwrap();
  });
  format!("http://{addr}")
}

pub(crate) fn server_error(message: &str) -> GatewayError {
  GatewayError::Status { status: 400, message: message.to_owned() }
}

fn paginate<T: Clone>(items: &[T], page: u32, size: u32) -> Page<T> {
  let size = size.max(1) as usize;
  let total_pages = items.len().div_ceil(size) as u32;
  let start = page as usize * size;
  let content = items.iter().skip(start).take(size).cloned().collect();
  Page {
    content,
    total_pages,
    total_elements: items.len() as u64,
    number: page,
    size: size as u32,
  }
}

fn pop<T>(queue: &Mutex<VecDeque<T>>) -> Option<T> { queue.lock().unwrap().pop_front() }

// ─── Search ───────────────────────────────────────────────────────────────────

/// Records every query it receives. Latency and failure are per query.
#[derive(Default)]
pub(crate) struct FakeSearch {
  pub users:   Vec<UserOption>,
  pub calls:   Mutex<Vec<String>>,
  pub latency: Vec<(String, Duration)>,
  pub failing: Vec<String>,
}

impl FakeSearch {
  pub fn with_users(emails: &[&str]) -> Self {
    Self {
      users: emails
        .iter()
        .enumerate()
        .map(|(i, e)| UserOption { id: i as i64 + 1, email: (*e).to_owned() })
        .collect(),
      ..Self::default()
    }
  }

  pub fn calls(&self) -> Vec<String> { self.calls.lock().unwrap().clone() }
}

impl SearchSource for FakeSearch {
  type Item = UserOption;

  async fn search(&self, query: String) -> Result<Vec<UserOption>> {
    self.calls.lock().unwrap().push(query.clone());
    let delay = self
      .latency
      .iter()
      .find(|(q, _)| *q == query)
      .map(|(_, d)| *d)
      .unwrap_or_default();
    tokio::time::sleep(delay).await;
    if self.failing.contains(&query) {
      return Err(GatewayError::Status { status: 500, message: "HTTP 500".into() });
    }
    Ok(self.users.iter().filter(|u| u.email.contains(&query)).cloned().collect())
  }
}

// ─── Tasks ────────────────────────────────────────────────────────────────────

pub(crate) fn task(id: i64, title: &str, status: TaskStatus) -> Task {
  Task {
    id,
    assignee_id: None,
    assignee_email: None,
    title: title.to_owned(),
    description: None,
    status,
    deadline: None,
    created_at: None,
    updated_at: None,
  }
}

/// An in-memory task server.
#[derive(Default)]
pub(crate) struct FakeTasks {
  pub tasks:          Mutex<Vec<Task>>,
  pub users:          Vec<UserOption>,
  pub requests:       Mutex<Vec<PageRequest<TaskFilter>>>,
  pub mutations:      Mutex<Vec<String>>,
  /// Popped per list call; missing entries mean no delay.
  pub list_latency:   Mutex<VecDeque<Duration>>,
  pub list_failures:  Mutex<VecDeque<GatewayError>>,
  pub mutation_fails: Mutex<VecDeque<GatewayError>>,
}

impl FakeTasks {
  pub fn with_tasks(count: i64) -> Arc<Self> {
    let tasks = (1..=count).map(|i| task(i, &format!("task {i}"), TaskStatus::Todo)).collect();
    Arc::new(Self { tasks: Mutex::new(tasks), ..Self::default() })
  }

  pub fn requests(&self) -> Vec<PageRequest<TaskFilter>> { self.requests.lock().unwrap().clone() }

  pub fn mutations(&self) -> Vec<String> { self.mutations.lock().unwrap().clone() }

  fn mutate(&self, label: String) -> Result<()> {
    self.mutations.lock().unwrap().push(label);
    match pop(&self.mutation_fails) {
      Some(e) => Err(e),
      None => Ok(()),
    }
  }
}

impl TaskService for FakeTasks {
  async fn list_tasks(&self, request: PageRequest<TaskFilter>) -> Result<Page<Task>> {
    self.requests.lock().unwrap().push(request.clone());
    let delay = pop(&self.list_latency).unwrap_or_default();
    tokio::time::sleep(delay).await;
    if let Some(e) = pop(&self.list_failures) {
      return Err(e);
    }
    let wanted = request.filter.status();
    let matching: Vec<Task> = self
      .tasks
      .lock()
      .unwrap()
      .iter()
      .filter(|t| wanted.is_none_or(|s| t.status == s))
      .cloned()
      .collect();
    Ok(paginate(&matching, request.page, request.size))
  }

  async fn create_task(&self, payload: TaskPayload) -> Result<Task> {
    self.mutate(format!("create {}", payload.title))?;
    let mut tasks = self.tasks.lock().unwrap();
    let id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
    let mut created = task(id, &payload.title, payload.status);
    created.assignee_id = payload.assignee_id;
    tasks.push(created.clone());
    Ok(created)
  }

  async fn update_task(&self, id: i64, payload: TaskPayload) -> Result<Task> {
    self.mutate(format!("update {id}"))?;
    let mut tasks = self.tasks.lock().unwrap();
    let t = tasks
      .iter_mut()
      .find(|t| t.id == id)
      .ok_or_else(|| server_error("Task not found"))?;
    t.title = payload.title;
    t.status = payload.status;
    t.assignee_id = payload.assignee_id;
    Ok(t.clone())
  }

  async fn update_task_status(&self, id: i64, status: TaskStatus) -> Result<Task> {
    self.mutate(format!("status {id} {status}"))?;
    let mut tasks = self.tasks.lock().unwrap();
    let t = tasks
      .iter_mut()
      .find(|t| t.id == id)
      .ok_or_else(|| server_error("Task not found"))?;
    t.status = status;
    Ok(t.clone())
  }

  async fn delete_task(&self, id: i64) -> Result<()> {
    self.mutate(format!("delete {id}"))?;
    self.tasks.lock().unwrap().retain(|t| t.id != id);
    Ok(())
  }

  async fn search_users(&self, query: String) -> Result<Vec<UserOption>> {
    Ok(self.users.iter().filter(|u| u.email.contains(&query)).cloned().collect())
  }
}

// ─── Users ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct FakeUsers {
  pub accounts:       Mutex<Vec<UserAccount>>,
  pub requests:       Mutex<Vec<PageRequest<UserFilter>>>,
  pub mutations:      Mutex<Vec<String>>,
  pub mutation_fails: Mutex<VecDeque<GatewayError>>,
}

impl FakeUsers {
  pub fn with_emails(emails: &[&str]) -> Arc<Self> {
    let accounts = emails
      .iter()
      .enumerate()
      .map(|(i, e)| UserAccount {
        id:         i as i64 + 1,
        email:      (*e).to_owned(),
        role:       "USER".to_owned(),
        created_at: None,
      })
      .collect();
    Arc::new(Self { accounts: Mutex::new(accounts), ..Self::default() })
  }

  pub fn requests(&self) -> Vec<PageRequest<UserFilter>> { self.requests.lock().unwrap().clone() }

  pub fn mutations(&self) -> Vec<String> { self.mutations.lock().unwrap().clone() }

  fn mutate(&self, label: String) -> Result<()> {
    self.mutations.lock().unwrap().push(label);
    match pop(&self.mutation_fails) {
      Some(e) => Err(e),
      None => Ok(()),
    }
  }
}

impl UserAdminService for FakeUsers {
  async fn list_users(&self, request: PageRequest<UserFilter>) -> Result<Page<UserAccount>> {
    self.requests.lock().unwrap().push(request.clone());
    let q = request
      .filter
      .query_params()
      .into_iter()
      .find(|(k, _)| *k == "q")
      .map(|(_, v)| v);
    let matching: Vec<UserAccount> = self
      .accounts
      .lock()
      .unwrap()
      .iter()
      .filter(|a| q.as_deref().is_none_or(|q| a.email.contains(q)))
      .cloned()
      .collect();
    Ok(paginate(&matching, request.page, request.size))
  }

  async fn update_user_role(&self, id: i64, role: Role) -> Result<UserAccount> {
    self.mutate(format!("role {id} {role}"))?;
    let mut accounts = self.accounts.lock().unwrap();
    let a = accounts
      .iter_mut()
      .find(|a| a.id == id)
      .ok_or_else(|| server_error("User not found"))?;
    a.role = role.to_string();
    Ok(a.clone())
  }

  async fn delete_user(&self, id: i64) -> Result<()> {
    self.mutate(format!("delete {id}"))?;
    self.accounts.lock().unwrap().retain(|a| a.id != id);
    Ok(())
  }
}

// ─── Auth ─────────────────────────────────────────────────────────────────────

/// Accepts exactly one password and issues a token with `role`.
pub(crate) struct FakeAuth {
  pub password: String,
  pub role:     String,
}

impl AuthService for FakeAuth {
  async fn login(&self, credentials: Credentials) -> Result<AuthResponse> {
    if credentials.password == self.password {
      Ok(AuthResponse { access_token: token_for(&self.role) })
    } else {
      Err(GatewayError::Unauthorized)
    }
  }

  async fn register(&self, credentials: Credentials) -> Result<AuthResponse> {
    if credentials.password.len() < 6 {
      return Err(server_error("password: size must be between 6 and 72"));
    }
    Ok(AuthResponse { access_token: token_for("USER") })
  }
}
