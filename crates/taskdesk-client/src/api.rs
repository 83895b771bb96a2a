//! Typed endpoints of the task-tracking server.
//!
//! | Method   | Path                          |
//! |----------|-------------------------------|
//! | `POST`   | `/api/auth/login`             |
//! | `POST`   | `/api/auth/register`          |
//! | `GET`    | `/api/tasks`                  |
//! | `GET`    | `/api/tasks/{id}`             |
//! | `POST`   | `/api/tasks`                  |
//! | `PUT`    | `/api/tasks/{id}`             |
//! | `PATCH`  | `/api/tasks/{id}/status`      |
//! | `DELETE` | `/api/tasks/{id}`             |
//! | `GET`    | `/api/users?q=`               |
//! | `GET`    | `/api/admin/users`            |
//! | `PATCH`  | `/api/admin/users/{id}/role`  |
//! | `DELETE` | `/api/admin/users/{id}`       |

use reqwest::Method;
use taskdesk_core::{
  Page, PageRequest, Role,
  auth::{AuthResponse, Credentials},
  task::{StatusUpdate, Task, TaskFilter, TaskPayload, TaskStatus},
  user::{RoleUpdate, UserAccount, UserFilter, UserOption},
};

use crate::{
  Gateway, Result,
  gateway::required,
  service::{AuthService, TaskService, UserAdminService},
};

/// Endpoint-level client. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
  gateway: Gateway,
}

impl ApiClient {
  pub fn new(gateway: Gateway) -> Self { Self { gateway } }

  pub fn gateway(&self) -> &Gateway { &self.gateway }

  /// `GET /api/tasks/{id}`
  pub async fn get_task(&self, id: i64) -> Result<Task> {
    required(self.gateway.get(&format!("/api/tasks/{id}"), &[]).await?)
  }
}

impl AuthService for ApiClient {
  /// `POST /api/auth/login`
  async fn login(&self, credentials: Credentials) -> Result<AuthResponse> {
    required(self.gateway.send(Method::POST, "/api/auth/login", &credentials).await?)
  }

  /// `POST /api/auth/register`
  async fn register(&self, credentials: Credentials) -> Result<AuthResponse> {
    required(self.gateway.send(Method::POST, "/api/auth/register", &credentials).await?)
  }
}

impl TaskService for ApiClient {
  /// `GET /api/tasks?page=&size=[&status=][&deadlineFrom=][&deadlineTo=]`
  async fn list_tasks(&self, request: PageRequest<TaskFilter>) -> Result<Page<Task>> {
    let page = self.gateway.get("/api/tasks", &request.query_params()).await?;
    Ok(page.unwrap_or_else(Page::empty))
  }

  async fn create_task(&self, payload: TaskPayload) -> Result<Task> {
    required(self.gateway.send(Method::POST, "/api/tasks", &payload).await?)
  }

  async fn update_task(&self, id: i64, payload: TaskPayload) -> Result<Task> {
    required(
      self
        .gateway
        .send(Method::PUT, &format!("/api/tasks/{id}"), &payload)
        .await?,
    )
  }

  async fn update_task_status(&self, id: i64, status: TaskStatus) -> Result<Task> {
    required(
      self
        .gateway
        .send(Method::PATCH, &format!("/api/tasks/{id}/status"), &StatusUpdate { status })
        .await?,
    )
  }

  async fn delete_task(&self, id: i64) -> Result<()> {
    self.gateway.delete(&format!("/api/tasks/{id}")).await
  }

  /// `GET /api/users?q=<query>`
  async fn search_users(&self, query: String) -> Result<Vec<UserOption>> {
    let users = self.gateway.get("/api/users", &[("q", query)]).await?;
    Ok(users.unwrap_or_default())
  }
}

impl UserAdminService for ApiClient {
  /// `GET /api/admin/users?page=&size=[&q=]`
  async fn list_users(&self, request: PageRequest<UserFilter>) -> Result<Page<UserAccount>> {
    let page = self.gateway.get("/api/admin/users", &request.query_params()).await?;
    Ok(page.unwrap_or_else(Page::empty))
  }

  async fn update_user_role(&self, id: i64, role: Role) -> Result<UserAccount> {
    required(
      self
        .gateway
        .send(Method::PATCH, &format!("/api/admin/users/{id}/role"), &RoleUpdate { role })
        .await?,
    )
  }

  async fn delete_user(&self, id: i64) -> Result<()> {
    self.gateway.delete(&format!("/api/admin/users/{id}")).await
  }
}

#[cfg(test)]
mod tests {
  use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
  };

  use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, patch, post},
  };
  use serde_json::{Value, json};
  use taskdesk_core::{FilterSet, task::TaskFilterField};

  use super::*;
  use crate::{
    GatewayError, Session,
    test_support::{serve, token_for},
  };

  type Seen = Arc<Mutex<Vec<String>>>;

  fn router(seen: Seen) -> Router {
    let list_seen = Arc::clone(&seen);
    let delete_seen = Arc::clone(&seen);
    Router::new()
      .route(
        "/api/auth/login",
        post(|Json(body): Json<Value>| async move {
          if body["password"] == "hunter22" {
            Ok(Json(json!({ "accessToken": token_for("ADMIN") })))
          } else {
            Err((StatusCode::BAD_REQUEST, Json(json!({ "message": "Invalid credentials" }))))
          }
        }),
      )
      .route(
        "/api/tasks",
        get(move |Query(q): Query<HashMap<String, String>>| async move {
          let mut keys: Vec<_> = q.iter().map(|(k, v)| format!("{k}={v}")).collect();
          keys.sort();
          list_seen.lock().unwrap().push(keys.join("&"));
          Json(json!({
            "content": [{ "id": 3, "title": "Review", "status": "DONE" }],
            "totalPages": 4,
            "totalElements": 31,
            "number": 2,
            "size": 10
          }))
        }),
      )
      .route(
        "/api/tasks/{id}",
        get(|Path(id): Path<i64>| async move {
          Json(json!({ "id": id, "title": "One", "status": "TODO" }))
        })
        .delete(move |Path(id): Path<i64>| async move {
          delete_seen.lock().unwrap().push(format!("delete {id}"));
          StatusCode::NO_CONTENT
        }),
      )
      .route(
        "/api/users",
        get(|Query(q): Query<HashMap<String, String>>| async move {
          let query = q.get("q").cloned().unwrap_or_default();
          let all = ["zed@example.com", "alice@example.com", "alina@example.com"];
          let hits: Vec<Value> = all
            .iter()
            .enumerate()
            .filter(|(_, e)| e.contains(query.as_str()))
            .map(|(i, e)| json!({ "id": i + 1, "email": e }))
            .collect();
          Json(hits)
        }),
      )
      .route(
        "/api/admin/users/{id}/role",
        patch(|Path(id): Path<i64>, Json(body): Json<Value>| async move {
          Json(json!({ "id": id, "email": "ana@example.com", "role": body["role"] }))
        }),
      )
  }

  async fn client() -> (ApiClient, Arc<Session>, Seen) {
    let seen = Seen::default();
    let base = serve(router(Arc::clone(&seen))).await;
    let session = Arc::new(Session::new());
    let gateway = Gateway::new(base, Arc::clone(&session)).unwrap();
    (ApiClient::new(gateway), session, seen)
  }

  #[tokio::test]
  async fn login_returns_access_token() {
    let (api, _, _) = client().await;
    let ok = api
      .login(Credentials { email: "ana@example.com".into(), password: "hunter22".into() })
      .await
      .unwrap();
    assert_eq!(ok.access_token, token_for("ADMIN"));

    let err = api
      .login(Credentials { email: "ana@example.com".into(), password: "wrong".into() })
      .await
      .unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
  }

  #[tokio::test]
  async fn list_sends_page_and_non_empty_filters() {
    let (api, _, seen) = client().await;
    let mut filter = TaskFilter::default();
    filter.set(TaskFilterField::Status, "DONE").unwrap();

    let page = api
      .list_tasks(PageRequest { filter, page: 2, size: 10 })
      .await
      .unwrap();
    assert_eq!(page.total_pages, 4);
    assert_eq!(page.content[0].status, TaskStatus::Done);
    assert_eq!(seen.lock().unwrap()[0], "page=2&size=10&status=DONE");
  }

  #[tokio::test]
  async fn search_preserves_server_order() {
    let (api, _, _) = client().await;
    let users = api.search_users("li".into()).await.unwrap();
    let emails: Vec<_> = users.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(emails, vec!["alice@example.com", "alina@example.com"]);
  }

  #[tokio::test]
  async fn delete_accepts_no_content() {
    let (api, _, seen) = client().await;
    api.delete_task(9).await.unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["delete 9"]);
  }

  #[tokio::test]
  async fn role_update_round_trips() {
    let (api, _, _) = client().await;
    let account = api.update_user_role(5, Role::Admin).await.unwrap();
    assert_eq!(account.id, 5);
    assert_eq!(account.role(), Some(Role::Admin));
  }

  #[tokio::test]
  async fn get_task_by_id() {
    let (api, session, _) = client().await;
    session.set_credential(token_for("USER"));
    let task = api.get_task(12).await.unwrap();
    assert_eq!(task.id, 12);
    assert_eq!(task.status, TaskStatus::Todo);
  }

  #[tokio::test]
  async fn unknown_route_is_a_status_error() {
    let (api, _, _) = client().await;
    let err = api.delete_user(1).await.unwrap_err();
    assert!(matches!(err, GatewayError::Status { status: 404 | 405, .. }));
  }
}
