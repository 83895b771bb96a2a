//! Gateway behaviour against an in-process axum server.

use std::{collections::HashMap, sync::Arc};

use axum::{
  Json, Router,
  extract::Query,
  http::{HeaderMap, StatusCode, header},
  routing::{get, post},
};
use reqwest::Method;
use serde_json::{Value, json};

use super::*;
use crate::{
  session::LogoutReason,
  test_support::{serve, token_with},
};

fn router() -> Router {
  Router::new()
    .route(
      "/api/whoami",
      get(|headers: HeaderMap| async move {
        let auth = headers
          .get(header::AUTHORIZATION)
          .and_then(|v| v.to_str().ok())
          .map(str::to_owned);
        Json(json!({ "authorization": auth }))
      }),
    )
    .route("/api/expired", get(|| async { StatusCode::UNAUTHORIZED }))
    .route(
      "/api/invalid",
      post(|| async {
        (
          StatusCode::BAD_REQUEST,
          Json(json!({ "status": 400, "error": "Bad Request", "message": "title: must not be blank" })),
        )
      }),
    )
    .route(
      "/api/broken",
      get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>") }),
    )
    .route("/api/nothing", get(|| async { StatusCode::NO_CONTENT }))
    .route("/api/blank", get(|| async { "" }))
    .route(
      "/api/echo",
      get(|Query(params): Query<HashMap<String, String>>| async move { Json(params) }),
    )
}

async fn gateway_with_token(token: Option<&str>) -> Gateway {
  let base = serve(router()).await;
  let session = Arc::new(Session::new());
  if let Some(token) = token {
    session.set_credential(token);
  }
  Gateway::new(base, session).unwrap()
}

#[tokio::test]
async fn attaches_bearer_credential_when_present() {
  let token = token_with(r#"{"role":"USER"}"#);
  let gw = gateway_with_token(Some(&token)).await;
  let body: Value = gw.get("/api/whoami", &[]).await.unwrap().unwrap();
  assert_eq!(body["authorization"], format!("Bearer {token}"));
}

#[tokio::test]
async fn omits_authorization_without_credential() {
  let gw = gateway_with_token(None).await;
  let body: Value = gw.get("/api/whoami", &[]).await.unwrap().unwrap();
  assert_eq!(body["authorization"], Value::Null);
}

#[tokio::test]
async fn unauthorized_clears_session_and_signals_once() {
  let gw = gateway_with_token(Some(&token_with(r#"{"role":"ADMIN"}"#))).await;
  let mut logout = gw.session().subscribe_logout();

  let (a, b) = tokio::join!(
    gw.get::<Value>("/api/expired", &[]),
    gw.get::<Value>("/api/expired", &[]),
  );
  assert!(a.unwrap_err().is_unauthorized());
  assert!(b.unwrap_err().is_unauthorized());

  assert!(!gw.session().is_authenticated());
  assert_eq!(logout.recv().await.unwrap(), LogoutReason::Unauthorized);
  assert!(logout.try_recv().is_err());
}

#[tokio::test]
async fn error_message_comes_from_body() {
  let gw = gateway_with_token(None).await;
  let err = gw
    .send::<_, Value>(Method::POST, "/api/invalid", &json!({ "title": "" }))
    .await
    .unwrap_err();
  match err {
    GatewayError::Status { status, message } => {
      assert_eq!(status, 400);
      assert_eq!(message, "title: must not be blank");
    }
    other => panic!("unexpected error: {other:?}"),
  }
}

#[tokio::test]
async fn error_message_falls_back_to_status() {
  let gw = gateway_with_token(None).await;
  let err = gw.get::<Value>("/api/broken", &[]).await.unwrap_err();
  assert_eq!(err.to_string(), "HTTP 500");
  assert!(!err.is_unauthorized());
}

#[tokio::test]
async fn no_content_and_blank_bodies_resolve_to_none() {
  let gw = gateway_with_token(None).await;
  assert!(gw.get::<Value>("/api/nothing", &[]).await.unwrap().is_none());
  assert!(gw.get::<Value>("/api/blank", &[]).await.unwrap().is_none());
}

#[tokio::test]
async fn query_parameters_are_sent() {
  let gw = gateway_with_token(None).await;
  let body: HashMap<String, String> = gw
    .get("/api/echo", &[("page", "2".to_owned()), ("status", "DONE".to_owned())])
    .await
    .unwrap()
    .unwrap();
  assert_eq!(body.get("page").map(String::as_str), Some("2"));
  assert_eq!(body.get("status").map(String::as_str), Some("DONE"));
}

#[test]
fn error_message_ignores_blank_message_field() {
  assert_eq!(
    error_message(StatusCode::CONFLICT, r#"{"message":""}"#),
    "HTTP 409"
  );
  assert_eq!(
    error_message(StatusCode::CONFLICT, r#"{"message":"Email already used"}"#),
    "Email already used"
  );
}
