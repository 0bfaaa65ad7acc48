//! HTTP contract tests for [`RosterClient`] against a mock server.

use httpmock::prelude::*;
use reqwest::StatusCode;
use roster_core::{
  entity::{Role, Status},
  query::Query,
  source::RosterSource,
};
use serde_json::json;

use crate::{ClientConfig, Error, RosterClient, client::resource_url};

// base64("a-test-client-id:a-test-client-secret")
const BASIC: &str = "Basic YS10ZXN0LWNsaWVudC1pZDphLXRlc3QtY2xpZW50LXNlY3JldA==";
const BEARER: &str = "Bearer a-test-access-token";

fn config(server: &MockServer) -> ClientConfig {
  ClientConfig::new(
    server.url("/token"),
    server.url("/api/"),
    "a-test-client-id",
    "a-test-client-secret",
  )
}

fn mock_token(server: &MockServer) -> httpmock::Mock<'_> {
  server.mock(|when, then| {
    when
      .method(POST)
      .path("/token")
      .header("authorization", BASIC)
      .body_includes("grant_type=client_credentials");
    then.status(200).json_body(json!({
      "access_token": "a-test-access-token",
      "token_type": "Bearer",
      "expires_in": 3600
    }));
  })
}

async fn client(server: &MockServer) -> RosterClient {
  mock_token(server);
  RosterClient::connect(config(server)).await.unwrap()
}

// ─── Token exchange ──────────────────────────────────────────────────────────

#[tokio::test]
async fn connect_exchanges_client_credentials_once() {
  let server = MockServer::start();
  let token = mock_token(&server);

  let client = RosterClient::connect(config(&server)).await.unwrap();
  assert_eq!(client.base_url(), server.url("/api"));
  token.assert_calls(1);
}

#[tokio::test]
async fn connect_fails_on_token_error_status() {
  let server = MockServer::start();
  server.mock(|when, then| {
    when.method(POST).path("/token");
    then.status(401);
  });

  let err = RosterClient::connect(config(&server)).await.unwrap_err();
  assert!(
    matches!(err, Error::Auth(ref reason) if reason.contains("401")),
    "expected an auth failure, got: {err}"
  );
}

#[tokio::test]
async fn connect_fails_without_access_token() {
  let server = MockServer::start();
  server.mock(|when, then| {
    when.method(POST).path("/token");
    then.status(200).json_body(json!({"token_type": "Bearer"}));
  });

  let err = RosterClient::connect(config(&server)).await.unwrap_err();
  assert!(matches!(err, Error::Auth(_)), "got: {err}");
}

#[tokio::test]
async fn connect_rejects_non_bearer_token() {
  let server = MockServer::start();
  server.mock(|when, then| {
    when.method(POST).path("/token");
    then
      .status(200)
      .json_body(json!({"access_token": "tok", "token_type": "mac"}));
  });

  let err = RosterClient::connect(config(&server)).await.unwrap_err();
  assert!(err.to_string().contains("mac"), "got: {err}");
}

#[tokio::test]
async fn connect_fails_when_token_endpoint_unreachable() {
  let config = ClientConfig::new(
    "http://127.0.0.1:1/token",
    "http://127.0.0.1:1/api",
    "id",
    "secret",
  );
  let err = RosterClient::connect(config).await.unwrap_err();
  assert!(matches!(err, Error::Auth(_)), "got: {err}");
}

#[tokio::test]
async fn connect_rejects_unusable_base_url_before_authenticating() {
  let server = MockServer::start();
  let token = mock_token(&server);

  for base in ["not a url", "mailto:roster@sis.test"] {
    let config = ClientConfig::new(server.url("/token"), base, "id", "secret");
    let err = RosterClient::connect(config).await.unwrap_err();
    assert!(matches!(err, Error::BaseUrl(_)), "{base}: got {err}");
  }
  token.assert_calls(0);
}

// ─── URLs ────────────────────────────────────────────────────────────────────

#[test]
fn ids_are_encoded_as_single_path_segments() {
  let base = reqwest::Url::parse("https://sis.test/ims/oneroster/v1p1").unwrap();

  let url = resource_url(&base, &["teachers", "a/b?c#d", "classes"]).unwrap();
  assert_eq!(
    url.as_str(),
    "https://sis.test/ims/oneroster/v1p1/teachers/a%2Fb%3Fc%23d/classes"
  );
  assert_eq!(url.query(), None);
  assert_eq!(url.fragment(), None);

  let url = resource_url(&base, &["classes", "c 1%", "students"]).unwrap();
  assert_eq!(
    url.as_str(),
    "https://sis.test/ims/oneroster/v1p1/classes/c%201%25/students"
  );
}

#[test]
fn plain_ids_and_bare_hosts_join_cleanly() {
  let base = reqwest::Url::parse("https://sis.test").unwrap();
  let url = resource_url(&base, &["teachers", "t-1", "classes"]).unwrap();
  assert_eq!(url.as_str(), "https://sis.test/teachers/t-1/classes");
}

// ─── Requests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_json_attaches_headers() {
  let server = MockServer::start();
  let client = client(&server).await;
  let mock = server.mock(|when, then| {
    when
      .method(GET)
      .path("/api/test-data")
      .header("authorization", BEARER)
      .header("content-type", "application/json");
    then.status(200).json_body(json!({"key": "value"}));
  });

  let body = client.get_json(&["test-data"], &Query::default()).await.unwrap();
  assert_eq!(body, json!({"key": "value"}));
  mock.assert();
}

#[tokio::test]
async fn get_json_reports_status() {
  let server = MockServer::start();
  let client = client(&server).await;
  server.mock(|when, then| {
    when.method(GET).path("/api/test-data");
    then.status(404);
  });

  let err = client.get_json(&["test-data"], &Query::default()).await.unwrap_err();
  assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
  assert!(err.to_string().contains("GET /test-data"));
}

#[tokio::test]
async fn get_json_rejects_non_json_body() {
  let server = MockServer::start();
  let client = client(&server).await;
  server.mock(|when, then| {
    when.method(GET).path("/api/test-data");
    then.status(200).body("<html>oops</html>");
  });

  let err = client.get_json(&["test-data"], &Query::default()).await.unwrap_err();
  assert!(matches!(err, Error::InvalidBody { .. }), "got: {err}");
}

#[tokio::test]
async fn get_all_teachers_sends_query_and_decodes() {
  let server = MockServer::start();
  let client = client(&server).await;
  let mock = server.mock(|when, then| {
    when
      .method(GET)
      .path("/api/teachers")
      .query_param("filter", "email!=''")
      .query_param("limit", "1000")
      .header("authorization", BEARER);
    then.status(200).json_body(json!({
      "users": [{
        "sourcedId": "a-test-teacher-sourced-id",
        "status": "active",
        "dateLastModified": "2021-08-09T12:30:00Z",
        "metadata": {"meta": "data"},
        "enabledUser": "true",
        "username": "jqdoe",
        "givenName": "Jane",
        "middleName": "Q",
        "familyName": "Doe",
        "role": "teacher",
        "email": "jqdoe@test.com"
      }]
    }));
  });

  let query = Query::new().filter("email!=''").limit(1000);
  let teachers = client.get_all_teachers(&query).await.unwrap();
  mock.assert();

  assert_eq!(teachers.len(), 1);
  let teacher = &teachers[0];
  assert_eq!(teacher.base.sourced_id, "a-test-teacher-sourced-id");
  assert_eq!(teacher.base.status, Status::Active);
  assert!(teacher.active);
  assert_eq!(teacher.first_name, "Jane");
  assert_eq!(teacher.middle_name.as_deref(), Some("Q"));
  assert_eq!(teacher.role, Role::Teacher);
}

#[tokio::test]
async fn get_classes_for_teacher_decodes_in_order() {
  let server = MockServer::start();
  let client = client(&server).await;
  server.mock(|when, then| {
    when.method(GET).path("/api/teachers/t-1/classes");
    then.status(200).json_body(json!({
      "classes": [
        {
          "sourcedId": "a-test-class-sourced-id-01",
          "status": "active",
          "dateLastModified": "2021-08-09T01:01:01Z",
          "title": "Math 101",
          "metadata": {"meta": "data"},
          "periods": ["1", "2"]
        },
        {
          "sourcedId": "a-test-class-sourced-id-02",
          "status": "active",
          "dateLastModified": "2021-08-09T02:02:02Z",
          "title": "English 101",
          "metadata": {"meta": "data"},
          "periods": ["99", "999"]
        }
      ]
    }));
  });

  let classes = client
    .get_classes_for_teacher("t-1", &Query::default())
    .await
    .unwrap();
  assert_eq!(classes.len(), 2);
  assert_eq!(classes[0].name, "Math 101");
  assert_eq!(classes[0].periods, ["1", "2"]);
  assert_eq!(classes[1].base.sourced_id, "a-test-class-sourced-id-02");
  assert_eq!(classes[1].periods, ["99", "999"]);
}

#[tokio::test]
async fn get_students_for_class_handles_optional_fields() {
  let server = MockServer::start();
  let client = client(&server).await;
  server.mock(|when, then| {
    when.method(GET).path("/api/classes/c-1/students");
    then.status(200).json_body(json!({
      "users": [
        {
          "sourcedId": "a-student-sourced-id-01",
          "status": "active",
          "dateLastModified": "2021-08-09T12:30:00Z",
          "metadata": {"meta": "data"},
          "enabledUser": "true",
          "username": "JayDoey",
          "givenName": "Johnny",
          "familyName": "Doey",
          "role": "student",
          "email": "jaydoey@test.com"
        },
        {
          "sourcedId": "a-student-sourced-id-10",
          "status": "active",
          "dateLastModified": "2021-08-10T08:15:00Z",
          "metadata": {"meta": "data"},
          "enabledUser": "true",
          "username": "arlise",
          "givenName": "Arlise",
          "middleName": "Inn",
          "familyName": "Vunderland",
          "role": "student"
        }
      ]
    }));
  });

  let students = client
    .get_students_for_class("c-1", &Query::default())
    .await
    .unwrap();
  assert_eq!(students.len(), 2);
  assert_eq!(students[0].middle_name, None);
  assert_eq!(students[0].email.as_deref(), Some("jaydoey@test.com"));
  assert_eq!(students[1].middle_name.as_deref(), Some("Inn"));
  assert_eq!(students[1].email, None);
  assert!(students.iter().all(|s| s.role == Role::Student));
}

#[tokio::test]
async fn resource_error_names_the_call() {
  let server = MockServer::start();
  let client = client(&server).await;
  server.mock(|when, then| {
    when.method(GET).path("/api/classes/c-9/students");
    then.status(500);
  });

  let err = client
    .get_students_for_class("c-9", &Query::default())
    .await
    .unwrap_err();
  assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
  assert!(err.to_string().contains("GET /classes/c-9/students"), "got: {err}");
}

#[tokio::test]
async fn unknown_role_is_a_decode_error() {
  let server = MockServer::start();
  let client = client(&server).await;
  server.mock(|when, then| {
    when.method(GET).path("/api/teachers");
    then.status(200).json_body(json!({
      "users": [{
        "sourcedId": "x",
        "status": "active",
        "dateLastModified": "2021-08-09T12:30:00Z",
        "enabledUser": "false",
        "username": "x",
        "givenName": "X",
        "familyName": "Y",
        "role": "guardian"
      }]
    }));
  });

  let err = client.get_all_teachers(&Query::default()).await.unwrap_err();
  assert!(matches!(err, Error::Decode { .. }), "got: {err}");
  assert!(err.to_string().contains("guardian"));
}

#[tokio::test]
async fn missing_envelope_is_a_decode_error() {
  let server = MockServer::start();
  let client = client(&server).await;
  server.mock(|when, then| {
    when.method(GET).path("/api/teachers/t-1/classes");
    then.status(200).json_body(json!({"users": []}));
  });

  let err = client
    .get_classes_for_teacher("t-1", &Query::default())
    .await
    .unwrap_err();
  assert!(err.to_string().contains("classes"), "got: {err}");
}
