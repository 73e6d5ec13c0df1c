//! Integration tests for the HTTP API.
//!
//! Each test drives the full router (extractors, handlers, error mapping)
//! over a sled store in a temporary directory.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use interviews_api::domain::User;
use interviews_api::infrastructure::persistence::{
    SledCommentRepository, SledInterviewRepository, SledUserRepository,
};
use interviews_api::infrastructure::JwtAuthenticator;
use interviews_api::port::UserRepository;
use interviews_api::presentation::{create_router, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    users: Arc<SledUserRepository>,
    jwt: Arc<JwtAuthenticator>,
    _dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db = sled::open(dir.path().join("db")).unwrap();

        let users = Arc::new(SledUserRepository::with_db(db.clone()));
        let interviews = Arc::new(SledInterviewRepository::with_db(db.clone()));
        let comments = Arc::new(SledCommentRepository::with_db(db));
        let jwt = Arc::new(JwtAuthenticator::new(b"integration-secret"));

        let state = AppState::new(users.clone(), interviews, comments, jwt.clone());
        Self {
            router: create_router(state),
            users,
            jwt,
            _dir: dir,
        }
    }

    /// Registers `username` and returns an `Authorization` header value.
    async fn login(&self, username: &str) -> String {
        let user = User::new(username);
        self.users.insert(&user).await.unwrap();
        format!("Token {}", self.jwt.issue(&user).unwrap())
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(&self, auth: &str, title: &str, tags: &[&str]) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/interviews",
                Some(auth),
                Some(json!({
                    "interview": {
                        "title": title,
                        "description": format!("{title} description"),
                        "body": format!("{title} body"),
                        "tagList": tags,
                    }
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["interview"]["slug"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_and_read_interview() {
    let app = TestApp::new();
    let alice = app.login("alice").await;

    let slug = app.create(&alice, "Hello World", &["rust", "rust", " "]).await;
    assert!(slug.starts_with("hello-world-"));
    assert_eq!(slug.len(), "hello-world-".len() + 6);

    let (status, body) = app
        .send(Method::GET, &format!("/api/interviews/{slug}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let interview = &body["interview"];
    assert_eq!(interview["title"], "Hello World");
    assert_eq!(interview["tagList"], json!(["rust"]));
    assert_eq!(interview["favoritesCount"], 0);
    assert_eq!(interview["favorited"], false);
    assert_eq!(interview["author"]["username"], "alice");
    assert!(interview["createdAt"].is_string());
}

#[tokio::test]
async fn test_create_requires_token() {
    let app = TestApp::new();
    let body = json!({"interview": {"title": "t", "description": "d", "body": "b"}});

    let (status, err) = app
        .send(Method::POST, "/api/interviews", None, Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(err["errors"]["authorization"].is_array());

    let (status, _) = app
        .send(Method::POST, "/api/interviews", Some("Token not-a-jwt"), Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::POST, "/api/interviews", Some("Basic abc"), Some(body))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_scheme_is_accepted() {
    let app = TestApp::new();
    let token = app.login("alice").await.replacen("Token", "Bearer", 1);
    app.create(&token, "Bearer works", &[]).await;
}

#[tokio::test]
async fn test_create_validation_errors() {
    let app = TestApp::new();
    let alice = app.login("alice").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/interviews",
            Some(&alice),
            Some(json!({"interview": {"title": "", "description": "d", "body": "b"}})),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["title"][0], "can't be blank");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/interviews",
            Some(&alice),
            Some(json!({"something": "else"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["body"].is_array());
}

#[tokio::test]
async fn test_update_rules() {
    let app = TestApp::new();
    let alice = app.login("alice").await;
    let bob = app.login("bob").await;
    let slug = app.create(&alice, "Original", &[]).await;
    let uri = format!("/api/interviews/{slug}");

    let (status, _) = app
        .send(
            Method::PUT,
            &uri,
            Some(&bob),
            Some(json!({"interview": {"title": "Hijacked"}})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(
            Method::PUT,
            &uri,
            Some(&alice),
            Some(json!({"interview": {"body": "rewritten"}})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interview"]["title"], "Original");
    assert_eq!(body["interview"]["body"], "rewritten");
    assert_eq!(body["interview"]["slug"], slug.as_str());

    let (status, body) = app
        .send(
            Method::PUT,
            &uri,
            Some(&alice),
            Some(json!({"interview": {"description": "   "}})),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["description"][0], "can't be blank");
}

#[tokio::test]
async fn test_delete_rules() {
    let app = TestApp::new();
    let alice = app.login("alice").await;
    let bob = app.login("bob").await;
    let slug = app.create(&alice, "Doomed", &[]).await;
    let uri = format!("/api/interviews/{slug}");

    let (status, _) = app.send(Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.send(Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, body) = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"]["interview"][0], "not found");
}

#[tokio::test]
async fn test_missing_token_is_checked_before_lookup() {
    let app = TestApp::new();
    let (status, _) = app
        .send(Method::DELETE, "/api/interviews/no-such-slug", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_favorite_round_trip() {
    let app = TestApp::new();
    let alice = app.login("alice").await;
    let bob = app.login("bob").await;
    let slug = app.create(&alice, "Hello World", &[]).await;
    let uri = format!("/api/interviews/{slug}/favorite");

    let (status, body) = app.send(Method::POST, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interview"]["favoritesCount"], 1);
    assert_eq!(body["interview"]["favorited"], true);

    let (_, body) = app.send(Method::POST, &uri, Some(&bob), None).await;
    assert_eq!(body["interview"]["favoritesCount"], 1);

    let (status, body) = app
        .send(Method::GET, "/api/interviews?favorited=bob", Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interviewsCount"], 1);
    assert_eq!(body["interviews"][0]["slug"], slug.as_str());

    let (status, body) = app.send(Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interview"]["favoritesCount"], 0);
    assert_eq!(body["interview"]["favorited"], false);

    let (status, _) = app
        .send(Method::POST, "/api/interviews/no-such-slug/favorite", Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_filters_and_pagination() {
    let app = TestApp::new();
    let alice = app.login("alice").await;
    let bob = app.login("bob").await;

    app.create(&alice, "Ruby one", &["ruby"]).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    app.create(&bob, "Go one", &["go"]).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let newest_ruby = app.create(&bob, "Ruby two", &["ruby"]).await;

    let (status, body) = app
        .send(Method::GET, "/api/interviews?tag=ruby&limit=1&offset=0", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interviews"].as_array().unwrap().len(), 1);
    assert_eq!(body["interviewsCount"], 2);
    assert_eq!(body["interviews"][0]["slug"], newest_ruby.as_str());

    let (_, body) = app
        .send(Method::GET, "/api/interviews?author=alice", None, None)
        .await;
    assert_eq!(body["interviewsCount"], 1);
    assert_eq!(body["interviews"][0]["author"]["username"], "alice");

    let (status, body) = app
        .send(Method::GET, "/api/interviews?author=nobody", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interviewsCount"], 3);

    let (status, body) = app
        .send(Method::GET, "/api/interviews?favorited=nobody", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interviews"], json!([]));
    assert_eq!(body["interviewsCount"], 0);

    let (_, body) = app.send(Method::GET, "/api/interviews", None, None).await;
    assert_eq!(body["interviewsCount"], 3);
}

#[tokio::test]
async fn test_list_with_empty_query_values() {
    let app = TestApp::new();
    let alice = app.login("alice").await;
    let slug = app.create(&alice, "Only one", &["solo"]).await;

    for uri in [
        "/api/interviews?tag=&author=&favorited=&limit=&offset=",
        "/api/interviews?author=",
        "/api/interviews?favorited=",
    ] {
        let (status, body) = app.send(Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::OK, "{uri}: {body}");
        assert_eq!(body["interviewsCount"], 1, "{uri}");
        assert_eq!(body["interviews"][0]["slug"], slug.as_str());
    }
}

#[tokio::test]
async fn test_list_with_malformed_paging_is_422() {
    let app = TestApp::new();

    let (status, body) = app
        .send(Method::GET, "/api/interviews?limit=many", None, None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["query"].is_array());
}

#[tokio::test]
async fn test_list_with_zero_limit_returns_everything() {
    let app = TestApp::new();
    let alice = app.login("alice").await;
    for n in 0..3 {
        app.create(&alice, &format!("post {n}"), &[]).await;
    }

    let (status, body) = app
        .send(Method::GET, "/api/interviews?limit=0", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interviews"].as_array().unwrap().len(), 3);
    assert_eq!(body["interviewsCount"], 3);
}

#[tokio::test]
async fn test_comment_lifecycle() {
    let app = TestApp::new();
    let alice = app.login("alice").await;
    let bob = app.login("bob").await;
    let slug = app.create(&alice, "Discuss", &[]).await;
    let comments_uri = format!("/api/interviews/{slug}/comments");

    let (status, body) = app
        .send(
            Method::POST,
            &comments_uri,
            Some(&alice),
            Some(json!({"comment": {"body": "first!"}})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = body["comment"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["comment"]["author"]["username"], "alice");

    let (status, body) = app.send(Method::GET, &comments_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comments"].as_array().unwrap().len(), 1);
    assert_eq!(body["comments"][0]["body"], "first!");

    let (_, body) = app
        .send(Method::GET, &format!("/api/interviews/{slug}"), None, None)
        .await;
    assert_eq!(body["interview"]["comments"], json!([comment_id]));

    let comment_uri = format!("{comments_uri}/{comment_id}");
    let (status, _) = app.send(Method::DELETE, &comment_uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(Method::DELETE, &comment_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app.send(Method::GET, &comments_uri, None, None).await;
    assert_eq!(body["comments"], json!([]));

    let (status, body) = app.send(Method::DELETE, &comment_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"]["comment"][0], "not found");
}

#[tokio::test]
async fn test_comment_validation_and_missing_interview() {
    let app = TestApp::new();
    let alice = app.login("alice").await;
    let slug = app.create(&alice, "Quiet", &[]).await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/interviews/{slug}/comments"),
            Some(&alice),
            Some(json!({"comment": {"body": "  "}})),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["body"][0], "can't be blank");

    let (status, _) = app
        .send(Method::GET, "/api/interviews/no-such-slug/comments", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/interviews/{slug}/comments/not-a-uuid"),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_optional_auth_ignores_bad_token() {
    let app = TestApp::new();
    let alice = app.login("alice").await;
    let slug = app.create(&alice, "Public", &[]).await;

    let (status, body) = app
        .send(
            Method::GET,
            &format!("/api/interviews/{slug}"),
            Some("Token garbage"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interview"]["favorited"], false);
}
