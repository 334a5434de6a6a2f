use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use lambda_http::http::header::{AUTHORIZATION, CONTENT_TYPE};
use lambda_http::http::StatusCode;
use lambda_http::{Body, Request, RequestExt, Response};
use serde_json::{json, Value};

use todo_lambdas::attachments::UploadSigner;
use todo_lambdas::auth::JwtSubject;
use todo_lambdas::common::errors::into_lambda_result;
use todo_lambdas::common::Result;
use todo_lambdas::config::Config;
use todo_lambdas::handlers::{self, AppState};
use todo_lambdas::service::TodoService;
use todo_lambdas::storage::InMemoryTodos;

struct QuerySigner {
    config: Config,
}

#[async_trait]
impl UploadSigner for QuerySigner {
    async fn signed_upload_url(&self, key: &str, expires_in: Duration) -> Result<String> {
        Ok(format!(
            "{}?X-Amz-Expires={}&X-Amz-Signature=abc",
            self.config.attachment_url(key),
            expires_in.as_secs()
        ))
    }
}

fn app() -> AppState {
    let config = Config::from_lookup(|name| match name {
        "ATTACHMENT_S3_BUCKET" => Some("lifecycle-attachments".to_string()),
        "SIGNED_URL_EXPIRATION" => Some("120".to_string()),
        _ => None,
    })
    .unwrap();
    let store = Arc::new(InMemoryTodos::new());
    let signer = Arc::new(QuerySigner {
        config: config.clone(),
    });

    AppState::new(
        TodoService::new(store.clone(), store, signer, config),
        Arc::new(JwtSubject),
    )
}

fn token(user_id: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256"}"#);
    let claims = URL_SAFE_NO_PAD.encode(json!({ "sub": user_id }).to_string());
    format!("{header}.{claims}.sig")
}

fn request(user_id: &str, todo_id: Option<&str>, body: Option<Value>) -> Request {
    let request = lambda_http::http::Request::builder()
        .header(AUTHORIZATION, format!("Bearer {}", token(user_id)))
        .header(CONTENT_TYPE, "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or(Body::Empty))
        .unwrap();

    match todo_id {
        Some(todo_id) => request.with_path_parameters(HashMap::from([(
            "todoId".to_string(),
            vec![todo_id.to_string()],
        )])),
        None => request,
    }
}

fn parse(response: &Response<String>) -> Value {
    serde_json::from_str(response.body()).unwrap()
}

async fn list(app: &AppState, user_id: &str) -> Vec<Value> {
    let response = into_lambda_result(handlers::get_todos(request(user_id, None, None), app).await)
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    parse(&response)["items"].as_array().unwrap().clone()
}

#[tokio::test]
async fn todo_lifecycle() {
    let app = app();

    let created = into_lambda_result(
        handlers::create_todo(
            request(
                "alice",
                None,
                Some(json!({ "name": "Write spec", "dueDate": "2024-01-01" })),
            ),
            &app,
        )
        .await,
    )
    .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let todo_id = parse(&created)["item"]["todoId"]
        .as_str()
        .unwrap()
        .to_string();

    let todos = list(&app, "alice").await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0]["done"], false);

    let updated = into_lambda_result(
        handlers::update_todo(
            request("alice", Some(&todo_id), Some(json!({ "done": true }))),
            &app,
        )
        .await,
    )
    .unwrap();
    assert_eq!(updated.status(), StatusCode::OK);
    assert_eq!(parse(&updated)["item"], json!({ "done": true }));

    let todos = list(&app, "alice").await;
    assert_eq!(todos[0]["done"], true);
    assert_eq!(todos[0]["name"], "Write spec");
    assert_eq!(todos[0]["dueDate"], "2024-01-01");

    let deleted = into_lambda_result(
        handlers::delete_todo(request("alice", Some(&todo_id), None), &app).await,
    )
    .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);
    assert!(list(&app, "alice").await.is_empty());

    let deleted_again = into_lambda_result(
        handlers::delete_todo(request("alice", Some(&todo_id), None), &app).await,
    )
    .unwrap();
    assert_eq!(deleted_again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn due_date_update_persists() {
    let app = app();
    let created = into_lambda_result(
        handlers::create_todo(
            request(
                "alice",
                None,
                Some(json!({ "name": "Pay rent", "dueDate": "2024-01-01" })),
            ),
            &app,
        )
        .await,
    )
    .unwrap();
    let todo_id = parse(&created)["item"]["todoId"]
        .as_str()
        .unwrap()
        .to_string();

    into_lambda_result(
        handlers::update_todo(
            request(
                "alice",
                Some(&todo_id),
                Some(json!({ "name": "Pay rent", "dueDate": "2024-02-01", "done": false })),
            ),
            &app,
        )
        .await,
    )
    .unwrap();

    assert_eq!(list(&app, "alice").await[0]["dueDate"], "2024-02-01");
}

#[tokio::test]
async fn owners_do_not_see_each_other() {
    let app = app();
    for (user_id, name) in [("alice", "Buy milk"), ("bob", "Walk dog")] {
        into_lambda_result(
            handlers::create_todo(
                request(
                    user_id,
                    None,
                    Some(json!({ "name": name, "dueDate": "2024-01-01" })),
                ),
                &app,
            )
            .await,
        )
        .unwrap();
    }

    let alices = list(&app, "alice").await;
    assert_eq!(alices.len(), 1);
    assert_eq!(alices[0]["name"], "Buy milk");

    let bobs = list(&app, "bob").await;
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0]["userId"], "bob");
}

#[tokio::test]
async fn upload_url_points_at_registered_attachment() {
    let app = app();
    let created = into_lambda_result(
        handlers::create_todo(
            request(
                "alice",
                None,
                Some(json!({ "name": "Scan receipt", "dueDate": "2024-01-01" })),
            ),
            &app,
        )
        .await,
    )
    .unwrap();
    let todo_id = parse(&created)["item"]["todoId"]
        .as_str()
        .unwrap()
        .to_string();

    let response = into_lambda_result(
        handlers::generate_upload_url(request("alice", Some(&todo_id), None), &app).await,
    )
    .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let upload_url = parse(&response)["uploadUrl"].as_str().unwrap().to_string();

    let todos = list(&app, "alice").await;
    let attachment_url = todos[0]["attachmentUrl"].as_str().unwrap();
    assert!(attachment_url
        .starts_with("https://lifecycle-attachments.s3.us-east-1.amazonaws.com/"));

    let (location, query) = upload_url.split_once('?').unwrap();
    assert_eq!(location, attachment_url);
    assert!(query.contains("X-Amz-Expires=120"));

    let other_owner = into_lambda_result(
        handlers::generate_upload_url(request("bob", Some(&todo_id), None), &app).await,
    )
    .unwrap();
    assert_eq!(other_owner.status(), StatusCode::NOT_FOUND);
}
