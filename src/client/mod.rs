//! HTTP client for the todo API, used by front-ends.

mod list_view;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{CreateTodoRequest, TodoItem, TodoUpdate};

pub use list_view::{due_date_from, filter_by_name, TodoListView, ViewState, PAGE_SIZE};

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },
}

/// Calls made by the list view. Every call carries the caller's id token.
#[async_trait]
pub trait TodosApi: Send + Sync {
    async fn get_todos(&self, id_token: &str, page: u32, limit: u32) -> Result<Vec<TodoItem>>;

    async fn create_todo(&self, id_token: &str, request: &CreateTodoRequest) -> Result<TodoItem>;

    async fn patch_todo(&self, id_token: &str, todo_id: &str, update: &TodoUpdate) -> Result<()>;

    async fn delete_todo(&self, id_token: &str, todo_id: &str) -> Result<()>;

    async fn get_upload_url(&self, id_token: &str, todo_id: &str) -> Result<String>;

    /// PUTs the file straight to a signed upload URL; no id token involved.
    async fn upload_file(&self, upload_url: &str, file: Vec<u8>) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct ItemsBody {
    items: Vec<TodoItem>,
}

#[derive(Debug, Deserialize)]
struct ItemBody {
    item: TodoItem,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadUrlBody {
    upload_url: String,
}

#[derive(Debug, Clone)]
pub struct HttpTodosApi {
    client: reqwest::Client,
    api_endpoint: String,
}

impl HttpTodosApi {
    pub fn new(api_endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_endpoint: api_endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create from environment (TODOS_API_ENDPOINT or default).
    pub fn from_env() -> Self {
        let api_endpoint = std::env::var("TODOS_API_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:3003/dev".to_string());
        Self::new(api_endpoint)
    }

    pub fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_endpoint, path)
    }

    fn list_request(&self, id_token: &str, page: u32, limit: u32) -> reqwest::RequestBuilder {
        self.client
            .get(self.url("/todos"))
            .bearer_auth(id_token)
            .query(&[("page", page), ("limit", limit)])
    }

    fn create_request(&self, id_token: &str, request: &CreateTodoRequest) -> reqwest::RequestBuilder {
        self.client
            .post(self.url("/todos"))
            .bearer_auth(id_token)
            .json(request)
    }

    fn patch_request(&self, id_token: &str, todo_id: &str, update: &TodoUpdate) -> reqwest::RequestBuilder {
        self.client
            .patch(self.url(&format!("/todos/{}", todo_id)))
            .bearer_auth(id_token)
            .json(update)
    }

    fn delete_request(&self, id_token: &str, todo_id: &str) -> reqwest::RequestBuilder {
        self.client
            .delete(self.url(&format!("/todos/{}", todo_id)))
            .bearer_auth(id_token)
    }

    fn upload_url_request(&self, id_token: &str, todo_id: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(&format!("/todos/{}/attachment", todo_id)))
            .bearer_auth(id_token)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(ClientError::Server {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let response = Self::check_status(response).await?;
        response.json().await.map_err(ClientError::from)
    }
}

#[async_trait]
impl TodosApi for HttpTodosApi {
    async fn get_todos(&self, id_token: &str, page: u32, limit: u32) -> Result<Vec<TodoItem>> {
        let response = self.list_request(id_token, page, limit).send().await?;
        let body: ItemsBody = Self::json(response).await?;
        Ok(body.items)
    }

    async fn create_todo(&self, id_token: &str, request: &CreateTodoRequest) -> Result<TodoItem> {
        let response = self.create_request(id_token, request).send().await?;
        let body: ItemBody = Self::json(response).await?;
        Ok(body.item)
    }

    async fn patch_todo(&self, id_token: &str, todo_id: &str, update: &TodoUpdate) -> Result<()> {
        let response = self.patch_request(id_token, todo_id, update).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn delete_todo(&self, id_token: &str, todo_id: &str) -> Result<()> {
        let response = self.delete_request(id_token, todo_id).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn get_upload_url(&self, id_token: &str, todo_id: &str) -> Result<String> {
        let response = self.upload_url_request(id_token, todo_id).send().await?;
        let body: UploadUrlBody = Self::json(response).await?;
        Ok(body.upload_url)
    }

    async fn upload_file(&self, upload_url: &str, file: Vec<u8>) -> Result<()> {
        let response = self.client.put(upload_url).body(file).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lambda_http::http;
    use reqwest::header::AUTHORIZATION;
    use reqwest::Method;

    use super::*;

    fn api() -> HttpTodosApi {
        HttpTodosApi::new("https://api.example.com/dev")
    }

    fn response(status: u16, body: &str) -> reqwest::Response {
        reqwest::Response::from(
            http::Response::builder()
                .status(status)
                .body(body.to_string())
                .unwrap(),
        )
    }

    #[test]
    fn test_list_request() {
        let request = api().list_request("tok", 2, 2).build().unwrap();
        assert_eq!(request.method(), Method::GET);
        assert_eq!(
            request.url().as_str(),
            "https://api.example.com/dev/todos?page=2&limit=2"
        );
        assert_eq!(request.headers()[AUTHORIZATION], "Bearer tok");
    }

    #[test]
    fn test_write_requests() {
        let api = api();

        let create = CreateTodoRequest {
            name: "Buy milk".into(),
            due_date: "2024-01-08".into(),
        };
        let request = api.create_request("tok", &create).build().unwrap();
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.url().path(), "/dev/todos");
        let body: serde_json::Value =
            serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "name": "Buy milk", "dueDate": "2024-01-08" }));

        let update = TodoUpdate {
            done: Some(true),
            ..Default::default()
        };
        let request = api.patch_request("tok", "t-1", &update).build().unwrap();
        assert_eq!(request.method(), Method::PATCH);
        assert_eq!(request.url().path(), "/dev/todos/t-1");
        assert_eq!(request.headers()[AUTHORIZATION], "Bearer tok");

        let request = api.delete_request("tok", "t-1").build().unwrap();
        assert_eq!(request.method(), Method::DELETE);
        assert_eq!(request.url().path(), "/dev/todos/t-1");

        let request = api.upload_url_request("tok", "t-1").build().unwrap();
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.url().path(), "/dev/todos/t-1/attachment");
        assert_eq!(request.headers()[AUTHORIZATION], "Bearer tok");
    }

    #[tokio::test]
    async fn test_non_success_status_maps_to_server_error() {
        let err = HttpTodosApi::check_status(response(404, r#"{"error":"gone"}"#))
            .await
            .unwrap_err();
        match err {
            ClientError::Server { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, r#"{"error":"gone"}"#);
            }
            other => panic!("unexpected error: {other}"),
        }

        let body: UploadUrlBody = HttpTodosApi::json(response(200, r#"{"uploadUrl":"https://u"}"#))
            .await
            .unwrap();
        assert_eq!(body.upload_url, "https://u");
    }

    #[test]
    fn test_urls_are_joined_without_double_slash() {
        let api = HttpTodosApi::new("https://api.example.com/dev/");
        assert_eq!(api.api_endpoint(), "https://api.example.com/dev");
        assert_eq!(api.url("/todos"), "https://api.example.com/dev/todos");
    }

    #[test]
    fn test_response_bodies_deserialize() {
        let body: UploadUrlBody =
            serde_json::from_str(r#"{"uploadUrl":"https://bucket/img?sig=1"}"#).unwrap();
        assert_eq!(body.upload_url, "https://bucket/img?sig=1");

        let body: ItemsBody = serde_json::from_str(r#"{"items":[]}"#).unwrap();
        assert!(body.items.is_empty());
    }

    #[test]
    fn test_server_error_display() {
        let err = ClientError::Server {
            status: 404,
            message: "gone".into(),
        };
        assert_eq!(err.to_string(), "Server returned 404: gone");
    }
}
