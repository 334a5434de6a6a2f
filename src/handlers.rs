//! One request handler per Lambda function.
//!
//! Each handler resolves the caller, parses its input, calls the
//! [`TodoService`] and renders the result. Client errors never reach the
//! service.

use std::sync::Arc;

use lambda_http::http::StatusCode;
use lambda_http::{Request as LambdaRequest, Response as LambdaResponse};
use serde::Serialize;
use tracing::info;

use crate::attachments::S3UploadSigner;
use crate::auth::{bearer_token, IdentityVerifier, JwtSubject};
use crate::common::utils::{extract_request, json_response, path_parameter, query_parameter};
use crate::common::{Error, Result, TodoError};
use crate::config::Config;
use crate::models::{CreateTodoRequest, TodoItem, TodoUpdate};
use crate::service::TodoService;
use crate::storage::DynamoTodos;

const TODO_ID_PARAM: &str = "todoId";

/// Dependencies shared by every invocation of a function instance.
#[derive(Clone)]
pub struct AppState {
    pub service: TodoService,
    pub identity: Arc<dyn IdentityVerifier>,
}

impl AppState {
    pub fn new(service: TodoService, identity: Arc<dyn IdentityVerifier>) -> Self {
        Self { service, identity }
    }

    /// Builds the AWS-backed state. Called once per cold start.
    pub async fn from_config(config: Config) -> Self {
        let sdk_config = config.sdk_config().await;
        let todos = Arc::new(DynamoTodos::new(
            config.dynamodb_client(&sdk_config),
            config.todos_table.clone(),
            config.created_at_index.clone(),
        ));
        let signer = Arc::new(S3UploadSigner::new(
            config.s3_client(&sdk_config),
            config.attachment_bucket.clone(),
        ));
        info!("Using todos table {}", todos.table_name());

        Self::new(
            TodoService::new(todos.clone(), todos, signer, config),
            Arc::new(JwtSubject),
        )
    }

    fn user_id(&self, request: &LambdaRequest) -> Result<String> {
        let token = bearer_token(request)?;
        self.identity.user_id(token)
    }
}

#[derive(Debug, Serialize)]
struct ItemsResponse {
    items: Vec<TodoItem>,
}

#[derive(Debug, Serialize)]
struct ItemResponse<T> {
    item: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadUrlResponse {
    upload_url: String,
}

/// Slices out a 1-based page. Without a `limit` everything is returned.
fn paginate(todos: Vec<TodoItem>, page: Option<usize>, limit: Option<usize>) -> Result<Vec<TodoItem>> {
    let Some(limit) = limit else {
        return Ok(todos);
    };
    let page = page.unwrap_or(1);
    if page == 0 || limit == 0 {
        return Err(TodoError::Validation(
            "page and limit must be positive".into(),
        ));
    }

    let start = (page - 1).saturating_mul(limit);
    Ok(todos.into_iter().skip(start).take(limit).collect())
}

#[tracing::instrument(skip_all)]
pub async fn get_todos(
    request: LambdaRequest,
    state: &AppState,
) -> std::result::Result<LambdaResponse<String>, Error> {
    let user_id = state.user_id(&request)?;
    let page = query_parameter::<usize>(&request, "page")?;
    let limit = query_parameter::<usize>(&request, "limit")?;

    let todos = state.service.list_todos(&user_id).await?;
    let items = paginate(todos, page, limit)?;

    json_response(StatusCode::OK, &ItemsResponse { items })
}

#[tracing::instrument(skip_all)]
pub async fn create_todo(
    request: LambdaRequest,
    state: &AppState,
) -> std::result::Result<LambdaResponse<String>, Error> {
    let user_id = state.user_id(&request)?;
    let new_todo = extract_request::<CreateTodoRequest>(&request)?.validated()?;

    let item = state.service.create_todo(&user_id, new_todo).await?;

    json_response(StatusCode::CREATED, &ItemResponse { item })
}

#[tracing::instrument(skip_all)]
pub async fn update_todo(
    request: LambdaRequest,
    state: &AppState,
) -> std::result::Result<LambdaResponse<String>, Error> {
    let user_id = state.user_id(&request)?;
    let todo_id = path_parameter(&request, TODO_ID_PARAM)?;
    let patch = extract_request::<TodoUpdate>(&request)?.validated()?;

    let item = state.service.update_todo(&todo_id, &user_id, patch).await?;

    json_response(StatusCode::OK, &ItemResponse { item })
}

#[tracing::instrument(skip_all)]
pub async fn delete_todo(
    request: LambdaRequest,
    state: &AppState,
) -> std::result::Result<LambdaResponse<String>, Error> {
    let user_id = state.user_id(&request)?;
    let todo_id = path_parameter(&request, TODO_ID_PARAM)?;

    state.service.delete_todo(&todo_id, &user_id).await?;

    json_response(StatusCode::OK, &serde_json::json!({}))
}

#[tracing::instrument(skip_all)]
pub async fn generate_upload_url(
    request: LambdaRequest,
    state: &AppState,
) -> std::result::Result<LambdaResponse<String>, Error> {
    let user_id = state.user_id(&request)?;
    let todo_id = path_parameter(&request, TODO_ID_PARAM)?;

    let upload_url = state
        .service
        .request_attachment_upload(&todo_id, &user_id)
        .await?;

    json_response(StatusCode::OK, &UploadUrlResponse { upload_url })
}
