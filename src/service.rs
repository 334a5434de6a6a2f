//! Caller-facing todo operations.
//!
//! Storage errors are passed through unchanged; nothing is retried here.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::info;
use uuid::Uuid;

use crate::attachments::UploadSigner;
use crate::common::Result;
use crate::config::Config;
use crate::models::{CreateTodoRequest, TodoItem, TodoUpdate};
use crate::storage::{AttachmentReferences, TodoRepository};

#[derive(Clone)]
pub struct TodoService {
    todos: Arc<dyn TodoRepository>,
    attachments: Arc<dyn AttachmentReferences>,
    signer: Arc<dyn UploadSigner>,
    config: Config,
}

impl TodoService {
    pub fn new(
        todos: Arc<dyn TodoRepository>,
        attachments: Arc<dyn AttachmentReferences>,
        signer: Arc<dyn UploadSigner>,
        config: Config,
    ) -> Self {
        Self {
            todos,
            attachments,
            signer,
            config,
        }
    }

    pub async fn list_todos(&self, user_id: &str) -> Result<Vec<TodoItem>> {
        self.todos.list_by_owner(user_id).await
    }

    /// Handlers validate first; the check is repeated for other callers.
    pub async fn create_todo(&self, user_id: &str, request: CreateTodoRequest) -> Result<TodoItem> {
        let request = request.validated()?;

        self.todos
            .create(TodoItem {
                todo_id: Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                name: request.name,
                due_date: request.due_date,
                created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                done: false,
                attachment_url: None,
            })
            .await
    }

    pub async fn update_todo(
        &self,
        todo_id: &str,
        user_id: &str,
        patch: TodoUpdate,
    ) -> Result<TodoUpdate> {
        let patch = patch.validated()?;
        self.todos.update(todo_id, user_id, patch).await
    }

    pub async fn delete_todo(&self, todo_id: &str, user_id: &str) -> Result<()> {
        self.todos.delete(todo_id, user_id).await
    }

    /// Registers a fresh attachment URL on the todo, then returns a signed
    /// upload URL for that same object.
    ///
    /// The record points at the object before any bytes are uploaded.
    pub async fn request_attachment_upload(&self, todo_id: &str, user_id: &str) -> Result<String> {
        info!("Create attachment presigned url for todo: {}", todo_id);

        let attachment_id = Uuid::new_v4().to_string();
        let url = self.config.attachment_url(&attachment_id);
        self.attachments
            .set_attachment_url(todo_id, user_id, url)
            .await?;

        self.signer
            .signed_upload_url(&attachment_id, self.config.signed_url_expiration)
            .await
    }
}
