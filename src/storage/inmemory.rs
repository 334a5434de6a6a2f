use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AttachmentReferences, TodoRepository};
use crate::common::{Result, TodoError};
use crate::models::{TodoItem, TodoUpdate};

type RecordKey = (String, String);

/// In-memory todo storage for tests and local runs.
///
/// Mirrors the DynamoDB backend: records keyed by `(todo_id, user_id)`,
/// conditional writes, listing ordered by `created_at`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTodos {
    todos: Arc<RwLock<HashMap<RecordKey, TodoItem>>>,
}

impl InMemoryTodos {
    pub fn new() -> Self {
        Self::default()
    }
}

fn record_key(todo_id: &str, user_id: &str) -> RecordKey {
    (todo_id.to_string(), user_id.to_string())
}

#[async_trait]
impl TodoRepository for InMemoryTodos {
    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<TodoItem>> {
        let todos = self.todos.read().await;
        let mut owned: Vec<TodoItem> = todos
            .values()
            .filter(|todo| todo.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.todo_id.cmp(&b.todo_id))
        });

        Ok(owned)
    }

    async fn create(&self, item: TodoItem) -> Result<TodoItem> {
        let mut todos = self.todos.write().await;
        let key = record_key(&item.todo_id, &item.user_id);
        if todos.contains_key(&key) {
            return Err(TodoError::StorageWrite(format!(
                "Todo already exists: {}",
                item.todo_id
            )));
        }
        todos.insert(key, item.clone());

        Ok(item)
    }

    async fn update(&self, todo_id: &str, user_id: &str, patch: TodoUpdate) -> Result<TodoUpdate> {
        let mut todos = self.todos.write().await;
        let todo = todos
            .get_mut(&record_key(todo_id, user_id))
            .ok_or_else(|| TodoError::not_found(todo_id))?;
        patch.apply_to(todo);

        Ok(patch)
    }

    async fn delete(&self, todo_id: &str, user_id: &str) -> Result<()> {
        let mut todos = self.todos.write().await;
        todos
            .remove(&record_key(todo_id, user_id))
            .map(|_| ())
            .ok_or_else(|| TodoError::not_found(todo_id))
    }
}

#[async_trait]
impl AttachmentReferences for InMemoryTodos {
    async fn set_attachment_url(
        &self,
        todo_id: &str,
        user_id: &str,
        url: String,
    ) -> Result<String> {
        let mut todos = self.todos.write().await;
        let todo = todos
            .get_mut(&record_key(todo_id, user_id))
            .ok_or_else(|| TodoError::not_found(todo_id))?;
        todo.attachment_url = Some(url.clone());

        Ok(url)
    }
}
