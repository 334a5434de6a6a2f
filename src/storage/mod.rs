//! Todo record storage.
//!
//! Every operation addresses a single record by `(todo_id, user_id)`; there
//! are no retries, transactions or batches.

mod conversions;
mod dynamodb;
mod inmemory;

use async_trait::async_trait;

use crate::common::Result;
use crate::models::{TodoItem, TodoUpdate};

pub use conversions::{item_to_todo, todo_to_item, UpdateExpression};
pub use dynamodb::DynamoTodos;
pub use inmemory::InMemoryTodos;

#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// All todos of one owner, oldest first.
    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<TodoItem>>;

    /// Stores a new todo and returns it unchanged.
    async fn create(&self, item: TodoItem) -> Result<TodoItem>;

    /// Applies `patch` to an existing todo. Fails with `NotFound` when the
    /// owner has no such todo.
    async fn update(&self, todo_id: &str, user_id: &str, patch: TodoUpdate) -> Result<TodoUpdate>;

    /// Fails with `NotFound` when the owner has no such todo.
    async fn delete(&self, todo_id: &str, user_id: &str) -> Result<()>;
}

#[async_trait]
pub trait AttachmentReferences: Send + Sync {
    /// Overwrites the attachment URL of an existing todo and returns it.
    async fn set_attachment_url(&self, todo_id: &str, user_id: &str, url: String)
        -> Result<String>;
}
