//! DynamoDB-backed todo storage.
//!
//! Primary key is `(todoId, userId)`; listing goes through a secondary index
//! keyed by `(userId, createdAt)`.

use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tracing::info;

use super::conversions::{item_to_todo, todo_to_item, UpdateExpression, TODO_ID, USER_ID};
use super::{AttachmentReferences, TodoRepository};
use crate::common::{Result, TodoError};
use crate::models::{TodoItem, TodoUpdate};

const RECORD_EXISTS: &str = "attribute_exists(todoId)";
const RECORD_ABSENT: &str = "attribute_not_exists(todoId)";

#[derive(Debug, Clone)]
pub struct DynamoTodos {
    client: Client,
    table_name: String,
    created_at_index: String,
}

impl DynamoTodos {
    pub fn new(
        client: Client,
        table_name: impl Into<String>,
        created_at_index: impl Into<String>,
    ) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            created_at_index: created_at_index.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl TodoRepository for DynamoTodos {
    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<TodoItem>> {
        info!("Get all todos");

        let mut todos = Vec::new();
        let mut start_key = None;
        loop {
            let output = self
                .client
                .query()
                .table_name(&self.table_name)
                .index_name(&self.created_at_index)
                .key_condition_expression("userId = :userId")
                .expression_attribute_values(":userId", AttributeValue::S(user_id.to_string()))
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(map_query_error)?;

            for item in output.items.unwrap_or_default() {
                todos.push(item_to_todo(&item)?);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(todos)
    }

    async fn create(&self, item: TodoItem) -> Result<TodoItem> {
        info!("Create new todo: {}", item.todo_id);

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(todo_to_item(&item)))
            .condition_expression(RECORD_ABSENT)
            .send()
            .await
            .map_err(|err| map_put_item_error(err, &item.todo_id))?;

        Ok(item)
    }

    async fn update(&self, todo_id: &str, user_id: &str, patch: TodoUpdate) -> Result<TodoUpdate> {
        info!("Update todo: {}", todo_id);

        let UpdateExpression {
            expression,
            names,
            values,
        } = UpdateExpression::from_patch(&patch);

        self.client
            .update_item()
            .table_name(&self.table_name)
            .key(TODO_ID, AttributeValue::S(todo_id.to_string()))
            .key(USER_ID, AttributeValue::S(user_id.to_string()))
            .update_expression(expression)
            .set_expression_attribute_names((!names.is_empty()).then_some(names))
            .set_expression_attribute_values(Some(values))
            .condition_expression(RECORD_EXISTS)
            .send()
            .await
            .map_err(|err| map_update_item_error(err, todo_id))?;

        Ok(patch)
    }

    async fn delete(&self, todo_id: &str, user_id: &str) -> Result<()> {
        info!("Delete todo: {}", todo_id);

        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(TODO_ID, AttributeValue::S(todo_id.to_string()))
            .key(USER_ID, AttributeValue::S(user_id.to_string()))
            .condition_expression(RECORD_EXISTS)
            .send()
            .await
            .map_err(|err| map_delete_item_error(err, todo_id))?;

        Ok(())
    }
}

#[async_trait]
impl AttachmentReferences for DynamoTodos {
    async fn set_attachment_url(
        &self,
        todo_id: &str,
        user_id: &str,
        url: String,
    ) -> Result<String> {
        info!("Update attachment url of todo: {}", todo_id);

        self.client
            .update_item()
            .table_name(&self.table_name)
            .key(TODO_ID, AttributeValue::S(todo_id.to_string()))
            .key(USER_ID, AttributeValue::S(user_id.to_string()))
            .update_expression("SET attachmentUrl = :url")
            .expression_attribute_values(":url", AttributeValue::S(url.clone()))
            .condition_expression(RECORD_EXISTS)
            .send()
            .await
            .map_err(|err| map_update_item_error(err, todo_id))?;

        Ok(url)
    }
}

fn map_query_error<R: Debug + Send + Sync + 'static>(err: SdkError<QueryError, R>) -> TodoError {
    match err.into_service_error() {
        QueryError::ResourceNotFoundException(_) => {
            TodoError::Unknown("Table or index not found".to_string())
        }
        QueryError::ProvisionedThroughputExceededException(_) => {
            TodoError::Unknown("Throughput exceeded".to_string())
        }
        QueryError::InternalServerError(_) => {
            TodoError::Unknown("DynamoDB internal server error".to_string())
        }
        err => TodoError::Unknown(format!("Query failed: {:?}", err)),
    }
}

fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    todo_id: &str,
) -> TodoError {
    match err.into_service_error() {
        PutItemError::ConditionalCheckFailedException(_) => {
            TodoError::StorageWrite(format!("Todo already exists: {todo_id}"))
        }
        PutItemError::ProvisionedThroughputExceededException(_) => {
            TodoError::StorageWrite("Throughput exceeded".to_string())
        }
        err => TodoError::StorageWrite(format!("PutItem failed: {:?}", err)),
    }
}

fn map_update_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<UpdateItemError, R>,
    todo_id: &str,
) -> TodoError {
    match err.into_service_error() {
        UpdateItemError::ConditionalCheckFailedException(_) => TodoError::not_found(todo_id),
        UpdateItemError::ProvisionedThroughputExceededException(_) => {
            TodoError::StorageWrite("Throughput exceeded".to_string())
        }
        err => TodoError::StorageWrite(format!("UpdateItem failed: {:?}", err)),
    }
}

fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
    todo_id: &str,
) -> TodoError {
    match err.into_service_error() {
        DeleteItemError::ConditionalCheckFailedException(_) => TodoError::not_found(todo_id),
        DeleteItemError::ProvisionedThroughputExceededException(_) => {
            TodoError::StorageWrite("Throughput exceeded".to_string())
        }
        err => TodoError::StorageWrite(format!("DeleteItem failed: {:?}", err)),
    }
}
