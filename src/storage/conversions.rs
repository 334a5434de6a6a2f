//! Pure conversions between todos and DynamoDB attribute maps.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;

use crate::common::{Result, TodoError};
use crate::models::{TodoItem, TodoUpdate};

pub const TODO_ID: &str = "todoId";
pub const USER_ID: &str = "userId";
pub const NAME: &str = "name";
pub const DUE_DATE: &str = "dueDate";
pub const CREATED_AT: &str = "createdAt";
pub const DONE: &str = "done";
pub const ATTACHMENT_URL: &str = "attachmentUrl";

pub fn todo_to_item(todo: &TodoItem) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();

    item.insert(TODO_ID.to_string(), AttributeValue::S(todo.todo_id.clone()));
    item.insert(USER_ID.to_string(), AttributeValue::S(todo.user_id.clone()));
    item.insert(NAME.to_string(), AttributeValue::S(todo.name.clone()));
    item.insert(DUE_DATE.to_string(), AttributeValue::S(todo.due_date.clone()));
    item.insert(
        CREATED_AT.to_string(),
        AttributeValue::S(todo.created_at.clone()),
    );
    item.insert(DONE.to_string(), AttributeValue::Bool(todo.done));
    if let Some(url) = &todo.attachment_url {
        item.insert(ATTACHMENT_URL.to_string(), AttributeValue::S(url.clone()));
    }

    item
}

pub fn item_to_todo(item: &HashMap<String, AttributeValue>) -> Result<TodoItem> {
    Ok(TodoItem {
        todo_id: get_string(item, TODO_ID)?,
        user_id: get_string(item, USER_ID)?,
        name: get_string(item, NAME)?,
        due_date: get_string(item, DUE_DATE)?,
        created_at: get_string(item, CREATED_AT)?,
        done: get_bool(item, DONE)?,
        attachment_url: get_optional_string(item, ATTACHMENT_URL)?,
    })
}

/// `SET` clause for a partial update, with its placeholder bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

impl UpdateExpression {
    /// Builds the clause from the fields present in `patch`.
    ///
    /// `name` is a DynamoDB reserved word and is always aliased.
    pub fn from_patch(patch: &TodoUpdate) -> Self {
        let mut assignments = Vec::with_capacity(3);
        let mut names = HashMap::new();
        let mut values = HashMap::new();

        if let Some(name) = &patch.name {
            assignments.push("#todo_name = :name");
            names.insert("#todo_name".to_string(), NAME.to_string());
            values.insert(":name".to_string(), AttributeValue::S(name.clone()));
        }
        if let Some(due_date) = &patch.due_date {
            assignments.push("dueDate = :dueDate");
            values.insert(":dueDate".to_string(), AttributeValue::S(due_date.clone()));
        }
        if let Some(done) = patch.done {
            assignments.push("done = :done");
            values.insert(":done".to_string(), AttributeValue::Bool(done));
        }

        Self {
            expression: format!("SET {}", assignments.join(", ")),
            names,
            values,
        }
    }
}

fn get_string(item: &HashMap<String, AttributeValue>, key: &str) -> Result<String> {
    item.get(key)
        .and_then(|value| value.as_s().ok())
        .cloned()
        .ok_or_else(|| TodoError::Unknown(format!("Missing or invalid attribute: {key}")))
}

fn get_optional_string(item: &HashMap<String, AttributeValue>, key: &str) -> Result<Option<String>> {
    match item.get(key) {
        None | Some(AttributeValue::Null(_)) => Ok(None),
        Some(value) => value
            .as_s()
            .map(|s| Some(s.clone()))
            .map_err(|_| TodoError::Unknown(format!("Invalid attribute: {key}"))),
    }
}

fn get_bool(item: &HashMap<String, AttributeValue>, key: &str) -> Result<bool> {
    item.get(key)
        .and_then(|value| value.as_bool().ok())
        .copied()
        .ok_or_else(|| TodoError::Unknown(format!("Missing or invalid attribute: {key}")))
}
