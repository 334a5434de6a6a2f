use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::common::{Result, TodoError};

pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// One task as persisted in the todos table, keyed by `(todo_id, user_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub todo_id: String,
    pub user_id: String,
    pub name: String,
    pub due_date: String,
    pub created_at: String,
    pub done: bool,
    /// Registered before the upload happens, so the object may not exist yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
}

/// The mutable fields of a [`TodoItem`]. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

impl TodoUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.due_date.is_none() && self.done.is_none()
    }

    /// Checks the supplied fields and returns the patch with `name` trimmed.
    pub fn validated(self) -> Result<Self> {
        if self.is_empty() {
            return Err(TodoError::Validation(
                "Update must contain at least one of name, dueDate, done".into(),
            ));
        }

        let name = self.name.as_deref().map(validate_name).transpose()?;
        if let Some(due_date) = &self.due_date {
            validate_due_date(due_date)?;
        }

        Ok(Self { name, ..self })
    }

    pub fn apply_to(&self, todo: &mut TodoItem) {
        if let Some(name) = &self.name {
            todo.name = name.clone();
        }
        if let Some(due_date) = &self.due_date {
            todo.due_date = due_date.clone();
        }
        if let Some(done) = self.done {
            todo.done = done;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub name: String,
    pub due_date: String,
}

impl CreateTodoRequest {
    pub fn validated(self) -> Result<Self> {
        let name = validate_name(&self.name)?;
        validate_due_date(&self.due_date)?;

        Ok(Self {
            name,
            due_date: self.due_date,
        })
    }
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TodoError::Validation("name must not be empty".into()));
    }

    Ok(name.to_string())
}

fn validate_due_date(due_date: &str) -> Result<()> {
    NaiveDate::parse_from_str(due_date, DUE_DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| TodoError::Validation(format!("dueDate must be YYYY-MM-DD: {due_date}")))
}
