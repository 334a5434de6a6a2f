//! State behind the todo list page.
//!
//! The list only grows by appending pages; local edits are applied after the
//! matching server call succeeds and left alone when it fails. Each failure
//! raises a blocking alert (`ViewState::ErrorDisplayed`).

use chrono::{Days, Local, NaiveDate};
use tracing::warn;

use super::TodosApi;
use crate::models::{CreateTodoRequest, TodoItem, TodoUpdate, DUE_DATE_FORMAT};

pub const PAGE_SIZE: u32 = 2;
const DUE_IN_DAYS: u64 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Loading,
    ErrorDisplayed(String),
}

pub struct TodoListView<A> {
    api: A,
    id_token: String,
    todos: Vec<TodoItem>,
    new_todo_name: String,
    page: u32,
    filter: String,
    state: ViewState,
}

impl<A: TodosApi> TodoListView<A> {
    pub fn new(api: A, id_token: impl Into<String>) -> Self {
        Self {
            api,
            id_token: id_token.into(),
            todos: Vec::new(),
            new_todo_name: String::new(),
            page: 1,
            filter: String::new(),
            state: ViewState::Idle,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == ViewState::Loading
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Everything loaded so far, unfiltered.
    pub fn todos(&self) -> &[TodoItem] {
        &self.todos
    }

    pub fn visible_todos(&self) -> Vec<&TodoItem> {
        filter_by_name(&self.todos, &self.filter)
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn set_new_todo_name(&mut self, name: impl Into<String>) {
        self.new_todo_name = name.into();
    }

    pub fn dismiss_alert(&mut self) {
        if let ViewState::ErrorDisplayed(_) = self.state {
            self.state = ViewState::Idle;
        }
    }

    pub async fn mount(&mut self) {
        self.load().await;
    }

    /// Requests the next page and appends it. Results are not de-duplicated.
    pub async fn load_more(&mut self) {
        self.page += 1;
        self.load().await;
    }

    async fn load(&mut self) {
        self.state = ViewState::Loading;
        match self.api.get_todos(&self.id_token, self.page, PAGE_SIZE).await {
            Ok(results) => {
                self.todos.extend(results);
                self.state = ViewState::Idle;
            }
            Err(err) => self.alert(format!("Failed to fetch todos: {err}")),
        }
    }

    pub async fn create_todo(&mut self) {
        let request = CreateTodoRequest {
            name: self.new_todo_name.trim().to_string(),
            due_date: due_date_from(Local::now().date_naive()),
        };

        match self.api.create_todo(&self.id_token, &request).await {
            Ok(todo) => {
                self.todos.push(todo);
                self.new_todo_name.clear();
            }
            Err(err) => {
                warn!("{}", err);
                self.alert("Todo creation failed, pls check your input data".to_string());
            }
        }
    }

    pub async fn toggle_done(&mut self, todo_id: &str) {
        let Some(pos) = self.todos.iter().position(|todo| todo.todo_id == todo_id) else {
            return;
        };

        let todo = &self.todos[pos];
        let update = TodoUpdate {
            name: Some(todo.name.clone()),
            due_date: Some(todo.due_date.clone()),
            done: Some(!todo.done),
        };

        match self.api.patch_todo(&self.id_token, todo_id, &update).await {
            Ok(()) => self.todos[pos].done = !self.todos[pos].done,
            Err(err) => {
                warn!("{}", err);
                self.alert("Todo update todo check failed".to_string());
            }
        }
    }

    pub async fn delete_todo(&mut self, todo_id: &str) {
        match self.api.delete_todo(&self.id_token, todo_id).await {
            Ok(()) => self.todos.retain(|todo| todo.todo_id != todo_id),
            Err(err) => {
                warn!("{}", err);
                self.alert("Todo deletion failed".to_string());
            }
        }
    }

    /// Uploads `file` as the todo's attachment through a signed URL.
    ///
    /// The server records the attachment URL before handing out the upload
    /// URL, so the local copy is updated only on a later reload.
    pub async fn attach_file(&mut self, todo_id: &str, file: Vec<u8>) {
        let result = match self.api.get_upload_url(&self.id_token, todo_id).await {
            Ok(upload_url) => self.api.upload_file(&upload_url, file).await,
            Err(err) => Err(err),
        };

        if let Err(err) = result {
            warn!("{}", err);
            self.alert(format!("Could not upload a file: {err}"));
        }
    }

    fn alert(&mut self, message: String) {
        self.state = ViewState::ErrorDisplayed(message);
    }
}

/// Case-insensitive substring match on the todo name.
pub fn filter_by_name<'a>(todos: &'a [TodoItem], filter: &str) -> Vec<&'a TodoItem> {
    let filter = filter.to_lowercase();
    todos
        .iter()
        .filter(|todo| todo.name.to_lowercase().contains(&filter))
        .collect()
}

/// Default due date for new todos: one week after `today`.
pub fn due_date_from(today: NaiveDate) -> String {
    today
        .checked_add_days(Days::new(DUE_IN_DAYS))
        .unwrap_or(today)
        .format(DUE_DATE_FORMAT)
        .to_string()
}
