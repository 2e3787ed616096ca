pub mod client;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ApiError;
use crate::model::field::RemoteField;
use crate::model::priority::Priority;
use crate::model::task::Task;

pub use client::ClickUpClient;

/// The list endpoint returns a single page; nothing past the first 100 tasks
/// is ever fetched.
pub const MAX_TASKS_PER_PAGE: usize = 100;

/// Body of `POST /list/{list_id}/task`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTask {
    pub name: String,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date_time: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_fields: Vec<FieldAssignment>,
}

impl NewTask {
    pub fn new(name: impl Into<String>, priority: Priority) -> Self {
        Self {
            name: name.into(),
            priority,
            markdown_content: None,
            due_date: None,
            due_date_time: None,
            custom_fields: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.markdown_content = description.filter(|d| !d.trim().is_empty());
        self
    }

    /// Date-only due date, epoch milliseconds.
    pub fn with_due_date(mut self, due_ms: Option<i64>) -> Self {
        self.due_date = due_ms;
        self.due_date_time = due_ms.map(|_| false);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldAssignment {
    pub id: String,
    pub value: String,
}

/// Single equality predicate on a custom field. The server matches text
/// fields loosely, so results must be re-checked by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomFieldFilter {
    pub field_id: String,
    pub operator: &'static str,
    pub value: String,
}

impl CustomFieldFilter {
    pub fn equals(field_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            operator: "=",
            value: value.into(),
        }
    }
}

#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn create_task(&self, list_id: &str, task: &NewTask) -> Result<Task, ApiError>;
    /// First page only, closed tasks included.
    async fn list_tasks(
        &self,
        list_id: &str,
        filter: Option<&CustomFieldFilter>,
    ) -> Result<Vec<Task>, ApiError>;
    async fn get_list_fields(&self, list_id: &str) -> Result<Vec<RemoteField>, ApiError>;
    async fn set_task_field(
        &self,
        task_id: &str,
        field_id: &str,
        value: &str,
    ) -> Result<(), ApiError>;
}
