use serde::{Deserialize, Deserializer, Serialize};

use super::priority::Priority;

/// A task as returned by the ClickUp API. Only the fields the commands read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Empty when a response omits it.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub custom_fields: Vec<CustomFieldValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatus {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPriority {
    /// ClickUp sends the id as a string ("1"); accept numbers too.
    #[serde(default, deserialize_with = "lenient_priority_id")]
    pub id: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomFieldValue {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl Task {
    pub fn priority(&self) -> Option<Priority> {
        self.priority
            .as_ref()
            .and_then(|p| p.id)
            .and_then(Priority::from_value)
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.status.as_str())
    }

    /// Stored value of a custom field, when it is a string.
    pub fn field_text(&self, field_id: &str) -> Option<&str> {
        self.custom_fields
            .iter()
            .find(|cf| cf.id == field_id)
            .and_then(|cf| cf.value.as_ref())
            .and_then(|v| v.as_str())
    }
}

fn lenient_priority_id<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
        _ => None,
    })
}
