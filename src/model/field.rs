use serde::{Deserialize, Serialize};

/// A custom field definition on a ClickUp list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteField {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
}
