use anyhow::Result;

use crate::commands::list_tasks::TaskListView;
use crate::forms::{DialogSession, InputValue};
use crate::model::document::ActiveDocument;

/// Where a command's button lives in the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Promoted button on the add-in's toolbar panel.
    ToolsPanel,
    /// Entry in the shared "PowerTools Settings" flyout of the quick-access toolbar.
    SettingsFlyout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDefinition {
    pub id: String,
    pub name: &'static str,
    pub description: &'static str,
    pub placement: Placement,
}

/// Modal message: a title and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub title: String,
    pub body: String,
}

impl Message {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Everything the commands need from the CAD application.
pub trait Host {
    fn active_document(&self) -> Option<ActiveDocument>;

    fn show_message(&self, message: &Message);

    /// Show a dialog for `session` and block until the user closes it.
    ///
    /// The host must call `session.input_changed` on every edit to enable or
    /// disable OK. Returns the raw values on OK, `None` on cancel.
    fn prompt(&self, session: &mut DialogSession) -> Option<Vec<(String, InputValue)>>;

    fn open_url(&self, url: &str) -> Result<()>;

    /// Show the read-only task tables and block until the user closes them.
    fn show_task_lists(&self, view: &TaskListView);

    fn register_command(&self, _definition: &CommandDefinition) -> Result<()> {
        Ok(())
    }

    fn unregister_command(&self, _id: &str) -> Result<()> {
        Ok(())
    }
}
