pub mod add_task;
pub mod list_tasks;
pub mod open_project;
pub mod save_url;
pub mod set_tokens;

use std::fmt;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::cache::auth::Credentials;
use crate::cache::projects::ProjectRegistry;
use crate::cache::CachePaths;
use crate::clickup::{ClickUpClient, TaskApi};
use crate::config::AddinConfig;
use crate::error::{ApiError, CommandError};
use crate::host::{CommandDefinition, Host, Message, Placement};
use crate::model::document::ActiveDocument;
use crate::tinyurl::{LinkShortener, TinyUrlClient};

pub const COMPANY_NAME: &str = "IMA LLC";
pub const ADDIN_NAME: &str = "PowerToolsClickUp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    SaveProjectUrl,
    OpenProject,
    AddTask,
    ListTasks,
    SetTokens,
}

impl CommandId {
    pub const ALL: [CommandId; 5] = [
        CommandId::SaveProjectUrl,
        CommandId::OpenProject,
        CommandId::AddTask,
        CommandId::ListTasks,
        CommandId::SetTokens,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandId::SaveProjectUrl => "saveClickUpURL",
            CommandId::OpenProject => "openClickUp",
            CommandId::AddTask => "addTask",
            CommandId::ListTasks => "listTasks",
            CommandId::SetTokens => "setClickUpTokens",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CommandId::SaveProjectUrl => "Save ClickUp URL",
            CommandId::OpenProject => "Open ClickUp",
            CommandId::AddTask => "Add ClickUp Task",
            CommandId::ListTasks => "List Tasks",
            CommandId::SetTokens => "Set ClickUp Tokens",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CommandId::SaveProjectUrl => "Save a ClickUp URL for the current Fusion project",
            CommandId::OpenProject => {
                "Open the ClickUp project associated with the current Fusion document"
            }
            CommandId::AddTask => {
                "Create a new ClickUp task with a name, description, and due date"
            }
            CommandId::ListTasks => "List ClickUp tasks linked to the current Fusion document",
            CommandId::SetTokens => "Set the ClickUp and TinyURL API tokens used by Power Tools",
        }
    }

    pub fn placement(&self) -> Placement {
        match self {
            CommandId::SaveProjectUrl | CommandId::SetTokens => Placement::SettingsFlyout,
            _ => Placement::ToolsPanel,
        }
    }

    pub fn definition(&self) -> CommandDefinition {
        CommandDefinition {
            id: format!("{COMPANY_NAME}_{ADDIN_NAME}_{}", self.as_str()),
            name: self.display_name(),
            description: self.description(),
            placement: self.placement(),
        }
    }

    fn failure_text(&self) -> &'static str {
        match self {
            CommandId::AddTask => "Failed to create task.",
            CommandId::ListTasks => "Failed to load tasks.",
            _ => "Request failed.",
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How a command ended. Messages are shown by [`Addin::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed(Option<Message>),
    /// Stopped before any input was collected or any request was sent.
    Aborted(Message),
    Failed(Message),
    /// Submitted values did not validate; nothing was sent and nothing is shown.
    Invalid(String),
    Cancelled,
}

impl Outcome {
    pub fn message(&self) -> Option<&Message> {
        match self {
            Outcome::Completed(m) => m.as_ref(),
            Outcome::Aborted(m) | Outcome::Failed(m) => Some(m),
            Outcome::Invalid(_) | Outcome::Cancelled => None,
        }
    }
}

/// Builds the remote clients once a token is known.
pub trait Connector: Send + Sync {
    fn task_api(&self, token: &str) -> Box<dyn TaskApi>;
    fn shortener(&self) -> Box<dyn LinkShortener>;
}

pub struct HttpConnector {
    clickup_base: String,
    tinyurl_base: String,
    tinyurl_domain: String,
}

impl HttpConnector {
    pub fn from_config(config: &AddinConfig) -> Self {
        Self {
            clickup_base: config.clickup.api_base.clone(),
            tinyurl_base: config.tinyurl.api_base.clone(),
            tinyurl_domain: config.tinyurl.domain.clone(),
        }
    }
}

impl Connector for HttpConnector {
    fn task_api(&self, token: &str) -> Box<dyn TaskApi> {
        Box::new(ClickUpClient::new(self.clickup_base.clone(), token))
    }

    fn shortener(&self) -> Box<dyn LinkShortener> {
        Box::new(TinyUrlClient::new(
            self.tinyurl_base.clone(),
            self.tinyurl_domain.clone(),
        ))
    }
}

/// The add-in as the host sees it: a set of commands behind buttons.
pub struct Addin<H: Host> {
    config: AddinConfig,
    host: H,
    connector: Box<dyn Connector>,
}

impl<H: Host> Addin<H> {
    pub fn new(config: AddinConfig, host: H) -> Self {
        let connector = Box::new(HttpConnector::from_config(&config));
        Self {
            config,
            host,
            connector,
        }
    }

    pub fn with_connector(config: AddinConfig, host: H, connector: Box<dyn Connector>) -> Self {
        Self {
            config,
            host,
            connector,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Register every command button. Registration failures are logged.
    ///
    /// The buttons are registered even when the log file cannot be opened;
    /// that error is returned so the host can report it.
    pub fn start(&self) -> anyhow::Result<()> {
        let logging = crate::logging::init(&self.config);
        for id in CommandId::ALL {
            if let Err(e) = self.host.register_command(&id.definition()) {
                error!(command = %id, error = %e, "failed to register command");
            }
        }
        info!("add-in started");
        logging
    }

    pub fn stop(&self) {
        for id in CommandId::ALL {
            if let Err(e) = self.host.unregister_command(&id.definition().id) {
                warn!(command = %id, error = %e, "failed to unregister command");
            }
        }
        info!("add-in stopped");
    }

    /// Run one command to completion and show its message, if any.
    pub async fn run(&self, id: CommandId) -> Outcome {
        info!(command = %id, "command started");
        let ctx = Context {
            paths: CachePaths::from_config(&self.config),
            host: &self.host,
            connector: self.connector.as_ref(),
        };

        let result = match id {
            CommandId::SetTokens => set_tokens::run(&ctx).await,
            CommandId::SaveProjectUrl => save_url::run(&ctx).await,
            CommandId::OpenProject => open_project::run(&ctx).await,
            CommandId::AddTask => add_task::run(&ctx).await,
            CommandId::ListTasks => list_tasks::run(&ctx).await,
        };

        let outcome = result.unwrap_or_else(|e| outcome_for_error(id, e));
        match &outcome {
            Outcome::Failed(m) => error!(command = %id, title = %m.title, "command failed"),
            Outcome::Aborted(m) => warn!(command = %id, title = %m.title, "command aborted"),
            Outcome::Invalid(reason) => warn!(command = %id, %reason, "command input invalid"),
            _ => info!(command = %id, "command finished"),
        }
        if let Some(message) = outcome.message() {
            self.host.show_message(message);
        }
        outcome
    }

    /// Run a command on a throwaway single-threaded runtime, blocking the
    /// caller (the host's UI thread) until it returns.
    pub fn run_blocking(&self, id: CommandId) -> Outcome {
        match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt.block_on(self.run(id)),
            Err(e) => {
                let outcome = Outcome::Failed(Message::new(
                    "Error",
                    format!("An unexpected error occurred:\n\n{e}"),
                ));
                if let Some(message) = outcome.message() {
                    self.host.show_message(message);
                }
                outcome
            }
        }
    }
}

pub(crate) struct Context<'a> {
    pub paths: CachePaths,
    pub host: &'a dyn Host,
    pub connector: &'a dyn Connector,
}

impl Context<'_> {
    /// Both cache files must exist before anything else is looked at.
    pub fn require_cache_files(&self) -> Result<(), CommandError> {
        let missing: Vec<_> = self
            .paths
            .missing()
            .into_iter()
            .map(|p| p.to_path_buf())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CommandError::CacheFilesMissing(missing))
        }
    }

    /// Active document and the URN of its project.
    pub fn require_project(&self) -> Result<(ActiveDocument, String), CommandError> {
        let doc = self.host.active_document().ok_or(CommandError::NoDocument)?;
        let urn = doc
            .project_urn()
            .map(String::from)
            .ok_or(CommandError::NoProject)?;
        Ok((doc, urn))
    }

    pub fn require_list_id(
        &self,
        registry: &ProjectRegistry,
        project_urn: &str,
    ) -> Result<String, CommandError> {
        registry
            .list_id(project_urn)
            .ok_or_else(|| CommandError::MissingListId {
                projects_path: self.paths.projects.clone(),
            })
    }

    pub fn require_token(&self, credentials: &Credentials) -> Result<String, CommandError> {
        credentials
            .clickup_token()
            .map(String::from)
            .ok_or_else(|| CommandError::MissingToken {
                auth_path: self.paths.auth.clone(),
            })
    }
}

/// Parse a `YYYY-MM-DD` due date into epoch milliseconds at midnight UTC.
pub fn parse_due_date(input: &str) -> Option<i64> {
    let bytes = input.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return None;
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

fn outcome_for_error(id: CommandId, err: CommandError) -> Outcome {
    match err {
        CommandError::CacheFilesMissing(missing) => {
            let list = missing
                .iter()
                .map(|p| format!("  \u{2022} {}", p.display()))
                .collect::<Vec<_>>()
                .join("\n");
            Outcome::Aborted(Message::new(
                "Setup Required",
                format!(
                    "Required configuration files are missing:\n\n{list}\n\n\
                     To fix:\n  \
                     1. Run '{}' to save your ClickUp and TinyURL API tokens.\n  \
                     2. Run '{}' to register the current project.",
                    CommandId::SetTokens.display_name(),
                    CommandId::SaveProjectUrl.display_name(),
                ),
            ))
        }
        CommandError::NoDocument => Outcome::Aborted(Message::new(
            "No Document",
            "Please open a saved Fusion document first.",
        )),
        CommandError::NoProject => Outcome::Aborted(Message::new(
            "Project Not Found",
            "Could not determine the current Fusion project.\n\n\
             Please make sure a saved document is open.",
        )),
        CommandError::MissingToken { auth_path } => Outcome::Aborted(Message::new(
            "Authentication Error",
            format!(
                "ClickUp API token not found.\n\nRun '{}' or add your token to:\n{}",
                CommandId::SetTokens.display_name(),
                auth_path.display()
            ),
        )),
        CommandError::MissingListId { projects_path } => Outcome::Aborted(Message::new(
            "List ID Not Configured",
            format!(
                "No ClickUp list ID configured for this project.\n\n\
                 To fix:\n\
                 1. Open ClickUp and navigate into a List (not a Folder).\n\
                 2. Copy the number after /li/ in the URL.\n\
                 3. Add \"clickup_list_id\" to this project's entry in:\n   {}",
                projects_path.display()
            ),
        )),
        CommandError::MissingField(name) => Outcome::Aborted(Message::new(
            "Custom Field Missing",
            format!(
                "The '{name}' custom field was not found on this ClickUp list.\n\n\
                 Add a text custom field named '{name}' to your ClickUp list,\n\
                 then create tasks with '{}' to populate it.",
                CommandId::AddTask.display_name()
            ),
        )),
        CommandError::Validation(reason) => Outcome::Invalid(reason),
        CommandError::Api(ApiError::Status { status, body }) => Outcome::Failed(Message::new(
            "ClickUp API Error",
            format!("{}\n\nHTTP {status}\n\n{body}", id.failure_text()),
        )),
        CommandError::Api(other) => Outcome::Failed(Message::new(
            "Error",
            format!("{}\n\n{other}", id.failure_text()),
        )),
        CommandError::Other(e) => Outcome::Failed(Message::new(
            "Error",
            format!("An unexpected error occurred:\n\n{e:#}"),
        )),
    }
}
