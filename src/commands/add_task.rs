use tracing::{debug, info, warn};

use super::{parse_due_date, CommandId, Context, Outcome};
use crate::cache::auth::Credentials;
use crate::cache::projects::ProjectRegistry;
use crate::clickup::{FieldAssignment, NewTask, TaskApi};
use crate::deeplink::open_on_desktop_url;
use crate::error::{ApiError, CommandError};
use crate::fields::FieldResolver;
use crate::forms::{DialogSession, FormSchema, FormValues, InputSpec};
use crate::host::Message;
use crate::model::document::ActiveDocument;
use crate::model::priority::Priority;
use crate::model::task::Task;
use crate::tinyurl::LinkShortener;

pub const TASK_NAME: &str = "task_name";
pub const TASK_DESCRIPTION: &str = "task_description";
pub const TASK_DUE_DATE: &str = "task_due_date";
pub const TASK_PRIORITY: &str = "task_priority";
pub const LINK_DOCUMENT: &str = "link_document";

/// Dialog for a new task. The due date defaults to `today`.
pub fn schema(today: &str) -> FormSchema {
    FormSchema::new(vec![
        InputSpec::text(TASK_NAME, "Task Name:", ""),
        InputSpec::multiline(TASK_DESCRIPTION, "Description:"),
        InputSpec::date(TASK_DUE_DATE, "Due Date (YYYY-MM-DD):", today),
        InputSpec::choice(TASK_PRIORITY, "Priority:", &Priority::LABELS),
        InputSpec::toggle(LINK_DOCUMENT, "Link Document to Task", false),
    ])
}

/// Submit is enabled only for a non-empty name and a parseable (or empty) date.
pub fn inputs_valid(values: &FormValues) -> bool {
    if values.text(TASK_NAME).is_empty() {
        return false;
    }
    let due = values.text(TASK_DUE_DATE);
    due.is_empty() || parse_due_date(due).is_some()
}

/// Validated dialog input.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskInput {
    pub name: String,
    pub description: Option<String>,
    pub due_date_ms: Option<i64>,
    pub priority: Priority,
    pub link_document: bool,
}

impl TaskInput {
    pub fn from_values(values: &FormValues) -> Result<Self, CommandError> {
        let name = values.text(TASK_NAME);
        if name.is_empty() {
            return Err(CommandError::Validation("task name is empty".into()));
        }
        let due = values.text(TASK_DUE_DATE);
        let due_date_ms = if due.is_empty() {
            None
        } else {
            Some(
                parse_due_date(due)
                    .ok_or_else(|| CommandError::Validation(format!("bad due date '{due}'")))?,
            )
        };
        let description = Some(values.text(TASK_DESCRIPTION))
            .filter(|d| !d.is_empty())
            .map(String::from);

        Ok(Self {
            name: name.to_string(),
            description,
            due_date_ms,
            priority: Priority::from_label(Some(values.text(TASK_PRIORITY))),
            link_document: values.flag(LINK_DOCUMENT),
        })
    }

    pub fn to_new_task(&self) -> NewTask {
        NewTask::new(self.name.clone(), self.priority)
            .with_description(self.description.clone())
            .with_due_date(self.due_date_ms)
    }
}

/// Second phase of linking: the document URN is written onto the task only
/// after it exists. Inline values at creation are unreliable for text fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrnWrite {
    Skipped,
    Pending { field_id: String, document_urn: String },
    Written,
    Failed,
}

impl UrnWrite {
    pub async fn complete(self, api: &dyn TaskApi, task_id: &str) -> UrnWrite {
        let (field_id, document_urn) = match self {
            UrnWrite::Pending {
                field_id,
                document_urn,
            } => (field_id, document_urn),
            other => return other,
        };
        if task_id.is_empty() {
            warn!("created task has no id, document URN not written");
            return UrnWrite::Failed;
        }
        match api.set_task_field(task_id, &field_id, &document_urn).await {
            Ok(()) => {
                info!(task_id, "document URN written");
                UrnWrite::Written
            }
            Err(e) => {
                warn!(task_id, error = %e, "failed to write document URN");
                UrnWrite::Failed
            }
        }
    }
}

/// What happened on a successful submit.
#[derive(Debug, Clone)]
pub struct TaskCreated {
    pub task: Task,
    pub short_url: Option<String>,
    pub link_attached: bool,
    pub urn_write: UrnWrite,
}

/// Everything the submit step needs, resolved during preflight.
pub struct SubmitContext<'a> {
    pub api: &'a dyn TaskApi,
    pub shortener: &'a dyn LinkShortener,
    pub list_id: &'a str,
    pub tinyurl_token: Option<&'a str>,
    pub document: Option<&'a ActiveDocument>,
}

/// Create the task, with the optional link enrichments.
///
/// Short link, field lookup and URN write each fail on their own without
/// stopping the others; only the create call itself can fail the submit.
pub async fn submit(sub: &SubmitContext<'_>, input: &TaskInput) -> Result<TaskCreated, ApiError> {
    let resolver = FieldResolver::new(sub.api);
    let mut task = input.to_new_task();
    let mut short_url = None;
    let mut urn_write = UrnWrite::Skipped;

    if input.link_document {
        short_url = shorten_document_link(sub).await;

        if let Some(short) = &short_url {
            match resolver.design_link_field(sub.list_id).await {
                Some(field_id) => task.custom_fields.push(FieldAssignment {
                    id: field_id,
                    value: short.clone(),
                }),
                None => warn!(list_id = sub.list_id, "design link field missing, link not attached"),
            }
        } else {
            warn!("no short link, URL field not added");
        }

        let document_urn = sub
            .document
            .and_then(|d| d.document_urn.clone())
            .filter(|u| !u.is_empty());
        if let Some(document_urn) = document_urn {
            match resolver.document_urn_field(sub.list_id).await {
                Some(field_id) => {
                    urn_write = UrnWrite::Pending {
                        field_id,
                        document_urn,
                    }
                }
                None => warn!(list_id = sub.list_id, "document URN field missing"),
            }
        }
    } else {
        debug!("link_document off, skipping document link");
    }

    let link_attached = !task.custom_fields.is_empty();
    let created = sub.api.create_task(sub.list_id, &task).await?;
    info!(
        task_id = %created.id,
        url = created.url.as_deref().unwrap_or("-"),
        status = created.status_text().unwrap_or("-"),
        "task created"
    );

    let urn_write = urn_write.complete(sub.api, &created.id).await;

    Ok(TaskCreated {
        task: created,
        short_url,
        link_attached,
        urn_write,
    })
}

async fn shorten_document_link(sub: &SubmitContext<'_>) -> Option<String> {
    let doc = sub.document.filter(|d| d.is_saved)?;
    let (Some(lineage), Some(project)) = (doc.document_urn.as_deref(), doc.project.as_ref())
    else {
        warn!("document unsaved or not on a hub, skipping link");
        return None;
    };
    let Some(token) = sub.tinyurl_token else {
        warn!("tinyurl_api_token missing, skipping link");
        return None;
    };

    let long_url = open_on_desktop_url(lineage, &project.hub_web_url, &doc.name);
    debug!(%long_url, "open-on-desktop link built");
    sub.shortener.shorten(&long_url, token).await
}

pub(crate) async fn run(ctx: &Context<'_>) -> Result<Outcome, CommandError> {
    // Preflight: nothing is shown and nothing is sent unless all of this holds.
    ctx.require_cache_files()?;
    let (document, project_urn) = ctx.require_project()?;
    let registry = ProjectRegistry::load(&ctx.paths.projects);
    let list_id = ctx.require_list_id(&registry, &project_urn)?;
    let credentials = Credentials::load(&ctx.paths.auth);
    let token = ctx.require_token(&credentials)?;
    debug!(%project_urn, %list_id, token_len = token.len(), "preflight passed");

    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    let mut session = DialogSession::new(CommandId::AddTask.display_name(), schema(&today));
    session.on_validate(inputs_valid);

    let Some(raw) = ctx.host.prompt(&mut session) else {
        return Ok(Outcome::Cancelled);
    };
    let values = FormValues::bind(session.schema(), raw)
        .map_err(|e| CommandError::Validation(e.to_string()))?;
    if !session.input_changed(&values) {
        return Err(CommandError::Validation("task inputs invalid".into()));
    }
    session.close();
    let input = TaskInput::from_values(&values)?;
    info!(
        name = %input.name,
        priority = %input.priority,
        due = ?input.due_date_ms,
        link_document = input.link_document,
        "task inputs collected"
    );

    let api = ctx.connector.task_api(&token);
    let shortener = ctx.connector.shortener();
    let sub = SubmitContext {
        api: api.as_ref(),
        shortener: shortener.as_ref(),
        list_id: &list_id,
        tinyurl_token: credentials.tinyurl_token(),
        document: Some(&document),
    };

    let created = submit(&sub, &input).await?;
    let url = created.task.url.as_deref().unwrap_or("\u{2014}");
    Ok(Outcome::Completed(Some(Message::new(
        "ClickUp Task Created",
        format!(
            "Task '{}' created.\nPriority: {}\n\n{url}",
            input.name,
            input.priority.label()
        ),
    ))))
}
