use tracing::{debug, info, warn};

use super::{Context, Outcome};
use crate::cache::auth::Credentials;
use crate::cache::projects::ProjectRegistry;
use crate::clickup::MAX_TASKS_PER_PAGE;
use crate::error::CommandError;
use crate::fields::{fetch_document_tasks, FieldResolver, FIELD_DOCUMENT_URN};
use crate::model::document::DocumentIdentity;
use crate::model::priority::sort_rank;
use crate::model::task::Task;

const PLACEHOLDER: &str = "\u{2014}";

/// One read-only table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub name: String,
    /// Rendered as a link on the name when present.
    pub url: Option<String>,
    pub priority: String,
    pub status: String,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        let name = if task.name.is_empty() {
            "(unnamed)".to_string()
        } else {
            task.name.clone()
        };
        Self {
            name,
            url: task.url.clone().filter(|u| !u.is_empty()),
            priority: task
                .priority()
                .map_or(PLACEHOLDER, |p| p.display_label())
                .to_string(),
            status: task
                .status_text()
                .filter(|s| !s.is_empty())
                .map_or_else(|| PLACEHOLDER.to_string(), title_case),
        }
    }
}

/// What the host renders for "List Tasks": a header and two tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListView {
    pub document_name: String,
    pub list_url: Option<String>,
    /// Tasks whose document URN field equals the active document's exactly.
    pub linked: Vec<TaskRow>,
    /// Every task on the list.
    pub all: Vec<TaskRow>,
}

impl TaskListView {
    pub fn list_link_text(&self) -> &str {
        self.list_url
            .as_deref()
            .unwrap_or("(No list URL configured)")
    }

    pub fn linked_header(&self) -> String {
        format!("Tasks Linked to This Document ({})", self.linked.len())
    }

    pub fn all_header(&self) -> String {
        format!("Project Tasks ({})", self.all.len())
    }
}

/// Stable sort: Urgent first, unset priority last, ties keep API order.
pub fn sort_by_priority(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| sort_rank(t.priority()));
}

/// Upper-case the first letter of every word, lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(c);
            word_start = true;
        }
    }
    out
}

pub(crate) async fn run(ctx: &Context<'_>) -> Result<Outcome, CommandError> {
    ctx.require_cache_files()?;
    let (document, _) = ctx.require_project()?;
    let DocumentIdentity {
        document_urn,
        project_urn,
    } = document.identity().ok_or(CommandError::NoDocument)?;

    let registry = ProjectRegistry::load(&ctx.paths.projects);
    let list_id = ctx.require_list_id(&registry, &project_urn)?;
    let list_url = registry.url(&project_urn);
    let token = ctx.require_token(&Credentials::load(&ctx.paths.auth))?;
    debug!(%project_urn, %document_urn, %list_id, "preflight passed");

    let api = ctx.connector.task_api(&token);
    let field_id = FieldResolver::new(api.as_ref())
        .try_find_field_by_name(&list_id, FIELD_DOCUMENT_URN, None)
        .await?
        .ok_or(CommandError::MissingField(FIELD_DOCUMENT_URN))?;

    let mut linked = fetch_document_tasks(api.as_ref(), &list_id, &field_id, &document_urn).await?;
    let mut all = api.list_tasks(&list_id, None).await?;
    info!(linked = linked.len(), total = all.len(), "tasks loaded");
    if all.len() >= MAX_TASKS_PER_PAGE {
        warn!(%list_id, "list holds more tasks than one page, only the first page is shown");
    }

    sort_by_priority(&mut linked);
    sort_by_priority(&mut all);

    let view = TaskListView {
        document_name: document.name,
        list_url,
        linked: linked.iter().map(TaskRow::from).collect(),
        all: all.iter().map(TaskRow::from).collect(),
    };
    ctx.host.show_task_lists(&view);
    Ok(Outcome::Completed(None))
}
