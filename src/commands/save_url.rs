use tracing::info;

use super::{CommandId, Context, Outcome};
use crate::cache::projects::ProjectRegistry;
use crate::error::CommandError;
use crate::forms::{DialogSession, FormSchema, FormValues, InputSpec};
use crate::host::Message;

const PROJECT_NAME: &str = "project_name";
const PROJECT_URN: &str = "project_urn";
const CLICKUP_URL: &str = "clickup_url";

/// Register the ClickUp URL for the active document's project.
pub(crate) async fn run(ctx: &Context<'_>) -> Result<Outcome, CommandError> {
    let doc = ctx.host.active_document().ok_or(CommandError::NoDocument)?;
    if !doc.is_saved {
        return Ok(Outcome::Aborted(Message::new(
            "Document Not Saved",
            "The active document must be saved before configuring ClickUp URL. \
             Please save the document first.",
        )));
    }
    let project = doc
        .project
        .clone()
        .filter(|p| !p.urn.is_empty())
        .ok_or(CommandError::NoProject)?;

    let existing_url = ProjectRegistry::load(&ctx.paths.projects)
        .url(&project.urn)
        .unwrap_or_default();

    let schema = FormSchema::new(vec![
        InputSpec::read_only(PROJECT_NAME, "Project Name:", project.name.clone()),
        InputSpec::read_only(PROJECT_URN, "Project URN:", project.urn.clone()),
        InputSpec::text(CLICKUP_URL, "ClickUp URL:", existing_url),
    ]);
    let mut session = DialogSession::new(CommandId::SaveProjectUrl.display_name(), schema);
    session.on_validate(|v| !v.text(CLICKUP_URL).is_empty());

    let Some(raw) = ctx.host.prompt(&mut session) else {
        return Ok(Outcome::Cancelled);
    };
    let values = FormValues::bind(session.schema(), raw)
        .map_err(|e| CommandError::Validation(e.to_string()))?;
    if !session.input_changed(&values) {
        return Err(CommandError::Validation("ClickUp URL is empty".into()));
    }
    session.close();

    let clickup_url = values.text(CLICKUP_URL);
    let mut registry = ProjectRegistry::load_for_update(&ctx.paths.projects)?;
    let existed = registry.set_url(&project.urn, &project.name, clickup_url);
    registry.save(&ctx.paths.projects)?;

    let action = if existed { "Updated" } else { "Added" };
    info!(project_urn = %project.urn, action, "ClickUp URL saved");
    Ok(Outcome::Completed(None))
}
