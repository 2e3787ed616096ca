use tracing::{info, warn};

use super::{Context, Outcome};
use crate::cache::projects::ProjectRegistry;
use crate::error::CommandError;
use crate::host::Message;

/// Open the project's ClickUp URL in the default browser. No dialog.
pub(crate) async fn run(ctx: &Context<'_>) -> Result<Outcome, CommandError> {
    let (_, project_urn) = ctx.require_project()?;
    info!(%project_urn, "resolving ClickUp URL");

    if !ctx.paths.projects.is_file() {
        return Ok(Outcome::Aborted(Message::new(
            "Configuration Error",
            format!(
                "Projects configuration file not found at: {}",
                ctx.paths.projects.display()
            ),
        )));
    }

    let registry = ProjectRegistry::load(&ctx.paths.projects);
    let Some(binding) = registry.get(&project_urn) else {
        return Ok(Outcome::Aborted(Message::new(
            "Project Not Configured",
            format!(
                "Project URN not found in configuration: {project_urn}\n\n\
                 Please add this project to the projects.json file."
            ),
        )));
    };

    let project_name = if binding.project_name.is_empty() {
        "Unknown Project"
    } else {
        binding.project_name.as_str()
    };

    let Some(url) = binding.url() else {
        return Ok(Outcome::Aborted(Message::new(
            "Configuration Missing",
            format!("No ClickUp URL configured for project: {project_name}"),
        )));
    };

    if let Err(e) = ctx.host.open_url(url) {
        warn!(url, error = %e, "browser launch failed");
        return Ok(Outcome::Failed(Message::new(
            "Error",
            format!("An error occurred: {e:#}"),
        )));
    }
    info!(url, "opened ClickUp URL");

    Ok(Outcome::Completed(Some(Message::new(
        "Success",
        format!("Opened ClickUp project: {project_name}"),
    ))))
}
