use tracing::info;

use super::{CommandId, Context, Outcome};
use crate::cache::auth::Credentials;
use crate::error::CommandError;
use crate::forms::{DialogSession, FormSchema, FormValues, InputSpec};
use crate::host::Message;

const CLICKUP_TOKEN: &str = "clickup_api_token";
const TINYURL_TOKEN: &str = "tinyurl_api_token";

pub(crate) async fn run(ctx: &Context<'_>) -> Result<Outcome, CommandError> {
    let existing = Credentials::load(&ctx.paths.auth);

    let schema = FormSchema::new(vec![
        InputSpec::text(
            CLICKUP_TOKEN,
            "ClickUp API Token:",
            existing.clickup_api_token.clone().unwrap_or_default(),
        ),
        InputSpec::text(
            TINYURL_TOKEN,
            "TinyURL API Token:",
            existing.tinyurl_api_token.clone().unwrap_or_default(),
        ),
    ]);
    let mut session = DialogSession::new(CommandId::SetTokens.display_name(), schema);

    let Some(raw) = ctx.host.prompt(&mut session) else {
        return Ok(Outcome::Cancelled);
    };
    let values = FormValues::bind(session.schema(), raw)
        .map_err(|e| CommandError::Validation(e.to_string()))?;
    session.close();

    // Re-read so keys written since the dialog opened survive.
    let mut credentials = Credentials::load(&ctx.paths.auth);
    credentials.merge(values.text(CLICKUP_TOKEN), values.text(TINYURL_TOKEN));

    if let Err(e) = credentials.save(&ctx.paths.auth) {
        return Ok(Outcome::Failed(Message::new(
            "Error",
            format!("Error saving tokens: {e:#}"),
        )));
    }
    info!(path = %ctx.paths.auth.display(), "auth.json saved");

    Ok(Outcome::Completed(Some(Message::new(
        CommandId::SetTokens.display_name(),
        "API tokens saved.",
    ))))
}
