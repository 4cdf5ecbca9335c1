mod custom;
mod fun;
pub mod gw2;
mod help;
mod moderation;
mod remind;
mod rolereact;

use poise::CreateReply;

use crate::utils::embed;
use crate::{Context, Data, Error};

pub fn all() -> Vec<poise::Command<Data, Error>> {
    let mut cmds = vec![
        help::help(),
        remind::remind(),
        rolereact::rolereact(),
        custom::custom(),
        moderation::purge(),
        moderation::antispam(),
        fun::coinflip(),
        fun::roll(),
        fun::eight_ball(),
    ];
    cmds.extend(gw2::all());
    cmds
}

/// Replies with an error embed only the invoking user sees.
pub(crate) async fn reply_error(ctx: Context<'_>, message: &str) -> Result<(), Error> {
    ctx.send(
        CreateReply::default()
            .embed(embed::error(message))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Last stop for errors a command did not handle itself.
pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!("command /{} failed: {error}", ctx.command().qualified_name);
            if let Err(e) = reply_error(ctx, "Something went wrong, try again later.").await {
                tracing::warn!("could not report command error: {e}");
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("error while handling framework error: {e}");
            }
        }
    }
}
