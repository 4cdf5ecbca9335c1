use poise::serenity_prelude as serenity;

use crate::{Data, Error};

pub async fn handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            tracing::info!(
                "connected as {} in {} guilds",
                data_about_bot.user.name,
                data_about_bot.guilds.len()
            );
        }
        serenity::FullEvent::Message { new_message } => {
            if let Err(e) = crate::spam::action::handle(ctx, new_message, data).await {
                tracing::warn!("anti-spam check failed for {}: {e}", new_message.id);
            }
            crate::custom::handle_message(ctx, new_message, data).await?;
        }
        serenity::FullEvent::ReactionAdd { add_reaction } => {
            crate::roles::handle_reaction(ctx, add_reaction, data, true).await?;
        }
        serenity::FullEvent::ReactionRemove { removed_reaction } => {
            crate::roles::handle_reaction(ctx, removed_reaction, data, false).await?;
        }
        _ => {}
    }
    Ok(())
}
