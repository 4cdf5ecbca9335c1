use chrono::{Duration, Utc};
use poise::serenity_prelude as serenity;
use poise::CreateReply;
use serenity::builder::{
    CreateInteractionResponse, CreateInteractionResponseMessage, EditInteractionResponse,
    GetMessages,
};

use crate::utils::components::{self, COMPONENT_TIMEOUT_SECS};
use crate::utils::embed;
use crate::{Context, Error};

/// Discord refuses to bulk delete anything older than this.
const BULK_DELETE_MAX_AGE_DAYS: i64 = 14;

async fn purge_impl(ctx: Context<'_>, amount: u8) -> Result<(), Error> {
    let channel_id = ctx.channel_id();

    let reply = ctx
        .send(
            CreateReply::default()
                .embed(embed::warning(&format!(
                    "Delete the last **{amount}** messages in <#{channel_id}>?"
                )))
                .components(vec![components::confirm_buttons("purge")])
                .ephemeral(true),
        )
        .await?;
    let msg = reply.message().await?.into_owned();

    let interaction =
        match components::await_component_interaction(ctx, &msg, COMPONENT_TIMEOUT_SECS).await {
            Some(interaction) => interaction,
            None => {
                reply
                    .edit(
                        ctx,
                        CreateReply::default()
                            .embed(embed::info("Purge", "Timed out, nothing was deleted."))
                            .components(vec![]),
                    )
                    .await
                    .ok();
                return Ok(());
            }
        };

    if interaction.data.custom_id != "purge_confirm" {
        interaction
            .create_response(
                ctx.serenity_context(),
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .embed(embed::info("Purge", "Cancelled."))
                        .components(vec![]),
                ),
            )
            .await?;
        return Ok(());
    }

    interaction
        .create_response(ctx.serenity_context(), CreateInteractionResponse::Acknowledge)
        .await?;

    let messages = channel_id
        .messages(ctx.http(), GetMessages::new().limit(amount))
        .await?;
    let cutoff = (Utc::now() - Duration::days(BULK_DELETE_MAX_AGE_DAYS)).timestamp();
    let total = messages.len();
    let deletable: Vec<serenity::Message> = messages
        .into_iter()
        .filter(|m| m.timestamp.unix_timestamp() > cutoff)
        .collect();
    let deleted = deletable.len();

    if !deletable.is_empty() {
        channel_id.delete_messages(ctx.http(), deletable).await?;
    }
    tracing::info!(
        "{} purged {deleted} messages in {channel_id}",
        ctx.author().name
    );

    let mut summary = format!("Deleted **{deleted}** messages.");
    if deleted < total {
        summary.push_str(&format!(
            " {} were older than {BULK_DELETE_MAX_AGE_DAYS} days and were kept.",
            total - deleted
        ));
    }
    interaction
        .edit_response(
            ctx.serenity_context(),
            EditInteractionResponse::new()
                .embed(embed::success(&summary))
                .components(vec![]),
        )
        .await?;
    Ok(())
}

/// Bulk delete recent messages in this channel
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_MESSAGES",
    required_bot_permissions = "MANAGE_MESSAGES"
)]
pub async fn purge(
    ctx: Context<'_>,
    #[description = "How many messages (1-100)"]
    #[min = 1]
    #[max = 100]
    amount: u8,
) -> Result<(), Error> {
    purge_impl(ctx, amount).await
}
