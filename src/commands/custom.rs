use chrono::Utc;
use poise::CreateReply;

use crate::commands::reply_error;
use crate::custom::{self as custom_table, CustomCommand, MAX_RESPONSE_LEN, TRIGGER_PREFIX};
use crate::utils::components::truncate_str;
use crate::utils::embed;
use crate::{Context, Error};

/// Create or replace a custom command
#[poise::command(slash_command, required_permissions = "MANAGE_MESSAGES")]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Name members type after !"] name: String,
    #[description = "What the bot replies with"] response: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;

    let name = match custom_table::normalize_name(&name) {
        Ok(name) => name,
        Err(e) => {
            reply_error(ctx, &e.to_string()).await?;
            return Ok(());
        }
    };
    if response.trim().is_empty() || response.chars().count() > MAX_RESPONSE_LEN {
        reply_error(
            ctx,
            &format!("The response must be between 1 and {MAX_RESPONSE_LEN} characters."),
        )
        .await?;
        return Ok(());
    }

    let data = ctx.data();
    let command = CustomCommand {
        guild_id,
        name: name.clone(),
        response,
        creator_id: ctx.author().id,
        created_at: Utc::now(),
    };
    let replaced = custom_table::add(&data.custom_commands, &data.store, command).await?;

    tracing::info!("{} saved custom command !{name} in {guild_id}", ctx.author().name);
    let verb = if replaced { "updated" } else { "created" };
    ctx.send(
        CreateReply::default()
            .embed(embed::success(&format!("`{TRIGGER_PREFIX}{name}` {verb}.")))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Delete a custom command
#[poise::command(slash_command, required_permissions = "MANAGE_MESSAGES")]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Command name"] name: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;
    let name = match custom_table::normalize_name(&name) {
        Ok(name) => name,
        Err(e) => {
            reply_error(ctx, &e.to_string()).await?;
            return Ok(());
        }
    };

    let data = ctx.data();
    match custom_table::remove(&data.custom_commands, &data.store, guild_id, &name).await? {
        Some(_) => {
            ctx.send(
                CreateReply::default()
                    .embed(embed::success(&format!("`{TRIGGER_PREFIX}{name}` deleted.")))
                    .ephemeral(true),
            )
            .await?;
        }
        None => {
            reply_error(ctx, &format!("There is no `{TRIGGER_PREFIX}{name}` command.")).await?
        }
    }
    Ok(())
}

/// Show this server's custom commands
#[poise::command(slash_command)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;
    let commands = custom_table::list(&ctx.data().custom_commands, guild_id).await;

    let description = if commands.is_empty() {
        "No custom commands yet. Add one with `/custom add`.".to_string()
    } else {
        commands
            .iter()
            .map(|c| format!("`{TRIGGER_PREFIX}{}` {}", c.name, truncate_str(&c.response, 60)))
            .collect::<Vec<_>>()
            .join("\n")
    };

    ctx.send(CreateReply::default().embed(embed::info(
        "Custom commands",
        &truncate_str(&description, 4000),
    )))
    .await?;
    Ok(())
}

/// Server-specific text commands triggered with !name
#[poise::command(
    slash_command,
    guild_only,
    subcommands("add", "remove", "list"),
    subcommand_required
)]
pub async fn custom(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}
