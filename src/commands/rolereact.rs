use poise::serenity_prelude as serenity;
use poise::CreateReply;
use serenity::model::channel::ReactionType;

use crate::commands::reply_error;
use crate::roles::{self, emoji_key, parse_message_ref};
use crate::utils::embed;
use crate::{Context, Error};

/// Shows a stored emoji key the way Discord renders it.
fn display_emoji(key: &str) -> String {
    if !key.is_empty() && key.chars().all(|c| c.is_ascii_digit()) {
        format!("<:e:{key}>")
    } else {
        key.to_string()
    }
}

/// Map a reaction on a message to a role
#[poise::command(slash_command)]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Message link or id"] message: String,
    #[description = "Emoji members react with"] emoji: String,
    #[description = "Role to hand out"] role: serenity::Role,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;

    let (channel_id, message_id) = match parse_message_ref(&message) {
        Some((channel, message)) => (channel.unwrap_or(ctx.channel_id()), message),
        None => {
            reply_error(ctx, "Give a message link or a message id.").await?;
            return Ok(());
        }
    };
    let reaction: ReactionType = match emoji.trim().parse() {
        Ok(reaction) => reaction,
        Err(_) => {
            reply_error(ctx, &format!("`{emoji}` is not an emoji.")).await?;
            return Ok(());
        }
    };
    if role.managed || role.id.get() == guild_id.get() {
        reply_error(ctx, "That role cannot be handed out.").await?;
        return Ok(());
    }

    // Reacting first proves the message exists and the emoji is usable.
    if let Err(e) = channel_id
        .create_reaction(ctx.http(), message_id, reaction.clone())
        .await
    {
        tracing::debug!("could not react to {message_id}: {e}");
        reply_error(
            ctx,
            "I couldn't react to that message. Check the link, the emoji and my permissions.",
        )
        .await?;
        return Ok(());
    }

    roles::add_mapping(
        &ctx.data().store,
        guild_id,
        channel_id,
        message_id,
        emoji_key(&reaction),
        role.id,
    )?;

    ctx.send(
        CreateReply::default()
            .embed(embed::success(&format!(
                "Reacting with {reaction} now grants <@&{}>.",
                role.id
            )))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Stop handing out a role for a reaction
#[poise::command(slash_command)]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Message link or id"] message: String,
    #[description = "Emoji to unmap"] emoji: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;

    let (channel_id, message_id) = match parse_message_ref(&message) {
        Some((channel, message)) => (channel.unwrap_or(ctx.channel_id()), message),
        None => {
            reply_error(ctx, "Give a message link or a message id.").await?;
            return Ok(());
        }
    };
    let reaction: ReactionType = match emoji.trim().parse() {
        Ok(reaction) => reaction,
        Err(_) => {
            reply_error(ctx, &format!("`{emoji}` is not an emoji.")).await?;
            return Ok(());
        }
    };
    let key = emoji_key(&reaction);

    match roles::remove_mapping(&ctx.data().store, guild_id, message_id, &key)? {
        Some(role_id) => {
            let me = ctx.cache().current_user().id;
            if let Err(e) = channel_id
                .delete_reaction(ctx.http(), message_id, Some(me), reaction)
                .await
            {
                tracing::debug!("could not remove own reaction from {message_id}: {e}");
            }
            ctx.send(
                CreateReply::default()
                    .embed(embed::success(&format!(
                        "{} no longer grants <@&{role_id}>.",
                        display_emoji(&key)
                    )))
                    .ephemeral(true),
            )
            .await?;
        }
        None => reply_error(ctx, "That emoji is not mapped on that message.").await?,
    }
    Ok(())
}

/// Show every role reaction in this server
#[poise::command(slash_command)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;
    let messages = roles::list_for_guild(&ctx.data().store, guild_id)?;

    if messages.is_empty() {
        ctx.send(
            CreateReply::default()
                .embed(embed::info("Role reactions", "No role reactions are set up."))
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let mut description = String::new();
    for doc in &messages {
        description.push_str(&format!(
            "https://discord.com/channels/{}/{}/{}\n",
            doc.guild_id, doc.channel_id, doc.message_id
        ));
        for (key, role_id) in &doc.mappings {
            description.push_str(&format!("{} → <@&{role_id}>\n", display_emoji(key)));
        }
        description.push('\n');
    }

    ctx.send(
        CreateReply::default()
            .embed(embed::info("Role reactions", description.trim_end()))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Let members pick roles by reacting to a message
#[poise::command(
    slash_command,
    guild_only,
    subcommands("add", "remove", "list"),
    subcommand_required,
    required_permissions = "MANAGE_ROLES",
    required_bot_permissions = "MANAGE_ROLES"
)]
pub async fn rolereact(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_emoji() {
        assert_eq!(display_emoji("1234"), "<:e:1234>");
        assert_eq!(display_emoji("⚔️"), "⚔️");
    }
}
