use chrono::Utc;
use poise::serenity_prelude as serenity;
use poise::CreateReply;
use serenity::builder::CreateEmbed;

use crate::commands::reply_error;
use crate::reminder::{self, duration, Reminder, MAX_PER_USER};
use crate::utils::components::truncate_str;
use crate::utils::embed;
use crate::{Context, Error};

const MAX_MESSAGE_LEN: usize = 1000;

async fn create(
    ctx: Context<'_>,
    target: Option<&serenity::User>,
    when: &str,
    message: String,
) -> Result<(), Error> {
    let delay = match duration::parse(when) {
        Ok(delay) => delay,
        Err(e) => {
            reply_error(ctx, &e.to_string()).await?;
            return Ok(());
        }
    };
    if message.trim().is_empty() {
        reply_error(ctx, "The reminder needs a message.").await?;
        return Ok(());
    }
    if message.chars().count() > MAX_MESSAGE_LEN {
        reply_error(
            ctx,
            &format!("Reminder messages are limited to {MAX_MESSAGE_LEN} characters."),
        )
        .await?;
        return Ok(());
    }
    if target.is_some_and(|u| u.bot) {
        reply_error(ctx, "Bots don't need reminders.").await?;
        return Ok(());
    }

    let data = ctx.data();
    let author = ctx.author().id;
    if reminder::count_created_by(&data.reminders, author).await >= MAX_PER_USER {
        reply_error(
            ctx,
            &format!("You already have {MAX_PER_USER} reminders pending. Remove one first."),
        )
        .await?;
        return Ok(());
    }

    let now = Utc::now();
    let recipient = target.map(|u| u.id).unwrap_or(author);
    let original_message = ctx
        .guild_id()
        .map(|g| format!("https://discord.com/channels/{g}/{}", ctx.channel_id()));

    let new = Reminder {
        id: reminder::reminder_id(author, now),
        user_id: recipient,
        creator_id: author,
        channel_id: ctx.channel_id(),
        target_id: target.map(|u| u.id),
        message,
        fire_time: now + delay,
        original_message,
    };
    let fire_at = new.fire_time.timestamp();
    reminder::add(&data.reminders, &data.store, new).await?;

    let who = match target {
        Some(user) => format!("<@{}>", user.id),
        None => "you".to_string(),
    };
    tracing::debug!("{} set a reminder for {recipient}", ctx.author().name);
    ctx.send(
        CreateReply::default()
            .embed(embed::success(&format!(
                "I'll remind {who} in {} (<t:{fire_at}:f>).",
                duration::humanize(delay)
            )))
            .ephemeral(target.is_none()),
    )
    .await?;
    Ok(())
}

/// Set a reminder for yourself
#[poise::command(slash_command)]
pub async fn me(
    ctx: Context<'_>,
    #[description = "When, e.g. 2h30m or 1d"] when: String,
    #[description = "What to remind you of"] message: String,
) -> Result<(), Error> {
    create(ctx, None, &when, message).await
}

/// Set a reminder for someone else
#[poise::command(slash_command, guild_only)]
pub async fn user(
    ctx: Context<'_>,
    #[description = "Who to remind"] user: serenity::User,
    #[description = "When, e.g. 2h30m or 1d"] when: String,
    #[description = "What to remind them of"] message: String,
) -> Result<(), Error> {
    create(ctx, Some(&user), &when, message).await
}

fn list_embed(reminders: &[Reminder], viewer: serenity::UserId) -> CreateEmbed {
    let lines: Vec<String> = reminders
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let mut line = format!(
                "`{}.` <t:{}:R> {}",
                i + 1,
                r.fire_time.timestamp(),
                truncate_str(&r.message, 80)
            );
            if r.recipient() != viewer {
                line.push_str(&format!(" (for <@{}>)", r.recipient()));
            } else if r.creator_id != viewer {
                line.push_str(&format!(" (from <@{}>)", r.creator_id));
            }
            line
        })
        .collect();

    embed::info("⏰ Your reminders", &lines.join("\n"))
}

/// Show your pending reminders
#[poise::command(slash_command)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let author = ctx.author().id;
    let reminders = reminder::list_for(&ctx.data().reminders, author).await;

    let embed = if reminders.is_empty() {
        embed::info("⏰ Your reminders", "You have no pending reminders.")
    } else {
        list_embed(&reminders, author)
    };
    ctx.send(CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Cancel a reminder
#[poise::command(slash_command)]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Number from /remind list"]
    #[min = 1]
    index: usize,
) -> Result<(), Error> {
    let data = ctx.data();
    let reminders = reminder::list_for(&data.reminders, ctx.author().id).await;

    let id = match index.checked_sub(1).and_then(|i| reminders.get(i)) {
        Some(r) => r.id.clone(),
        None => {
            reply_error(ctx, &format!("There is no reminder #{index}.")).await?;
            return Ok(());
        }
    };

    match reminder::remove(&data.reminders, &data.store, &id).await? {
        Some(removed) => {
            ctx.send(
                CreateReply::default()
                    .embed(embed::success(&format!(
                        "Cancelled: {}",
                        truncate_str(&removed.message, 200)
                    )))
                    .ephemeral(true),
            )
            .await?;
        }
        // Fired between listing and removal.
        None => reply_error(ctx, "That reminder already went off.").await?,
    }
    Ok(())
}

/// Reminders delivered by direct message
#[poise::command(
    slash_command,
    subcommands("me", "user", "list", "remove"),
    subcommand_required
)]
pub async fn remind(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}
