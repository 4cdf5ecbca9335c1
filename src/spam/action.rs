use std::time::Instant;

use poise::serenity_prelude as serenity;
use serenity::builder::{CreateMessage, EditMember};
use serenity::model::id::{ChannelId, GuildId};

use super::{AntiSpamConfig, SpamWindowEntry, Verdict};
use crate::utils::embed;
use crate::{Data, Error};

/// Tracks messages with attachments and punishes members who post them too fast.
pub async fn handle(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    let guild_id = match msg.guild_id {
        Some(id) => id,
        None => return Ok(()),
    };

    if msg.author.bot || msg.attachments.is_empty() {
        return Ok(());
    }

    let config = super::config_for(&data.spam_configs, guild_id).await;
    if !config.enabled {
        return Ok(());
    }

    let member = msg.member(ctx).await?;
    let (privileged, parent_id) = inspect_author(ctx, guild_id, msg.channel_id, &member);
    if config.is_exempt(msg.channel_id, parent_id, &member.roles, privileged) {
        return Ok(());
    }

    let now = Instant::now();
    let entry = SpamWindowEntry {
        user_id: msg.author.id,
        timestamp: now,
        channel_id: msg.channel_id,
        message_id: msg.id,
    };

    if let Verdict::Flagged(entries) =
        super::record(&data.spam_log, &config, guild_id, entry, now).await
    {
        tracing::info!(
            "flagged {} in guild {guild_id} for spam ({} messages)",
            msg.author.name,
            entries.len()
        );
        punish(ctx, guild_id, msg, &config, &entries).await;
    }

    Ok(())
}

/// Whether the author may manage messages where they posted, and the parent
/// channel when the message is in a thread.
fn inspect_author(
    ctx: &serenity::Context,
    guild_id: GuildId,
    channel_id: ChannelId,
    member: &serenity::Member,
) -> (bool, Option<ChannelId>) {
    let guild = match ctx.cache.guild(guild_id) {
        Some(g) => g,
        None => return (false, None),
    };

    let parent_id = super::thread_parent(
        channel_id,
        guild.threads.iter().map(|t| (t.id, t.parent_id)),
    );
    if guild.owner_id == member.user.id {
        return (true, parent_id);
    }

    // Threads inherit the overwrites of their parent. An uncached channel
    // falls back to the member's guild-wide permissions.
    let permissions = match guild.channels.get(&parent_id.unwrap_or(channel_id)) {
        Some(channel) => guild.user_permissions_in(channel, member),
        None => guild.member_permissions(member),
    };
    (
        permissions.administrator() || permissions.manage_messages(),
        parent_id,
    )
}

/// Every step is best effort: a failure is logged and the next step still runs.
async fn punish(
    ctx: &serenity::Context,
    guild_id: GuildId,
    msg: &serenity::Message,
    config: &AntiSpamConfig,
    entries: &[SpamWindowEntry],
) {
    if config.delete_messages {
        for entry in entries {
            if let Err(e) = entry
                .channel_id
                .delete_message(&ctx.http, entry.message_id)
                .await
            {
                tracing::warn!("could not delete spam message {}: {e}", entry.message_id);
            }
        }
    }

    let mut outcome = String::from("posted attachments too quickly");
    if config.timeout_enabled {
        let until = chrono::Utc::now().timestamp() + config.timeout_duration_seconds as i64;
        match serenity::Timestamp::from_unix_timestamp(until) {
            Ok(until) => {
                let edit = EditMember::new()
                    .disable_communication_until_datetime(until)
                    .audit_log_reason("Anti-spam");
                match guild_id.edit_member(&ctx.http, msg.author.id, edit).await {
                    Ok(_) => outcome.push_str(&format!(
                        " and was timed out for {} minutes",
                        config.timeout_duration_seconds / 60
                    )),
                    Err(e) => tracing::warn!("could not time out {}: {e}", msg.author.name),
                }
            }
            Err(e) => tracing::warn!("invalid timeout timestamp {until}: {e}"),
        }
    }

    let notice = CreateMessage::new().embed(embed::warning(&format!(
        "<@{}> {outcome}.",
        msg.author.id
    )));
    if let Err(e) = msg.channel_id.send_message(&ctx.http, notice).await {
        tracing::warn!("could not post spam notice: {e}");
    }
}
