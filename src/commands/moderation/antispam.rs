use poise::serenity_prelude as serenity;
use poise::CreateReply;
use serenity::builder::CreateEmbed;

use crate::commands::reply_error;
use crate::spam::{self, AntiSpamConfig};
use crate::{Context, Error};

/// Discord caps timeouts at 28 days.
const MAX_TIMEOUT_SECS: u64 = 28 * 24 * 3600;

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn config_embed(config: &AntiSpamConfig) -> CreateEmbed {
    let roles = if config.exempt_roles.is_empty() {
        "none".to_string()
    } else {
        config
            .exempt_roles
            .iter()
            .map(|r| format!("<@&{r}>"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let channels = if config.exempt_channels.is_empty() {
        "none".to_string()
    } else {
        config
            .exempt_channels
            .iter()
            .map(|c| format!("<#{c}>"))
            .collect::<Vec<_>>()
            .join(", ")
    };

    CreateEmbed::new()
        .title("🛡️ Anti-spam")
        .description(format!(
            "Members are flagged after **{}** messages with attachments, or posts in **{}** \
             channels, within **{}s**.",
            config.max_messages, config.max_channels, config.time_window_seconds
        ))
        .color(if config.enabled { 0x57F287 } else { 0x99AAB5 })
        .field("Enabled", on_off(config.enabled), true)
        .field("Delete messages", on_off(config.delete_messages), true)
        .field(
            "Timeout",
            if config.timeout_enabled {
                format!("{} minutes", config.timeout_duration_seconds / 60)
            } else {
                "off".to_string()
            },
            true,
        )
        .field("Exempt roles", roles, false)
        .field("Exempt channels", channels, false)
}

async fn update_and_show<F>(ctx: Context<'_>, change: F) -> Result<(), Error>
where
    F: FnOnce(&mut AntiSpamConfig),
{
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;
    let data = ctx.data();
    let config = spam::update_config(&data.spam_configs, &data.store, guild_id, change).await?;
    tracing::info!("{} updated anti-spam in {guild_id}", ctx.author().name);
    ctx.send(CreateReply::default().embed(config_embed(&config)))
        .await?;
    Ok(())
}

/// Show the anti-spam settings
#[poise::command(slash_command)]
pub async fn show(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command only works in a server")?;
    let config = spam::config_for(&ctx.data().spam_configs, guild_id).await;
    ctx.send(CreateReply::default().embed(config_embed(&config)))
        .await?;
    Ok(())
}

/// Turn anti-spam on
#[poise::command(slash_command)]
pub async fn enable(ctx: Context<'_>) -> Result<(), Error> {
    update_and_show(ctx, |c| c.enabled = true).await
}

/// Turn anti-spam off
#[poise::command(slash_command)]
pub async fn disable(ctx: Context<'_>) -> Result<(), Error> {
    update_and_show(ctx, |c| c.enabled = false).await
}

/// Change anti-spam thresholds and punishments
#[poise::command(slash_command)]
pub async fn set(
    ctx: Context<'_>,
    #[description = "Window in seconds"]
    #[min = 5]
    #[max = 300]
    window: Option<u64>,
    #[description = "Messages allowed in the window"]
    #[min = 2]
    #[max = 50]
    max_messages: Option<usize>,
    #[description = "Channels allowed in the window"]
    #[min = 2]
    #[max = 50]
    max_channels: Option<usize>,
    #[description = "Delete the flagged messages"] delete_messages: Option<bool>,
    #[description = "Time out flagged members"] timeout: Option<bool>,
    #[description = "Timeout length in minutes"]
    #[min = 1]
    #[max = 40320]
    timeout_minutes: Option<u64>,
) -> Result<(), Error> {
    if window.is_none()
        && max_messages.is_none()
        && max_channels.is_none()
        && delete_messages.is_none()
        && timeout.is_none()
        && timeout_minutes.is_none()
    {
        reply_error(ctx, "Pass at least one setting to change.").await?;
        return Ok(());
    }

    update_and_show(ctx, |c| {
        if let Some(window) = window {
            c.time_window_seconds = window;
        }
        if let Some(n) = max_messages {
            c.max_messages = n;
        }
        if let Some(n) = max_channels {
            c.max_channels = n;
        }
        if let Some(flag) = delete_messages {
            c.delete_messages = flag;
        }
        if let Some(flag) = timeout {
            c.timeout_enabled = flag;
        }
        if let Some(minutes) = timeout_minutes {
            c.timeout_duration_seconds = (minutes * 60).min(MAX_TIMEOUT_SECS);
        }
    })
    .await
}

/// Adds `item` when absent, removes it when present. Returns whether it is now in the list.
fn toggle<T: PartialEq>(list: &mut Vec<T>, item: T) -> bool {
    match list.iter().position(|x| *x == item) {
        Some(index) => {
            list.remove(index);
            false
        }
        None => {
            list.push(item);
            true
        }
    }
}

/// Exempt a role from anti-spam, or stop exempting it
#[poise::command(slash_command, rename = "exempt-role")]
pub async fn exempt_role(
    ctx: Context<'_>,
    #[description = "Role to toggle"] role: serenity::Role,
) -> Result<(), Error> {
    update_and_show(ctx, |c| {
        toggle(&mut c.exempt_roles, role.id);
    })
    .await
}

/// Exempt a channel from anti-spam, or stop exempting it
#[poise::command(slash_command, rename = "exempt-channel")]
pub async fn exempt_channel(
    ctx: Context<'_>,
    #[description = "Channel to toggle"] channel: serenity::GuildChannel,
) -> Result<(), Error> {
    update_and_show(ctx, |c| {
        toggle(&mut c.exempt_channels, channel.id);
    })
    .await
}

/// Attachment spam protection
#[poise::command(
    slash_command,
    guild_only,
    subcommands("show", "enable", "disable", "set", "exempt_role", "exempt_channel"),
    subcommand_required,
    required_permissions = "MANAGE_GUILD"
)]
pub async fn antispam(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut list = vec![1, 2];
        assert!(toggle(&mut list, 3));
        assert_eq!(list, vec![1, 2, 3]);
        assert!(!toggle(&mut list, 1));
        assert_eq!(list, vec![2, 3]);
    }

    #[test]
    fn test_config_embed_builds() {
        let mut config = AntiSpamConfig::default();
        config.exempt_roles.push(serenity::RoleId::new(5));
        let _ = config_embed(&config);
    }
}
