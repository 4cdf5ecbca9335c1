use chrono::Utc;
use poise::CreateReply;
use serenity::builder::CreateEmbed;

use crate::commands::reply_error;
use crate::gw2::keys::{self, ApiKeyRing};
use crate::utils::embed;
use crate::{Context, Error};

/// Permission every registered key must carry.
const REQUIRED_PERMISSION: &str = "account";

async fn reply_private(ctx: Context<'_>, embed: CreateEmbed) -> Result<(), Error> {
    ctx.send(CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

async fn add_impl(ctx: Context<'_>, key: String) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let key = key.trim().to_string();
    if !keys::is_well_formed(&key) {
        reply_error(ctx, "That doesn't look like a Guild Wars 2 API key.").await?;
        return Ok(());
    }

    let gw2 = &ctx.data().gw2;
    let token = match gw2.token_info(&key).await {
        Ok(token) => token,
        Err(e) if e.is_invalid_key() => {
            reply_error(ctx, "The API rejected this key. Check that it was copied fully.").await?;
            return Ok(());
        }
        Err(e) => {
            reply_error(ctx, &e.to_string()).await?;
            return Ok(());
        }
    };

    if !token.permissions.iter().any(|p| p == REQUIRED_PERMISSION) {
        reply_error(
            ctx,
            &format!("The key **{}** is missing the `{REQUIRED_PERMISSION}` permission.", token.name),
        )
        .await?;
        return Ok(());
    }

    let account = match gw2.account(&key).await {
        Ok(account) => account,
        Err(e) => {
            reply_error(ctx, &e.to_string()).await?;
            return Ok(());
        }
    };

    let store = &ctx.data().store;
    let user_id = ctx.author().id;
    let mut ring = ApiKeyRing::load(store, user_id)?;
    ring.upsert(&key, &account.name, Utc::now());
    ring.save(store, user_id)?;

    tracing::info!("{} registered a key for {}", ctx.author().name, account.name);
    reply_private(
        ctx,
        embed::success(&format!(
            "Key for **{}** saved and set as active.",
            account.name
        )),
    )
    .await
}

/// Register a Guild Wars 2 API key
#[poise::command(slash_command)]
pub async fn add(
    ctx: Context<'_>,
    #[description = "API key from account.arena.net"] key: String,
) -> Result<(), Error> {
    add_impl(ctx, key).await
}

async fn list_impl(ctx: Context<'_>) -> Result<(), Error> {
    let ring = ApiKeyRing::load(&ctx.data().store, ctx.author().id)?;
    if ring.is_empty() {
        return reply_private(
            ctx,
            embed::info("API keys", "You have no keys. Add one with `/apikey add`."),
        )
        .await;
    }

    let lines: Vec<String> = ring
        .keys()
        .iter()
        .enumerate()
        .map(|(i, k)| {
            format!(
                "`{}.` **{}** `{}`{}",
                i + 1,
                k.account_name,
                k.masked(),
                if k.active { " ✅" } else { "" }
            )
        })
        .collect();

    reply_private(ctx, embed::info("API keys", &lines.join("\n"))).await
}

/// Show your registered API keys
#[poise::command(slash_command)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    list_impl(ctx).await
}

/// Accepts the number shown by `/apikey list` or an account name.
fn find_key(ring: &ApiKeyRing, account: &str) -> Option<usize> {
    match account.trim().parse::<usize>() {
        Ok(n) if n >= 1 && n <= ring.keys().len() => Some(n - 1),
        _ => ring.position_by_account(account.trim()),
    }
}

async fn switch_impl(ctx: Context<'_>, account: String) -> Result<(), Error> {
    let store = &ctx.data().store;
    let user_id = ctx.author().id;
    let mut ring = ApiKeyRing::load(store, user_id)?;

    let index = match find_key(&ring, &account) {
        Some(index) => index,
        None => {
            reply_error(ctx, &format!("You have no key for **{account}**.")).await?;
            return Ok(());
        }
    };

    ring.activate(index);
    ring.save(store, user_id)?;

    let name = ring.keys()[index].account_name.clone();
    reply_private(ctx, embed::success(&format!("**{name}** is now your active account."))).await
}

/// Choose which registered account the account commands use
#[poise::command(slash_command)]
pub async fn switch(
    ctx: Context<'_>,
    #[description = "Account name or number from /apikey list"] account: String,
) -> Result<(), Error> {
    switch_impl(ctx, account).await
}

async fn remove_impl(ctx: Context<'_>, account: String) -> Result<(), Error> {
    let store = &ctx.data().store;
    let user_id = ctx.author().id;
    let mut ring = ApiKeyRing::load(store, user_id)?;

    let removed = match find_key(&ring, &account).and_then(|i| ring.remove(i)) {
        Some(removed) => removed,
        None => {
            reply_error(ctx, &format!("You have no key for **{account}**.")).await?;
            return Ok(());
        }
    };
    ring.save(store, user_id)?;

    let mut message = format!("Removed the key for **{}**.", removed.account_name);
    if let Some(active) = ring.active() {
        if removed.active {
            message.push_str(&format!(" **{}** is now active.", active.account_name));
        }
    }
    reply_private(ctx, embed::success(&message)).await
}

/// Delete one of your API keys
#[poise::command(slash_command)]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Account name or number from /apikey list"] account: String,
) -> Result<(), Error> {
    remove_impl(ctx, account).await
}

/// Manage your Guild Wars 2 API keys
#[poise::command(
    slash_command,
    subcommands("add", "list", "switch", "remove"),
    subcommand_required
)]
pub async fn apikey(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> ApiKeyRing {
        let mut ring = ApiKeyRing::default();
        ring.upsert("key-a", "Alpha.1234", Utc::now());
        ring.upsert("key-b", "Beta.5678", Utc::now());
        ring
    }

    #[test]
    fn test_find_key_by_number_or_name() {
        let ring = ring();
        assert_eq!(find_key(&ring, "1"), Some(0));
        assert_eq!(find_key(&ring, " 2 "), Some(1));
        assert_eq!(find_key(&ring, "beta.5678"), Some(1));
        assert_eq!(find_key(&ring, "3"), None);
        assert_eq!(find_key(&ring, "0"), None);
        assert_eq!(find_key(&ring, "Gamma.0000"), None);
    }
}
