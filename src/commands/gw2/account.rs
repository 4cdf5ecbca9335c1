use poise::CreateReply;

use super::require_active_key;
use crate::commands::reply_error;
use crate::gw2::embed;
use crate::gw2::models::AccountAchievement;
use crate::gw2::ApiError;
use crate::{Context, Error};

async fn report_api_error(ctx: Context<'_>, e: ApiError) -> Result<(), Error> {
    if e.is_invalid_key() {
        reply_error(
            ctx,
            "Your active API key was rejected. Register it again with `/apikey add`.",
        )
        .await
    } else {
        reply_error(ctx, &e.to_string()).await
    }
}

async fn account_impl(ctx: Context<'_>) -> Result<(), Error> {
    let key = match require_active_key(ctx).await? {
        Some(key) => key,
        None => return Ok(()),
    };
    ctx.defer().await?;

    match ctx.data().gw2.account(&key.api_key).await {
        Ok(account) => {
            ctx.send(CreateReply::default().embed(embed::account(&account)))
                .await?;
            Ok(())
        }
        Err(e) => report_api_error(ctx, e).await,
    }
}

/// Show your Guild Wars 2 account
#[poise::command(slash_command)]
pub async fn account(ctx: Context<'_>) -> Result<(), Error> {
    account_impl(ctx).await
}

async fn wallet_impl(ctx: Context<'_>) -> Result<(), Error> {
    let key = match require_active_key(ctx).await? {
        Some(key) => key,
        None => return Ok(()),
    };
    ctx.defer().await?;

    let gw2 = &ctx.data().gw2;
    let (wallet, currencies) = tokio::join!(gw2.wallet(&key.api_key), gw2.currencies());
    let wallet = match wallet {
        Ok(wallet) => wallet,
        Err(e) => return report_api_error(ctx, e).await,
    };
    let currencies = match currencies {
        Ok(currencies) => currencies,
        Err(e) => return report_api_error(ctx, e).await,
    };

    ctx.send(CreateReply::default().embed(embed::wallet(
        &key.account_name,
        &wallet,
        &currencies,
    )))
    .await?;
    Ok(())
}

/// Show the currencies in your wallet
#[poise::command(slash_command)]
pub async fn wallet(ctx: Context<'_>) -> Result<(), Error> {
    wallet_impl(ctx).await
}

/// `(completed, in progress)`
fn achievement_counts(achievements: &[AccountAchievement]) -> (usize, usize) {
    let done = achievements.iter().filter(|a| a.done).count();
    let in_progress = achievements
        .iter()
        .filter(|a| !a.done && a.current.unwrap_or(0) > 0)
        .count();
    (done, in_progress)
}

async fn achievements_impl(ctx: Context<'_>) -> Result<(), Error> {
    let key = match require_active_key(ctx).await? {
        Some(key) => key,
        None => return Ok(()),
    };
    ctx.defer().await?;

    match ctx.data().gw2.account_achievements(&key.api_key).await {
        Ok(achievements) => {
            let (done, in_progress) = achievement_counts(&achievements);
            ctx.send(CreateReply::default().embed(embed::achievements(
                &key.account_name,
                done,
                in_progress,
            )))
            .await?;
            Ok(())
        }
        Err(e) => report_api_error(ctx, e).await,
    }
}

/// Show your achievement progress
#[poise::command(slash_command)]
pub async fn achievements(ctx: Context<'_>) -> Result<(), Error> {
    achievements_impl(ctx).await
}
