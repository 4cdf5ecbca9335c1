use poise::CreateReply;

use crate::commands::reply_error;
use crate::gw2::{embed, Coins};
use crate::{Context, Error};

/// Turns user input into an item id: a number is taken as is, anything else
/// is looked up on the wiki.
async fn resolve_item_id(ctx: Context<'_>, item: &str) -> Result<Option<u32>, Error> {
    let item = item.trim();
    if let Ok(id) = item.parse::<u32>() {
        return Ok(Some(id));
    }
    Ok(ctx.data().wiki.item_id(item).await?)
}

async fn price_impl(ctx: Context<'_>, item: String) -> Result<(), Error> {
    ctx.defer().await?;

    let id = match resolve_item_id(ctx, &item).await {
        Ok(Some(id)) => id,
        Ok(None) => {
            reply_error(ctx, &format!("No item called **{item}** was found.")).await?;
            return Ok(());
        }
        Err(e) => {
            tracing::warn!("item lookup for {item} failed: {e}");
            reply_error(ctx, &e.to_string()).await?;
            return Ok(());
        }
    };

    let gw2 = &ctx.data().gw2;
    let (details, price, listings) = tokio::join!(gw2.item(id), gw2.price(id), gw2.listings(id));

    let details = match details {
        Ok(details) => details,
        Err(e) => {
            reply_error(ctx, &e.to_string()).await?;
            return Ok(());
        }
    };

    let price = match price {
        Ok(price) if details.is_tradeable() => price,
        Ok(_) => {
            reply_error(
                ctx,
                &format!("**{}** is account bound and cannot be traded.", details.name),
            )
            .await?;
            return Ok(());
        }
        Err(e) if e.is_not_found() => {
            reply_error(
                ctx,
                &format!("**{}** cannot be sold on the trading post.", details.name),
            )
            .await?;
            return Ok(());
        }
        Err(e) => {
            reply_error(ctx, &e.to_string()).await?;
            return Ok(());
        }
    };

    if let Err(ref e) = listings {
        tracing::debug!("listings for {id} unavailable: {e}");
    }

    ctx.send(CreateReply::default().embed(embed::item_price(
        &details,
        &price,
        listings.as_ref().ok(),
    )))
    .await?;
    Ok(())
}

/// Look up the trading post price of an item
#[poise::command(slash_command)]
pub async fn price(
    ctx: Context<'_>,
    #[description = "Item name or id"] item: String,
) -> Result<(), Error> {
    price_impl(ctx, item).await
}

async fn tpfee_impl(ctx: Context<'_>, price: String) -> Result<(), Error> {
    let coins: Coins = match price.parse() {
        Ok(coins) => coins,
        Err(e) => {
            reply_error(ctx, &format!("`{price}` is not a valid price: {e}")).await?;
            return Ok(());
        }
    };
    if coins.0 == 0 {
        reply_error(ctx, "The price has to be at least 1 copper.").await?;
        return Ok(());
    }

    ctx.send(CreateReply::default().embed(embed::fees(coins)))
        .await?;
    Ok(())
}

/// Trading post fees for a sell price such as 12g 50s
#[poise::command(slash_command)]
pub async fn tpfee(
    ctx: Context<'_>,
    #[description = "Sell price, e.g. 1g 20s 5c"] price: String,
) -> Result<(), Error> {
    tpfee_impl(ctx, price).await
}
