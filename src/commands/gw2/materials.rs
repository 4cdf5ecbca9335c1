use poise::CreateReply;

use crate::commands::reply_error;
use crate::gw2::tables::MaterialSet;
use crate::gw2::{embed, pricing};
use crate::{Context, Error};

async fn materials_impl(ctx: Context<'_>, set: MaterialSet) -> Result<(), Error> {
    ctx.defer().await?;

    let table = set.table();
    match pricing::aggregate(&ctx.data().gw2, table.entries, table.discount).await {
        Ok(aggregate) => {
            ctx.send(CreateReply::default().embed(embed::material_total(table, &aggregate)))
                .await?;
        }
        Err(e) => {
            tracing::warn!("pricing {} failed: {e}", table.title);
            reply_error(ctx, &e.to_string()).await?;
        }
    }
    Ok(())
}

/// Current value of a bundle of crafting materials
#[poise::command(slash_command)]
pub async fn materials(
    ctx: Context<'_>,
    #[description = "Which materials to price"] set: MaterialSet,
) -> Result<(), Error> {
    materials_impl(ctx, set).await
}
