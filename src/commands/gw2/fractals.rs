use chrono::{Duration, Utc};
use poise::CreateReply;

use crate::gw2::{embed, fractals};
use crate::{Context, Error};

async fn fractals_impl(ctx: Context<'_>, day_offset: Option<i64>) -> Result<(), Error> {
    let date = Utc::now().date_naive() + Duration::days(day_offset.unwrap_or(0));
    let day = fractals::for_date(date);
    ctx.send(CreateReply::default().embed(embed::fractals(date, day)))
        .await?;
    Ok(())
}

/// Today's daily fractals, or another day's
#[poise::command(slash_command)]
pub async fn fractals(
    ctx: Context<'_>,
    #[description = "Days from today, e.g. 1 for tomorrow"]
    #[min = -14]
    #[max = 14]
    day_offset: Option<i64>,
) -> Result<(), Error> {
    fractals_impl(ctx, day_offset).await
}
