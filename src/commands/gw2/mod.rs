pub mod account;
pub mod apikey;
pub mod fractals;
pub mod materials;
pub mod price;
pub mod wiki;

use crate::gw2::keys::{ApiKeyRecord, ApiKeyRing};
use crate::{Context, Data, Error};

pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        price::price(),
        price::tpfee(),
        materials::materials(),
        apikey::apikey(),
        account::account(),
        account::wallet(),
        account::achievements(),
        wiki::wiki(),
        fractals::fractals(),
    ]
}

/// The caller's active key. Replies with a hint and returns `None` when there is none.
async fn require_active_key(ctx: Context<'_>) -> Result<Option<ApiKeyRecord>, Error> {
    let ring = ApiKeyRing::load(&ctx.data().store, ctx.author().id)?;
    match ring.active() {
        Some(key) => Ok(Some(key.clone())),
        None => {
            super::reply_error(
                ctx,
                "You have no API key yet. Add one with `/apikey add`.",
            )
            .await?;
            Ok(None)
        }
    }
}
