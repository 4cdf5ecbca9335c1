use poise::CreateReply;
use serenity::builder::CreateEmbed;

use crate::{Context, Error};

async fn help_impl(ctx: Context<'_>) -> Result<(), Error> {
    let trading_cmds = "\
`/price` — Trading post price of an item
`/materials` — Value of a material bundle
`/tpfee` — Listing and exchange fees for a sell price";

    let account_cmds = "\
`/apikey add|list|switch|remove` — Manage your API keys
`/account` — Account overview
`/wallet` — Wallet currencies
`/achievements` — Achievement progress";

    let game_cmds = "\
`/wiki` — Search the wiki
`/fractals` — Daily fractals";

    let community_cmds = "\
`/remind me|user|list|remove` — Reminders by DM
`/custom add|remove|list` — Custom `!commands`
`/rolereact add|remove|list` — Roles by reaction
`/coinflip`, `/roll`, `/8ball` — Games";

    let moderation_cmds = "\
`/purge` — Bulk delete messages
`/antispam` — Attachment spam protection";

    let embed = CreateEmbed::new()
        .title("Commands")
        .field("Trading post", trading_cmds, false)
        .field("Account", account_cmds, false)
        .field("Game info", game_cmds, false)
        .field("Community", community_cmds, false)
        .field("Moderation", moderation_cmds, false)
        .color(0xAA0404);

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show what the bot can do
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    help_impl(ctx).await
}
