use std::collections::HashMap;

use chrono::NaiveDate;
use serenity::builder::{CreateEmbed, CreateEmbedFooter};

use super::coin::{format_thousands, Coins};
use super::fractals::FractalDay;
use super::models::{
    Account, CommerceListings, CommercePrice, Currency, Item, WalletEntry, COIN_CURRENCY_ID,
};
use super::pricing::{trading_post_fees, Aggregate, TradingPostFees};
use super::tables::MaterialTable;

/// Consistent color for all GW2 embeds.
const GW2_COLOR: u32 = 0xAA0404;

const WIKI_URL: &str = "https://wiki.guildwars2.com/wiki/";

fn rarity_color(rarity: &str) -> u32 {
    match rarity {
        "Junk" => 0xAAAAAA,
        "Basic" => 0xFFFFFF,
        "Fine" => 0x62A4DA,
        "Masterwork" => 0x1A9306,
        "Rare" => 0xFCD00B,
        "Exotic" => 0xFFA405,
        "Ascended" => 0xFB3E8D,
        "Legendary" => 0x4C139D,
        _ => GW2_COLOR,
    }
}

fn wiki_link(name: &str) -> String {
    format!("{WIKI_URL}{}", name.replace(' ', "_"))
}

/// Format seconds played as "1,234 hours".
fn format_age(seconds: u64) -> String {
    format!("{} hours", format_thousands(seconds / 3600))
}

/// Trading post quote for one item.
pub fn item_price(
    item: &Item,
    price: &CommercePrice,
    listings: Option<&CommerceListings>,
) -> CreateEmbed {
    let sell = Coins(price.sells.unit_price);
    let buy = Coins(price.buys.unit_price);
    let TradingPostFees {
        listing,
        exchange,
        proceeds,
    } = trading_post_fees(sell);

    let mut description = format!("**Rarity**: {}  ·  **Type**: {}", item.rarity, item.kind);
    if item.level > 0 {
        description.push_str(&format!("  ·  **Level**: {}", item.level));
    }

    let mut embed = CreateEmbed::new()
        .title(&item.name)
        .url(wiki_link(&item.name))
        .description(description)
        .color(rarity_color(&item.rarity))
        .field("Lowest sell", sell.display_short(), true)
        .field("Highest buy", buy.display_short(), true)
        .field("Vendor", Coins(item.vendor_value).display_short(), true)
        .field(
            "Selling at lowest listing",
            format!(
                "Listing fee {}\nExchange fee {}\nYou receive **{}**",
                listing.display_short(),
                exchange.display_short(),
                proceeds.display_short()
            ),
            false,
        );

    if let Some(listings) = listings {
        embed = embed.field(
            "Depth",
            format!(
                "{} for sale · {} wanted",
                listings.supply(),
                listings.demand()
            ),
            false,
        );
    }

    if let Some(ref icon) = item.icon {
        embed = embed.thumbnail(icon);
    }

    embed.footer(CreateEmbedFooter::new(format!("Item id {}", item.id)))
}

/// Bulk price of a material table.
pub fn material_total(table: &MaterialTable, aggregate: &Aggregate) -> CreateEmbed {
    let mut lines = String::new();
    for entry in table.entries {
        match aggregate.quotes.iter().find(|q| q.item_id == entry.item_id) {
            Some(quote) => lines.push_str(&format!(
                "{} × {}: {}\n",
                entry.quantity,
                entry.name,
                Coins(quote.subtotal()).display_short()
            )),
            None => lines.push_str(&format!(
                "{} × {}: *unavailable*\n",
                entry.quantity, entry.name
            )),
        }
    }

    let mut embed = CreateEmbed::new()
        .title(table.title)
        .description(format!("{}\n\n{lines}", table.description))
        .color(GW2_COLOR)
        .field("Trading post value", aggregate.total.display_short(), true)
        .field(
            format!("At {}%", aggregate.discount.as_percent()),
            format!("**{}**", aggregate.discounted.display_short()),
            true,
        );

    if !aggregate.failed.is_empty() {
        embed = embed.footer(CreateEmbedFooter::new(format!(
            "{} item(s) could not be priced and were left out",
            aggregate.failed.len()
        )));
    }

    embed
}

pub fn fees(price: Coins) -> CreateEmbed {
    let fees = trading_post_fees(price);
    CreateEmbed::new()
        .title("Trading post fees")
        .description(format!("Selling for **{}**", price.display_short()))
        .color(GW2_COLOR)
        .field("Listing fee (5%)", fees.listing.display_short(), true)
        .field("Exchange fee (10%)", fees.exchange.display_short(), true)
        .field("You receive", format!("**{}**", fees.proceeds.display_short()), false)
}

pub fn account(account: &Account) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&account.name)
        .color(GW2_COLOR)
        .field("Created", account.created.get(..10).unwrap_or(&account.created), true)
        .field("Played", format_age(account.age), true)
        .field("World", account.world.to_string(), true)
        .field("Commander", if account.commander { "Yes" } else { "No" }, true);

    if let Some(level) = account.fractal_level {
        embed = embed.field("Fractal level", level.to_string(), true);
    }
    if let Some(rank) = account.wvw_rank {
        embed = embed.field("WvW rank", rank.to_string(), true);
    }
    if !account.access.is_empty() {
        embed = embed.field("Access", account.access.join(", "), false);
    }

    embed
}

/// Wallet with coins first, then the other currencies in in-game order.
pub fn wallet(
    account_name: &str,
    entries: &[WalletEntry],
    currencies: &HashMap<u32, Currency>,
) -> CreateEmbed {
    let coins = entries
        .iter()
        .find(|e| e.id == COIN_CURRENCY_ID)
        .map(|e| Coins(e.value))
        .unwrap_or_default();

    let mut others: Vec<(&Currency, u64)> = entries
        .iter()
        .filter(|e| e.id != COIN_CURRENCY_ID && e.value > 0)
        .filter_map(|e| currencies.get(&e.id).map(|c| (c, e.value)))
        .collect();
    others.sort_by_key(|(c, _)| c.order);

    let mut description = String::new();
    for (currency, value) in others.iter().take(25) {
        description.push_str(&format!("**{}**: {value}\n", currency.name));
    }
    if others.len() > 25 {
        description.push_str(&format!("…and {} more", others.len() - 25));
    }
    if description.is_empty() {
        description.push_str("No other currencies");
    }

    CreateEmbed::new()
        .title(format!("Wallet of {account_name}"))
        .color(GW2_COLOR)
        .field("Coins", coins.display_short(), false)
        .description(description)
}

pub fn achievements(account_name: &str, done: usize, in_progress: usize) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("Achievements of {account_name}"))
        .color(GW2_COLOR)
        .field("Completed", done.to_string(), true)
        .field("In progress", in_progress.to_string(), true)
}

pub fn fractals(date: NaiveDate, day: &FractalDay) -> CreateEmbed {
    let tier4 = day
        .tier4
        .iter()
        .map(|name| format!("• [{name}]({})", wiki_link(&format!("{name} Fractal"))))
        .collect::<Vec<_>>()
        .join("\n");
    let recommended = day
        .recommended
        .iter()
        .map(|scale| format!("Scale {scale}"))
        .collect::<Vec<_>>()
        .join(", ");

    CreateEmbed::new()
        .title(format!("Daily fractals for {}", date.format("%A, %B %-d")))
        .color(GW2_COLOR)
        .field("Tier 4", tier4, false)
        .field("Recommended", recommended, false)
}
