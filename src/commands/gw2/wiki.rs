use poise::CreateReply;
use serenity::builder::CreateEmbed;

use crate::commands::reply_error;
use crate::wiki::WikiPage;
use crate::{Context, Error};

const RESULT_LIMIT: usize = 5;

fn results_embed(query: &str, pages: &[WikiPage]) -> CreateEmbed {
    let description = pages
        .iter()
        .enumerate()
        .map(|(i, page)| format!("{}. [{}]({})", i + 1, page.title, page.url))
        .collect::<Vec<_>>()
        .join("\n");

    CreateEmbed::new()
        .title(format!("Wiki results for \"{query}\""))
        .description(description)
        .color(0xAA0404)
}

async fn wiki_impl(ctx: Context<'_>, query: String) -> Result<(), Error> {
    ctx.defer().await?;

    match ctx.data().wiki.search(&query, RESULT_LIMIT).await {
        Ok(pages) if pages.is_empty() => {
            reply_error(ctx, &format!("Nothing on the wiki matches **{query}**.")).await?;
        }
        Ok(pages) => {
            ctx.send(CreateReply::default().embed(results_embed(&query, &pages)))
                .await?;
        }
        Err(e) => {
            tracing::warn!("wiki search for {query} failed: {e}");
            reply_error(ctx, &e.to_string()).await?;
        }
    }
    Ok(())
}

/// Search the Guild Wars 2 wiki
#[poise::command(slash_command)]
pub async fn wiki(
    ctx: Context<'_>,
    #[description = "Search terms"] query: String,
) -> Result<(), Error> {
    wiki_impl(ctx, query).await
}
