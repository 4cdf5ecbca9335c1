use std::time::Duration;

use poise::serenity_prelude as serenity;
use serenity::builder::{CreateActionRow, CreateButton};
use serenity::model::application::{ButtonStyle, ComponentInteraction};

use crate::Context;

/// How long interactive components stay live.
pub const COMPONENT_TIMEOUT_SECS: u64 = 300;

pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars - 3).collect();
        format!("{truncated}...")
    }
}

pub fn confirm_buttons(prefix: &str) -> CreateActionRow {
    CreateActionRow::Buttons(vec![
        CreateButton::new(format!("{prefix}_confirm"))
            .label("Confirm")
            .style(ButtonStyle::Danger),
        CreateButton::new(format!("{prefix}_cancel"))
            .label("Cancel")
            .style(ButtonStyle::Secondary),
    ])
}

/// Waits for the command author to use a component on `msg`.
pub async fn await_component_interaction(
    ctx: Context<'_>,
    msg: &serenity::Message,
    timeout_secs: u64,
) -> Option<ComponentInteraction> {
    serenity::ComponentInteractionCollector::new(ctx.serenity_context())
        .message_id(msg.id)
        .author_id(ctx.author().id)
        .timeout(Duration::from_secs(timeout_secs))
        .await
}
