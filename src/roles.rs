use std::collections::BTreeMap;

use poise::serenity_prelude as serenity;
use serde::{Deserialize, Serialize};
use serenity::model::channel::{Reaction, ReactionType};
use serenity::model::id::{ChannelId, GuildId, MessageId, RoleId};

use crate::store::{DocumentStore, StoreError, ROLE_REACTIONS};
use crate::{Data, Error};

/// A message whose reactions hand out roles.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RoleReactionMessage {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    /// Emoji key (see [`emoji_key`]) to role.
    pub mappings: BTreeMap<String, RoleId>,
}

fn doc_key(guild_id: GuildId, message_id: MessageId) -> String {
    format!("{guild_id}-{message_id}")
}

/// Custom emoji are keyed by id so renames and animation flags don't matter.
pub fn emoji_key(emoji: &ReactionType) -> String {
    match emoji {
        ReactionType::Custom { id, .. } => id.to_string(),
        ReactionType::Unicode(s) => s.clone(),
        _ => emoji.to_string(),
    }
}

/// Accepts a bare message id or a `https://discord.com/channels/g/c/m` link.
pub fn parse_message_ref(input: &str) -> Option<(Option<ChannelId>, MessageId)> {
    let input = input.trim();
    if let Ok(id) = input.parse::<u64>() {
        return (id != 0).then(|| (None, MessageId::new(id)));
    }

    let path = input.split("/channels/").nth(1)?;
    let parts: Vec<&str> = path.trim_end_matches('/').split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let channel: u64 = parts[1].parse().ok()?;
    let message: u64 = parts[2].parse().ok()?;
    if channel == 0 || message == 0 {
        return None;
    }
    Some((Some(ChannelId::new(channel)), MessageId::new(message)))
}

pub fn get(
    store: &DocumentStore,
    guild_id: GuildId,
    message_id: MessageId,
) -> Result<Option<RoleReactionMessage>, StoreError> {
    store.get(ROLE_REACTIONS, &doc_key(guild_id, message_id))
}

/// Maps `emoji` on the message to `role`, replacing any previous mapping for that emoji.
pub fn add_mapping(
    store: &DocumentStore,
    guild_id: GuildId,
    channel_id: ChannelId,
    message_id: MessageId,
    emoji: String,
    role_id: RoleId,
) -> Result<RoleReactionMessage, StoreError> {
    let mut doc = get(store, guild_id, message_id)?.unwrap_or(RoleReactionMessage {
        guild_id,
        channel_id,
        message_id,
        mappings: BTreeMap::new(),
    });
    doc.mappings.insert(emoji, role_id);
    store.set(ROLE_REACTIONS, &doc_key(guild_id, message_id), &doc)?;
    Ok(doc)
}

/// Drops one mapping. The document goes away with its last mapping.
pub fn remove_mapping(
    store: &DocumentStore,
    guild_id: GuildId,
    message_id: MessageId,
    emoji: &str,
) -> Result<Option<RoleId>, StoreError> {
    let mut doc = match get(store, guild_id, message_id)? {
        Some(doc) => doc,
        None => return Ok(None),
    };
    let removed = doc.mappings.remove(emoji);
    if removed.is_some() {
        let key = doc_key(guild_id, message_id);
        if doc.mappings.is_empty() {
            store.delete(ROLE_REACTIONS, &key)?;
        } else {
            store.set(ROLE_REACTIONS, &key, &doc)?;
        }
    }
    Ok(removed)
}

pub fn list_for_guild(
    store: &DocumentStore,
    guild_id: GuildId,
) -> Result<Vec<RoleReactionMessage>, StoreError> {
    Ok(store
        .list::<RoleReactionMessage>(ROLE_REACTIONS)?
        .into_iter()
        .map(|(_, doc)| doc)
        .filter(|doc| doc.guild_id == guild_id)
        .collect())
}

/// Grants (`added`) or revokes the role mapped to a reaction.
pub async fn handle_reaction(
    ctx: &serenity::Context,
    reaction: &Reaction,
    data: &Data,
    added: bool,
) -> Result<(), Error> {
    let (guild_id, user_id) = match (reaction.guild_id, reaction.user_id) {
        (Some(g), Some(u)) => (g, u),
        _ => return Ok(()),
    };
    if user_id == ctx.cache.current_user().id {
        return Ok(());
    }

    let doc = match get(&data.store, guild_id, reaction.message_id)? {
        Some(doc) => doc,
        None => return Ok(()),
    };
    let role_id = match doc.mappings.get(&emoji_key(&reaction.emoji)) {
        Some(role) => *role,
        None => return Ok(()),
    };

    let result = if added {
        ctx.http
            .add_member_role(guild_id, user_id, role_id, Some("Role reaction"))
            .await
    } else {
        ctx.http
            .remove_member_role(guild_id, user_id, role_id, Some("Role reaction"))
            .await
    };

    match result {
        Ok(()) => {
            tracing::info!(
                "{} role {role_id} for {user_id} in {guild_id}",
                if added { "granted" } else { "revoked" }
            );
        }
        // Usually the bot's role sits below the mapped one.
        Err(e) => tracing::warn!("role reaction failed for {user_id} in {guild_id}: {e}"),
    }
    Ok(())
}
