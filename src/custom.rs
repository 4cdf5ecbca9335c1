use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;
use serde::{Deserialize, Serialize};
use serenity::builder::{CreateAllowedMentions, CreateMessage};
use serenity::model::id::{GuildId, UserId};
use tokio::sync::RwLock;

use crate::store::{DocumentStore, StoreError, CUSTOM_COMMANDS};
use crate::{Data, Error};

/// Messages starting with this character may trigger a custom command.
pub const TRIGGER_PREFIX: char = '!';

const MAX_NAME_LEN: usize = 32;
pub const MAX_RESPONSE_LEN: usize = 2000;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CustomCommand {
    pub guild_id: GuildId,
    pub name: String,
    pub response: String,
    pub creator_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Custom commands per guild, keyed by normalized name. Loaded once at startup.
pub type CustomCommands = Arc<RwLock<HashMap<GuildId, HashMap<String, CustomCommand>>>>;

#[derive(Debug, PartialEq)]
pub enum NameError {
    Empty,
    TooLong,
    InvalidChar(char),
}

impl std::fmt::Display for NameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "the command name cannot be empty"),
            Self::TooLong => write!(f, "command names are limited to {MAX_NAME_LEN} characters"),
            Self::InvalidChar(c) => write!(
                f,
                "`{c}` is not allowed, use letters, digits, `-` and `_`"
            ),
        }
    }
}

impl std::error::Error for NameError {}

fn doc_key(guild_id: GuildId, name: &str) -> String {
    format!("{guild_id}-{name}")
}

/// Lowercases and validates a command name. A leading `!` is ignored.
pub fn normalize_name(name: &str) -> Result<String, NameError> {
    let name = name.trim().trim_start_matches(TRIGGER_PREFIX).to_lowercase();
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(NameError::TooLong);
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(NameError::InvalidChar(bad));
    }
    Ok(name)
}

/// The command name a message invokes, e.g. `!build rest of text` → `build`.
pub fn parse_trigger(content: &str) -> Option<String> {
    let rest = content.trim_start().strip_prefix(TRIGGER_PREFIX)?;
    let word = rest.split_whitespace().next()?;
    normalize_name(word).ok()
}

pub fn new_custom_commands() -> CustomCommands {
    Arc::new(RwLock::new(HashMap::new()))
}

pub fn load(store: &DocumentStore) -> Result<CustomCommands, StoreError> {
    let mut map: HashMap<GuildId, HashMap<String, CustomCommand>> = HashMap::new();
    let mut count = 0;
    for (_, cmd) in store.list::<CustomCommand>(CUSTOM_COMMANDS)? {
        map.entry(cmd.guild_id)
            .or_default()
            .insert(cmd.name.clone(), cmd);
        count += 1;
    }
    tracing::info!("loaded {count} custom commands across {} guilds", map.len());
    Ok(Arc::new(RwLock::new(map)))
}

/// Stores the command, replacing one with the same name. Returns whether it replaced one.
pub async fn add(
    commands: &CustomCommands,
    store: &DocumentStore,
    command: CustomCommand,
) -> Result<bool, StoreError> {
    store.set(
        CUSTOM_COMMANDS,
        &doc_key(command.guild_id, &command.name),
        &command,
    )?;
    let mut commands = commands.write().await;
    let replaced = commands
        .entry(command.guild_id)
        .or_default()
        .insert(command.name.clone(), command);
    Ok(replaced.is_some())
}

pub async fn remove(
    commands: &CustomCommands,
    store: &DocumentStore,
    guild_id: GuildId,
    name: &str,
) -> Result<Option<CustomCommand>, StoreError> {
    let removed = {
        let mut commands = commands.write().await;
        commands.get_mut(&guild_id).and_then(|g| g.remove(name))
    };
    if removed.is_some() {
        store.delete(CUSTOM_COMMANDS, &doc_key(guild_id, name))?;
    }
    Ok(removed)
}

pub async fn lookup(commands: &CustomCommands, guild_id: GuildId, name: &str) -> Option<String> {
    let commands = commands.read().await;
    commands
        .get(&guild_id)
        .and_then(|g| g.get(name))
        .map(|c| c.response.clone())
}

/// All commands of a guild, sorted by name.
pub async fn list(commands: &CustomCommands, guild_id: GuildId) -> Vec<CustomCommand> {
    let commands = commands.read().await;
    let mut list: Vec<CustomCommand> = commands
        .get(&guild_id)
        .map(|g| g.values().cloned().collect())
        .unwrap_or_default();
    list.sort_by(|a, b| a.name.cmp(&b.name));
    list
}

/// A stored response may only ping users, never `@everyone`, `@here` or roles.
fn response_message(response: String) -> CreateMessage {
    CreateMessage::new()
        .content(response)
        .allowed_mentions(CreateAllowedMentions::new().all_users(true))
}

/// Replies with the stored response when a message invokes a custom command.
pub async fn handle_message(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    if msg.author.bot {
        return Ok(());
    }
    let guild_id = match msg.guild_id {
        Some(id) => id,
        None => return Ok(()),
    };
    let name = match parse_trigger(&msg.content) {
        Some(name) => name,
        None => return Ok(()),
    };

    if let Some(response) = lookup(&data.custom_commands, guild_id, &name).await {
        tracing::debug!("custom command !{name} used by {}", msg.author.name);
        msg.channel_id
            .send_message(&ctx.http, response_message(response))
            .await?;
    }
    Ok(())
}
