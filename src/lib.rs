pub mod commands;
pub mod config;
pub mod custom;
pub mod events;
pub mod gw2;
pub mod health;
pub mod reminder;
pub mod roles;
pub mod spam;
pub mod store;
pub mod utils;
pub mod wiki;

use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

pub struct Data {
    pub gw2: gw2::Gw2Client,
    pub wiki: wiki::WikiClient,
    pub store: Arc<store::DocumentStore>,
    pub reminders: reminder::ReminderBook,
    pub spam_log: spam::SpamLog,
    pub spam_configs: spam::GuildConfigs,
    pub custom_commands: custom::CustomCommands,
}
