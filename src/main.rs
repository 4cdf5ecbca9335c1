use std::sync::Arc;

use gw2_community_bot::custom::CustomCommands;
use gw2_community_bot::gw2::Gw2Client;
use gw2_community_bot::reminder::scheduler::{self, DirectMessage};
use gw2_community_bot::reminder::ReminderBook;
use gw2_community_bot::spam::GuildConfigs;
use gw2_community_bot::store::{DocumentStore, StoreError};
use gw2_community_bot::wiki::WikiClient;
use gw2_community_bot::{commands, config, custom, events, health, reminder, spam, Data};
use poise::serenity_prelude as serenity;

fn load_state(
    store: &DocumentStore,
) -> Result<(ReminderBook, GuildConfigs, CustomCommands), StoreError> {
    Ok((
        reminder::load(store)?,
        spam::load_configs(store)?,
        custom::load(store)?,
    ))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    let store = match DocumentStore::open(&config.database_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("could not open database {}: {e}", config.database_path);
            std::process::exit(1);
        }
    };
    tracing::info!("database opened: {}", config.database_path);

    let (reminders, spam_configs, custom_commands) = match load_state(&store) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("could not load stored state: {e}");
            std::process::exit(1);
        }
    };

    let http = match Gw2Client::build_http_client() {
        Ok(http) => http,
        Err(e) => {
            tracing::error!("could not build HTTP client: {e}");
            std::process::exit(1);
        }
    };

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS;

    let sync_commands = config.sync_commands;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(commands::on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                if sync_commands {
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                    tracing::info!(
                        "registered {} commands globally",
                        framework.options().commands.len()
                    );
                }

                let spam_log = spam::new_spam_log();
                scheduler::spawn(
                    reminders.clone(),
                    Arc::clone(&store),
                    DirectMessage::new(ctx.http.clone()),
                );
                spam::spawn_sweeper(spam_log.clone(), spam_configs.clone());

                tracing::info!("bot is ready");
                Ok(Data {
                    gw2: Gw2Client::new(http.clone()),
                    wiki: WikiClient::new(http),
                    store,
                    reminders,
                    spam_log,
                    spam_configs,
                    custom_commands,
                })
            })
        })
        .build();

    health::spawn(config.port).await;

    let mut client = match serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await
    {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("could not create Discord client: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = client.start().await {
        tracing::error!("client error: {e}");
    }
}
