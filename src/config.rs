pub struct Config {
    pub discord_token: String,
    pub database_path: String,
    pub sync_commands: bool,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable source. Panics without `DISCORD_TOKEN`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            discord_token: lookup("DISCORD_TOKEN")
                .filter(|v| !v.trim().is_empty())
                .expect("DISCORD_TOKEN environment variable is required"),
            database_path: lookup("DATABASE_PATH").unwrap_or_else(|| "gw2bot.db".to_string()),
            sync_commands: lookup("SYNC_COMMANDS").is_some_and(|v| parse_flag(&v)),
            port: lookup("PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(8080),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
