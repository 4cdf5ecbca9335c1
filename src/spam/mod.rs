pub mod action;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serenity::model::id::{ChannelId, GuildId, MessageId, RoleId, UserId};
use tokio::sync::RwLock;

use crate::store::{DocumentStore, StoreError, GUILD_CONFIG};

pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Lowest usable value for either threshold. A single message is always in
/// one channel, so anything lower flags every attachment.
pub const MIN_THRESHOLD: usize = 2;

/// Anti-spam settings of one guild.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AntiSpamConfig {
    pub enabled: bool,
    pub time_window_seconds: u64,
    pub max_messages: usize,
    pub max_channels: usize,
    pub delete_messages: bool,
    pub timeout_enabled: bool,
    pub timeout_duration_seconds: u64,
    pub exempt_roles: Vec<RoleId>,
    pub exempt_channels: Vec<ChannelId>,
}

impl Default for AntiSpamConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            time_window_seconds: 20,
            max_messages: 3,
            max_channels: 2,
            delete_messages: true,
            timeout_enabled: true,
            timeout_duration_seconds: 600,
            exempt_roles: Vec::new(),
            exempt_channels: Vec::new(),
        }
    }
}

impl AntiSpamConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.time_window_seconds)
    }

    /// `privileged` is set for members who can manage messages or administer the guild.
    /// Messages in a thread are also exempt when the thread's parent channel is.
    pub fn is_exempt(
        &self,
        channel_id: ChannelId,
        parent_id: Option<ChannelId>,
        roles: &[RoleId],
        privileged: bool,
    ) -> bool {
        privileged
            || self.exempt_channels.contains(&channel_id)
            || parent_id.is_some_and(|p| self.exempt_channels.contains(&p))
            || roles.iter().any(|r| self.exempt_roles.contains(r))
    }

    /// Raises thresholds below `MIN_THRESHOLD`, e.g. from hand-edited stored configs.
    pub fn clamp_thresholds(&mut self) {
        self.max_messages = self.max_messages.max(MIN_THRESHOLD);
        self.max_channels = self.max_channels.max(MIN_THRESHOLD);
    }
}

/// Parent channel of `channel_id` when it is one of the given `(thread, parent)` pairs.
pub fn thread_parent<I>(channel_id: ChannelId, threads: I) -> Option<ChannelId>
where
    I: IntoIterator<Item = (ChannelId, Option<ChannelId>)>,
{
    threads
        .into_iter()
        .find(|(id, _)| *id == channel_id)
        .and_then(|(_, parent)| parent)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpamWindowEntry {
    pub user_id: UserId,
    pub timestamp: Instant,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

#[derive(Debug, PartialEq)]
pub enum Verdict {
    Clean,
    /// The user crossed a threshold. Carries the messages that were in the window.
    Flagged(Vec<SpamWindowEntry>),
}

pub type SpamLog = Arc<RwLock<HashMap<(GuildId, UserId), Vec<SpamWindowEntry>>>>;
pub type GuildConfigs = Arc<RwLock<HashMap<GuildId, AntiSpamConfig>>>;

pub fn new_spam_log() -> SpamLog {
    Arc::new(RwLock::new(HashMap::new()))
}

pub fn new_guild_configs() -> GuildConfigs {
    Arc::new(RwLock::new(HashMap::new()))
}

fn within_window(entry: &SpamWindowEntry, now: Instant, window: Duration) -> bool {
    now.saturating_duration_since(entry.timestamp) <= window
}

/// Whether the entries (already restricted to the window) cross either threshold.
pub fn exceeds_thresholds(entries: &[SpamWindowEntry], config: &AntiSpamConfig) -> bool {
    if entries.len() >= config.max_messages {
        return true;
    }
    let channels: HashSet<ChannelId> = entries.iter().map(|e| e.channel_id).collect();
    channels.len() >= config.max_channels
}

/// Appends a qualifying message and re-evaluates the user's window.
///
/// A flagged user's history is cleared so tracking restarts from nothing.
pub async fn record(
    log: &SpamLog,
    config: &AntiSpamConfig,
    guild_id: GuildId,
    entry: SpamWindowEntry,
    now: Instant,
) -> Verdict {
    let window = config.window();
    let key = (guild_id, entry.user_id);

    let mut log = log.write().await;
    let entries = log.entry(key).or_default();
    entries.push(entry);
    entries.retain(|e| within_window(e, now, window));

    if exceeds_thresholds(entries, config) {
        let flagged = log.remove(&key).unwrap_or_default();
        Verdict::Flagged(flagged)
    } else {
        Verdict::Clean
    }
}

/// Drops entries older than the largest window configured in any guild.
/// Returns how many entries were removed.
pub async fn sweep(log: &SpamLog, configs: &GuildConfigs, now: Instant) -> usize {
    let max_window = {
        let configs = configs.read().await;
        configs
            .values()
            .map(AntiSpamConfig::window)
            .chain(std::iter::once(AntiSpamConfig::default().window()))
            .max()
            .unwrap_or_default()
    };

    let mut log = log.write().await;
    let mut removed = 0;
    for entries in log.values_mut() {
        let before = entries.len();
        entries.retain(|e| within_window(e, now, max_window));
        removed += before - entries.len();
    }
    log.retain(|_, entries| !entries.is_empty());
    removed
}

/// Runs `sweep` every minute for the lifetime of the process.
pub fn spawn_sweeper(log: SpamLog, configs: GuildConfigs) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = sweep(&log, &configs, Instant::now()).await;
            if removed > 0 {
                tracing::debug!("spam sweep dropped {removed} stale entries");
            }
        }
    });
}

pub async fn config_for(configs: &GuildConfigs, guild_id: GuildId) -> AntiSpamConfig {
    let configs = configs.read().await;
    configs.get(&guild_id).cloned().unwrap_or_default()
}

/// Applies `change` to a guild's config and writes the result through to the store.
pub async fn update_config<F>(
    configs: &GuildConfigs,
    store: &DocumentStore,
    guild_id: GuildId,
    change: F,
) -> Result<AntiSpamConfig, StoreError>
where
    F: FnOnce(&mut AntiSpamConfig),
{
    let mut configs = configs.write().await;
    let mut updated = configs.get(&guild_id).cloned().unwrap_or_default();
    change(&mut updated);
    updated.clamp_thresholds();

    store.set(GUILD_CONFIG, &guild_id.to_string(), &updated)?;
    configs.insert(guild_id, updated.clone());
    Ok(updated)
}

pub fn load_configs(store: &DocumentStore) -> Result<GuildConfigs, StoreError> {
    let mut map = HashMap::new();
    for (key, mut config) in store.list::<AntiSpamConfig>(GUILD_CONFIG)? {
        match key.parse::<u64>() {
            Ok(id) if id != 0 => {
                config.clamp_thresholds();
                map.insert(GuildId::new(id), config);
            }
            _ => tracing::warn!("ignoring guild config with bad key {key}"),
        }
    }
    tracing::info!("loaded anti-spam config for {} guilds", map.len());
    Ok(Arc::new(RwLock::new(map)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user: u64, channel: u64, message: u64, at: Instant) -> SpamWindowEntry {
        SpamWindowEntry {
            user_id: UserId::new(user),
            timestamp: at,
            channel_id: ChannelId::new(channel),
            message_id: MessageId::new(message),
        }
    }

    fn config() -> AntiSpamConfig {
        AntiSpamConfig {
            enabled: true,
            time_window_seconds: 20,
            max_messages: 3,
            max_channels: 5,
            ..AntiSpamConfig::default()
        }
    }

    #[test]
    fn test_exemptions() {
        let cfg = AntiSpamConfig {
            exempt_roles: vec![RoleId::new(7)],
            exempt_channels: vec![ChannelId::new(9)],
            ..AntiSpamConfig::default()
        };

        assert!(cfg.is_exempt(ChannelId::new(1), None, &[], true));
        assert!(cfg.is_exempt(ChannelId::new(9), None, &[], false));
        assert!(cfg.is_exempt(ChannelId::new(1), None, &[RoleId::new(3), RoleId::new(7)], false));
        assert!(!cfg.is_exempt(ChannelId::new(1), None, &[RoleId::new(3)], false));
    }

    #[test]
    fn test_thread_in_exempt_channel_is_exempt() {
        let cfg = AntiSpamConfig {
            exempt_channels: vec![ChannelId::new(9)],
            ..AntiSpamConfig::default()
        };
        let threads = [
            (ChannelId::new(40), Some(ChannelId::new(9))),
            (ChannelId::new(41), Some(ChannelId::new(3))),
        ];

        let parent = thread_parent(ChannelId::new(40), threads);
        assert_eq!(parent, Some(ChannelId::new(9)));
        assert!(cfg.is_exempt(ChannelId::new(40), parent, &[], false));

        let parent = thread_parent(ChannelId::new(41), threads);
        assert!(!cfg.is_exempt(ChannelId::new(41), parent, &[], false));

        // A regular channel has no parent
        assert_eq!(thread_parent(ChannelId::new(9), threads), None);
    }

    #[tokio::test]
    async fn test_single_message_never_flags() {
        let store = DocumentStore::open_in_memory().unwrap();
        let stored = AntiSpamConfig {
            enabled: true,
            max_messages: 1,
            max_channels: 1,
            ..AntiSpamConfig::default()
        };
        store.set(GUILD_CONFIG, "1", &stored).unwrap();

        let configs = load_configs(&store).unwrap();
        let cfg = config_for(&configs, GuildId::new(1)).await;
        assert_eq!(cfg.max_messages, MIN_THRESHOLD);
        assert_eq!(cfg.max_channels, MIN_THRESHOLD);

        let log = new_spam_log();
        let now = Instant::now();
        let verdict = record(&log, &cfg, GuildId::new(1), entry(5, 10, 100, now), now).await;
        assert_eq!(verdict, Verdict::Clean);

        let updated = update_config(&configs, &store, GuildId::new(1), |c| c.max_channels = 1)
            .await
            .unwrap();
        assert_eq!(updated.max_channels, MIN_THRESHOLD);
    }

    #[test]
    fn test_default_config_roundtrips_through_serde() {
        let cfg = AntiSpamConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: AntiSpamConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);

        let partial: AntiSpamConfig = serde_json::from_str(r#"{"enabled": true}"#).unwrap();
        assert!(partial.enabled);
        assert_eq!(partial.max_messages, 3);
    }

    #[tokio::test]
    async fn test_three_messages_within_window_flags() {
        let log = new_spam_log();
        let guild = GuildId::new(1);
        let cfg = config();
        let t0 = Instant::now();

        let first = record(&log, &cfg, guild, entry(5, 10, 100, t0), t0).await;
        assert_eq!(first, Verdict::Clean);

        let t1 = t0 + Duration::from_secs(8);
        let second = record(&log, &cfg, guild, entry(5, 10, 101, t1), t1).await;
        assert_eq!(second, Verdict::Clean);

        let t2 = t0 + Duration::from_secs(20);
        match record(&log, &cfg, guild, entry(5, 10, 102, t2), t2).await {
            Verdict::Flagged(entries) => {
                let ids: Vec<u64> = entries.iter().map(|e| e.message_id.get()).collect();
                assert_eq!(ids, vec![100, 101, 102]);
            }
            Verdict::Clean => panic!("expected spam to be flagged"),
        }

        // History is cleared after flagging
        assert!(log.read().await.get(&(guild, UserId::new(5))).is_none());
    }

    #[tokio::test]
    async fn test_three_messages_spread_over_25_seconds_is_clean() {
        let log = new_spam_log();
        let guild = GuildId::new(1);
        let cfg = config();
        let t0 = Instant::now();

        for (offset, message) in [(0, 100), (12, 101), (25, 102)] {
            let at = t0 + Duration::from_secs(offset);
            let verdict = record(&log, &cfg, guild, entry(5, 10, message, at), at).await;
            assert_eq!(verdict, Verdict::Clean, "flagged at +{offset}s");
        }

        // The first message aged out of the window
        let log = log.read().await;
        assert_eq!(log.get(&(guild, UserId::new(5))).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_distinct_channels_flag_before_message_count() {
        let log = new_spam_log();
        let guild = GuildId::new(1);
        let cfg = AntiSpamConfig {
            max_channels: 2,
            ..config()
        };
        let t0 = Instant::now();

        let first = record(&log, &cfg, guild, entry(5, 10, 100, t0), t0).await;
        assert_eq!(first, Verdict::Clean);

        let t1 = t0 + Duration::from_secs(3);
        let second = record(&log, &cfg, guild, entry(5, 11, 101, t1), t1).await;
        assert!(matches!(second, Verdict::Flagged(ref entries) if entries.len() == 2));
    }

    #[tokio::test]
    async fn test_users_and_guilds_tracked_separately() {
        let log = new_spam_log();
        let cfg = config();
        let t0 = Instant::now();

        for (i, (guild, user)) in [(1, 5), (1, 6), (2, 5), (1, 5), (1, 6), (2, 5)]
            .into_iter()
            .enumerate()
        {
            let message = entry(user, 10, i as u64 + 1, t0);
            let verdict = record(&log, &cfg, GuildId::new(guild), message, t0).await;
            assert_eq!(verdict, Verdict::Clean);
        }
        assert_eq!(log.read().await.len(), 3);
    }

    #[tokio::test]
    async fn test_sweep_uses_largest_window() {
        let log = new_spam_log();
        let configs = new_guild_configs();
        configs.write().await.insert(
            GuildId::new(2),
            AntiSpamConfig {
                time_window_seconds: 60,
                ..AntiSpamConfig::default()
            },
        );

        let t0 = Instant::now();
        {
            let mut log = log.write().await;
            log.insert(
                (GuildId::new(1), UserId::new(5)),
                vec![entry(5, 10, 1, t0), entry(5, 10, 2, t0 + Duration::from_secs(50))],
            );
            log.insert((GuildId::new(1), UserId::new(6)), vec![entry(6, 10, 3, t0)]);
        }

        let removed = sweep(&log, &configs, t0 + Duration::from_secs(90)).await;
        assert_eq!(removed, 2);

        let log = log.read().await;
        assert_eq!(log.len(), 1);
        assert_eq!(log[&(GuildId::new(1), UserId::new(5))].len(), 1);
    }

    #[tokio::test]
    async fn test_update_config_writes_through() {
        let store = DocumentStore::open_in_memory().unwrap();
        let configs = new_guild_configs();
        let guild = GuildId::new(77);

        let updated = update_config(&configs, &store, guild, |c| {
            c.enabled = true;
            c.max_messages = 5;
        })
        .await
        .unwrap();
        assert!(updated.enabled);

        let reloaded = load_configs(&store).unwrap();
        let cfg = config_for(&reloaded, guild).await;
        assert!(cfg.enabled);
        assert_eq!(cfg.max_messages, 5);

        let other = config_for(&reloaded, GuildId::new(78)).await;
        assert_eq!(other, AntiSpamConfig::default());
    }
}
