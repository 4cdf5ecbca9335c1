use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;
use serenity::builder::{CreateEmbed, CreateMessage};

use super::{Reminder, ReminderBook};
use crate::store::{DocumentStore, REMINDERS};
use crate::Error;

pub const TICK_INTERVAL: Duration = Duration::from_secs(30);

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, reminder: &Reminder) -> Result<(), Error>;
}

/// Delivers reminders as direct messages.
pub struct DirectMessage {
    http: Arc<serenity::Http>,
}

impl DirectMessage {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

fn reminder_embed(reminder: &Reminder) -> CreateEmbed {
    let mut description = reminder.message.clone();
    if reminder.creator_id != reminder.recipient() {
        description.push_str(&format!("\n\nSet for you by <@{}>", reminder.creator_id));
    }
    if let Some(ref link) = reminder.original_message {
        description.push_str(&format!("\n[Jump to where it was set]({link})"));
    }

    let mut embed = CreateEmbed::new()
        .title("⏰ Reminder")
        .description(description)
        .color(0x5865F2);

    if let Ok(ts) = serenity::Timestamp::from_unix_timestamp(reminder.fire_time.timestamp()) {
        embed = embed.timestamp(ts);
    }
    embed
}

#[async_trait]
impl Notifier for DirectMessage {
    async fn deliver(&self, reminder: &Reminder) -> Result<(), Error> {
        reminder
            .recipient()
            .direct_message(&*self.http, CreateMessage::new().embed(reminder_embed(reminder)))
            .await?;
        Ok(())
    }
}

/// Fires every reminder due at `now`. A reminder that cannot be delivered
/// (closed DMs, unknown user) is still deleted. Returns how many fired.
pub async fn tick<N: Notifier + ?Sized>(
    book: &ReminderBook,
    store: &DocumentStore,
    notifier: &N,
    now: DateTime<Utc>,
) -> usize {
    let due = super::take_due(book, now).await;

    for reminder in &due {
        if let Err(e) = notifier.deliver(reminder).await {
            tracing::warn!(
                "could not deliver reminder {} to {}: {e}",
                reminder.id,
                reminder.recipient()
            );
        }
        if let Err(e) = store.delete(REMINDERS, &reminder.id) {
            tracing::error!("could not delete fired reminder {}: {e}", reminder.id);
        }
    }

    due.len()
}

pub fn spawn<N: Notifier + 'static>(book: ReminderBook, store: Arc<DocumentStore>, notifier: N) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        loop {
            interval.tick().await;
            let fired = tick(&book, &store, &notifier, Utc::now()).await;
            if fired > 0 {
                tracing::info!("fired {fired} reminders");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::tests::reminder;
    use crate::reminder::{add, load, new_reminder_book};
    use chrono::Duration;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        delivered: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for Recorder {
        async fn deliver(&self, reminder: &Reminder) -> Result<(), Error> {
            self.delivered.lock().unwrap().push(reminder.id.clone());
            if self.fail {
                return Err("Cannot send messages to this user".into());
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_due_reminder_fires_and_future_is_kept() {
        let store = DocumentStore::open_in_memory().unwrap();
        let book = new_reminder_book();
        let now = Utc::now();

        add(&book, &store, reminder("due", 1, now - Duration::seconds(1)))
            .await
            .unwrap();
        add(&book, &store, reminder("later", 1, now + Duration::seconds(1000)))
            .await
            .unwrap();

        let recorder = Recorder::default();
        let fired = tick(&book, &store, &recorder, now).await;

        assert_eq!(fired, 1);
        assert_eq!(*recorder.delivered.lock().unwrap(), vec!["due".to_string()]);

        let in_memory = book.read().await;
        assert_eq!(in_memory.len(), 1);
        assert_eq!(in_memory[0].id, "later");

        let persisted = load(&store).unwrap();
        let persisted = persisted.read().await;
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].id, "later");
    }

    #[tokio::test]
    async fn test_failed_delivery_still_deletes() {
        let store = DocumentStore::open_in_memory().unwrap();
        let book = new_reminder_book();
        let now = Utc::now();

        add(&book, &store, reminder("closed-dms", 1, now - Duration::minutes(5)))
            .await
            .unwrap();

        let recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let fired = tick(&book, &store, &recorder, now).await;

        assert_eq!(fired, 1);
        assert!(book.read().await.is_empty());
        assert!(load(&store).unwrap().read().await.is_empty());
    }

    #[tokio::test]
    async fn test_overdue_reminder_loaded_from_store_fires_once() {
        let store = DocumentStore::open_in_memory().unwrap();
        let now = Utc::now();
        {
            let earlier = new_reminder_book();
            add(&earlier, &store, reminder("missed", 1, now - Duration::hours(3)))
                .await
                .unwrap();
        }

        let book = load(&store).unwrap();
        let recorder = Recorder::default();
        assert_eq!(tick(&book, &store, &recorder, now).await, 1);
        assert_eq!(tick(&book, &store, &recorder, now).await, 0);
        assert_eq!(recorder.delivered.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_reminder_embed_builds() {
        let mut r = reminder("x", 1, Utc::now());
        r.target_id = Some(serenity::UserId::new(2));
        r.original_message = Some("https://discord.com/channels/1/2/3".into());
        let _ = reminder_embed(&r);
    }
}
