pub mod duration;
pub mod scheduler;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serenity::model::id::{ChannelId, UserId};
use tokio::sync::RwLock;

use crate::store::{DocumentStore, StoreError, REMINDERS};

/// Reminders a single user may have pending at once.
pub const MAX_PER_USER: usize = 25;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Reminder {
    pub id: String,
    /// Who the reminder is for.
    pub user_id: UserId,
    pub creator_id: UserId,
    pub channel_id: ChannelId,
    /// Set when the reminder was created for someone other than the creator.
    pub target_id: Option<UserId>,
    pub message: String,
    pub fire_time: DateTime<Utc>,
    /// Link to the message that created the reminder.
    pub original_message: Option<String>,
}

impl Reminder {
    pub fn recipient(&self) -> UserId {
        self.target_id.unwrap_or(self.user_id)
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.fire_time <= now
    }

    /// Whether `user` created the reminder or receives it.
    pub fn involves(&self, user: UserId) -> bool {
        self.creator_id == user || self.recipient() == user
    }
}

pub fn reminder_id(creator_id: UserId, created_at: DateTime<Utc>) -> String {
    format!("{creator_id}-{}", created_at.timestamp_micros())
}

pub type ReminderBook = Arc<RwLock<Vec<Reminder>>>;

pub fn new_reminder_book() -> ReminderBook {
    Arc::new(RwLock::new(Vec::new()))
}

pub fn load(store: &DocumentStore) -> Result<ReminderBook, StoreError> {
    let reminders: Vec<Reminder> = store
        .list::<Reminder>(REMINDERS)?
        .into_iter()
        .map(|(_, r)| r)
        .collect();
    tracing::info!("loaded {} reminders", reminders.len());
    Ok(Arc::new(RwLock::new(reminders)))
}

/// Persists the reminder, then makes it visible to the scheduler.
pub async fn add(
    book: &ReminderBook,
    store: &DocumentStore,
    reminder: Reminder,
) -> Result<(), StoreError> {
    store.set(REMINDERS, &reminder.id, &reminder)?;
    book.write().await.push(reminder);
    Ok(())
}

pub async fn remove(
    book: &ReminderBook,
    store: &DocumentStore,
    id: &str,
) -> Result<Option<Reminder>, StoreError> {
    let removed = {
        let mut book = book.write().await;
        book.iter()
            .position(|r| r.id == id)
            .map(|index| book.remove(index))
    };

    if removed.is_some() {
        store.delete(REMINDERS, id)?;
    }
    Ok(removed)
}

/// Pending reminders involving `user`, soonest first.
pub async fn list_for(book: &ReminderBook, user: UserId) -> Vec<Reminder> {
    let book = book.read().await;
    let mut reminders: Vec<Reminder> = book
        .iter()
        .filter(|r| r.involves(user))
        .cloned()
        .collect();
    reminders.sort_by_key(|r| r.fire_time);
    reminders
}

pub async fn count_created_by(book: &ReminderBook, user: UserId) -> usize {
    let book = book.read().await;
    book.iter().filter(|r| r.creator_id == user).count()
}

/// Removes and returns every reminder due at `now`.
pub async fn take_due(book: &ReminderBook, now: DateTime<Utc>) -> Vec<Reminder> {
    let mut book = book.write().await;
    let (due, pending): (Vec<Reminder>, Vec<Reminder>) =
        book.drain(..).partition(|r| r.is_due(now));
    *book = pending;
    due
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;

    pub(crate) fn reminder(id: &str, user: u64, fire_time: DateTime<Utc>) -> Reminder {
        Reminder {
            id: id.to_string(),
            user_id: UserId::new(user),
            creator_id: UserId::new(user),
            channel_id: ChannelId::new(1),
            target_id: None,
            message: format!("reminder {id}"),
            fire_time,
            original_message: None,
        }
    }

    #[test]
    fn test_recipient_prefers_target() {
        let mut r = reminder("a", 1, Utc::now());
        assert_eq!(r.recipient(), UserId::new(1));
        r.target_id = Some(UserId::new(2));
        assert_eq!(r.recipient(), UserId::new(2));
        assert!(r.involves(UserId::new(1)));
        assert!(r.involves(UserId::new(2)));
        assert!(!r.involves(UserId::new(3)));
    }

    #[tokio::test]
    async fn test_take_due_splits_by_time() {
        let book = new_reminder_book();
        let now = Utc::now();
        {
            let mut book = book.write().await;
            book.push(reminder("past", 1, now - Duration::seconds(1)));
            book.push(reminder("future", 1, now + Duration::seconds(1000)));
            book.push(reminder("exact", 2, now));
        }

        let due = take_due(&book, now).await;
        let ids: Vec<&str> = due.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["past", "exact"]);

        let remaining = book.read().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "future");
    }

    #[tokio::test]
    async fn test_add_remove_persist() {
        let store = DocumentStore::open_in_memory().unwrap();
        let book = new_reminder_book();
        let now = Utc::now();

        add(&book, &store, reminder("r1", 1, now + Duration::hours(1)))
            .await
            .unwrap();
        add(&book, &store, reminder("r2", 1, now + Duration::hours(2)))
            .await
            .unwrap();

        let reloaded = load(&store).unwrap();
        assert_eq!(reloaded.read().await.len(), 2);

        let removed = remove(&book, &store, "r1").await.unwrap();
        assert_eq!(removed.unwrap().id, "r1");
        assert!(remove(&book, &store, "r1").await.unwrap().is_none());

        let reloaded = load(&store).unwrap();
        let reloaded = reloaded.read().await;
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].id, "r2");
    }

    #[tokio::test]
    async fn test_list_for_sorted_and_filtered() {
        let book = new_reminder_book();
        let now = Utc::now();
        {
            let mut book = book.write().await;
            book.push(reminder("late", 1, now + Duration::hours(5)));
            book.push(reminder("other", 2, now + Duration::hours(1)));
            book.push(reminder("soon", 1, now + Duration::minutes(5)));
        }

        let listed = list_for(&book, UserId::new(1)).await;
        let ids: Vec<&str> = listed.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["soon", "late"]);
        assert_eq!(count_created_by(&book, UserId::new(2)).await, 1);
    }

    #[test]
    fn test_reminder_id_format() {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(reminder_id(UserId::new(42), at), "42-1700000000000000");
    }
}
