//! # Subscription Store
//!
//! SQLite persistence for reminder subscriptions, keyed by `(user_id, reminder_type)`.
//! Every operation runs a single statement under the connection lock, so a due-scan
//! never observes a half-written row. Scans skip rows that no longer decode (for
//! example a reminder type removed from the catalog) and log them instead of failing.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, info, warn};
use sqlite::{Connection, State, Statement};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core::StoreError;
use crate::features::reminders::{ReminderType, Subscription};

/// Storage format for timestamps (UTC, sortable as text)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

type StoreResult<T> = Result<T, StoreError>;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS subscriptions (
        user_id TEXT NOT NULL,
        reminder_type TEXT NOT NULL,
        interval_minutes INTEGER NOT NULL CHECK (interval_minutes > 0),
        next_due_at TEXT NOT NULL,
        PRIMARY KEY (user_id, reminder_type)
    );
    CREATE INDEX IF NOT EXISTS idx_subscriptions_next_due_at
        ON subscriptions (next_due_at);
";

const SELECT_COLUMNS: &str = "SELECT user_id, reminder_type, interval_minutes, next_due_at FROM subscriptions";

#[derive(Clone)]
pub struct Database {
    connection: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database at `path` and apply the schema
    pub async fn new(path: &str) -> StoreResult<Self> {
        let connection = sqlite::open(path)?;
        connection.execute(SCHEMA)?;
        info!("Subscription store ready at {path}");
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Throwaway store for tests and dry runs
    pub async fn in_memory() -> StoreResult<Self> {
        Self::new(":memory:").await
    }

    /// Insert or replace the subscription for `(user_id, reminder_type)`
    pub async fn upsert(
        &self,
        user_id: &str,
        reminder_type: ReminderType,
        interval_minutes: u32,
        next_due_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let conn = self.connection.lock().await;
        let mut stmt = conn.prepare(
            "INSERT OR REPLACE INTO subscriptions (user_id, reminder_type, interval_minutes, next_due_at)
             VALUES (?, ?, ?, ?)",
        )?;
        stmt.bind((1, user_id))?;
        stmt.bind((2, reminder_type.as_str()))?;
        stmt.bind((3, i64::from(interval_minutes)))?;
        stmt.bind((4, format_timestamp(next_due_at).as_str()))?;
        stmt.next()?;

        debug!(
            "Upserted {reminder_type} every {interval_minutes}m for user {user_id} (next due {next_due_at})"
        );
        Ok(())
    }

    /// All subscriptions of one user, ordered by reminder type key
    pub async fn list_for_user(&self, user_id: &str) -> StoreResult<Vec<Subscription>> {
        let conn = self.connection.lock().await;
        let mut stmt = conn.prepare(format!(
            "{SELECT_COLUMNS} WHERE user_id = ? ORDER BY reminder_type"
        ))?;
        stmt.bind((1, user_id))?;
        read_subscriptions(&mut stmt)
    }

    /// A single subscription, if it still exists
    pub async fn get(
        &self,
        user_id: &str,
        reminder_type: ReminderType,
    ) -> StoreResult<Option<Subscription>> {
        let conn = self.connection.lock().await;
        let mut stmt = conn.prepare(format!(
            "{SELECT_COLUMNS} WHERE user_id = ? AND reminder_type = ?"
        ))?;
        stmt.bind((1, user_id))?;
        stmt.bind((2, reminder_type.as_str()))?;
        match stmt.next()? {
            State::Row => decode_row(&stmt).map(Some),
            State::Done => Ok(None),
        }
    }

    /// Remove one subscription; returns false if there was nothing to remove
    pub async fn delete(&self, user_id: &str, reminder_type: ReminderType) -> StoreResult<bool> {
        let conn = self.connection.lock().await;
        let mut stmt =
            conn.prepare("DELETE FROM subscriptions WHERE user_id = ? AND reminder_type = ?")?;
        stmt.bind((1, user_id))?;
        stmt.bind((2, reminder_type.as_str()))?;
        stmt.next()?;
        drop(stmt);

        let removed = conn.change_count() > 0;
        debug!("Delete {reminder_type} for user {user_id}: removed={removed}");
        Ok(removed)
    }

    /// Remove every subscription of a user; returns how many rows went away
    pub async fn delete_all(&self, user_id: &str) -> StoreResult<usize> {
        let conn = self.connection.lock().await;
        let mut stmt = conn.prepare("DELETE FROM subscriptions WHERE user_id = ?")?;
        stmt.bind((1, user_id))?;
        stmt.next()?;
        drop(stmt);

        let removed = conn.change_count();
        debug!("Deleted {removed} subscriptions for user {user_id}");
        Ok(removed)
    }

    /// Subscriptions with `next_due_at <= as_of`, oldest first
    pub async fn due(&self, as_of: DateTime<Utc>) -> StoreResult<Vec<Subscription>> {
        let conn = self.connection.lock().await;
        let mut stmt = conn.prepare(format!(
            "{SELECT_COLUMNS} WHERE next_due_at <= ? ORDER BY next_due_at, user_id, reminder_type"
        ))?;
        stmt.bind((1, format_timestamp(as_of).as_str()))?;
        read_subscriptions(&mut stmt)
    }

    /// Move the schedule of an existing subscription
    pub async fn advance(
        &self,
        user_id: &str,
        reminder_type: ReminderType,
        new_next_due_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let conn = self.connection.lock().await;
        let mut stmt = conn.prepare(
            "UPDATE subscriptions SET next_due_at = ? WHERE user_id = ? AND reminder_type = ?",
        )?;
        stmt.bind((1, format_timestamp(new_next_due_at).as_str()))?;
        stmt.bind((2, user_id))?;
        stmt.bind((3, reminder_type.as_str()))?;
        stmt.next()?;
        drop(stmt);

        if conn.change_count() == 0 {
            return Err(StoreError::NotFound {
                user_id: user_id.to_string(),
                reminder_type,
            });
        }
        Ok(())
    }

    /// Total number of stored subscriptions
    pub async fn count(&self) -> StoreResult<usize> {
        let conn = self.connection.lock().await;
        let mut stmt = conn.prepare("SELECT COUNT(*) AS total FROM subscriptions")?;
        let mut total = 0;
        if let State::Row = stmt.next()? {
            total = stmt.read::<i64, _>("total")?;
        }
        Ok(usize::try_from(total).unwrap_or(0))
    }

    /// Run arbitrary SQL against the store, used to damage it in tests
    #[cfg(test)]
    pub(crate) async fn execute_raw(&self, sql: &str) -> StoreResult<()> {
        self.connection.lock().await.execute(sql)?;
        Ok(())
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
        .ok()
}

fn read_subscriptions(stmt: &mut Statement<'_>) -> StoreResult<Vec<Subscription>> {
    let mut subscriptions = Vec::new();
    while let State::Row = stmt.next()? {
        match decode_row(stmt) {
            Ok(subscription) => subscriptions.push(subscription),
            Err(StoreError::Corrupt(reason)) => {
                warn!("Skipping unreadable subscription row: {reason}");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(subscriptions)
}

fn decode_row(stmt: &Statement<'_>) -> StoreResult<Subscription> {
    let unreadable = |e: sqlite::Error| StoreError::Corrupt(e.to_string());
    let user_id = stmt.read::<String, _>("user_id").map_err(unreadable)?;
    let raw_type = stmt.read::<String, _>("reminder_type").map_err(unreadable)?;
    let raw_interval = stmt.read::<i64, _>("interval_minutes").map_err(unreadable)?;
    let raw_due = stmt.read::<String, _>("next_due_at").map_err(unreadable)?;

    let corrupt = |what: String| StoreError::Corrupt(format!("user {user_id}: {what}"));
    let reminder_type = raw_type
        .parse::<ReminderType>()
        .map_err(|_| corrupt(format!("unknown reminder type '{raw_type}'")))?;
    let interval_minutes = u32::try_from(raw_interval)
        .ok()
        .filter(|m| *m > 0)
        .ok_or_else(|| corrupt(format!("bad interval {raw_interval}")))?;
    let next_due_at = parse_timestamp(&raw_due)
        .ok_or_else(|| corrupt(format!("bad timestamp '{raw_due}'")))?;

    Ok(Subscription {
        user_id,
        reminder_type,
        interval_minutes,
        next_due_at,
    })
}
