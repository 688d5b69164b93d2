//! Error taxonomy for the reminder engine
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use std::time::Duration;

use crate::features::reminders::ReminderType;

/// Errors raised by the subscription store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The row vanished between a scan and the follow-up write
    #[error("no {reminder_type} subscription for user {user_id}")]
    NotFound {
        user_id: String,
        reminder_type: ReminderType,
    },

    /// The persistence layer rejected the statement
    #[error("storage error: {0}")]
    Storage(#[from] sqlite::Error),

    /// A stored row could not be decoded
    #[error("corrupt subscription row: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Rejected custom interval input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntervalError {
    #[error("'{0}' is not a whole number of minutes")]
    NotANumber(String),

    #[error("the interval must be at least 1 minute")]
    NotPositive,

    #[error("the interval may not exceed {max} minutes")]
    TooLarge { max: u32 },
}

/// Rejected free-text sin for an on-demand istighfar
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinError {
    #[error("please write the sin you want to seek forgiveness for")]
    Empty,

    #[error("please keep it under {max} characters")]
    TooLong { max: usize },
}

/// A single failed delivery attempt
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("send to {user_id} failed: {source}")]
    Failed {
        user_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("send to {user_id} timed out after {timeout:?}")]
    TimedOut { user_id: String, timeout: Duration },
}
