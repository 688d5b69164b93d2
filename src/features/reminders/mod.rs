//! # Reminders Feature
//!
//! Recurring devotional reminders: the catalog of reminder texts, the subscription
//! model and the scheduler that delivers due subscriptions.
//!
//! - **Version**: 2.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.1.0: On-demand istighfar for a named sin
//! - 2.0.0: Recurring interval subscriptions with a fixed reminder catalog
//! - 1.0.0: One-shot reminders

pub mod catalog;
pub mod istighfar;
pub mod scheduler;
pub mod subscription;

pub use catalog::{ReminderCatalog, ReminderType};
pub use istighfar::{istighfar_for, parse_custom_sin, CommonSin};
pub use scheduler::{ReminderScheduler, TickReport};
pub use subscription::{
    format_interval, is_preset_interval, next_due_after, parse_custom_interval, Subscription,
    PRESET_INTERVALS,
};
