//! # Features
//!
//! - `reminders`: reminder catalog, subscription model and delivery scheduler
//! - `wizard`: configuration dialogue for managing subscriptions

pub mod reminders;
pub mod wizard;

pub use reminders::{ReminderCatalog, ReminderScheduler, ReminderType, Subscription, TickReport};
pub use wizard::ConfigurationWizard;
