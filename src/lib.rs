// Core layer - configuration and error types
pub mod core;

// Storage layer - subscription store
pub mod database;

// Features layer - reminders and the configuration wizard
pub mod features;

// Transport boundary - sending to and receiving from the chat platform
pub mod transport;

// Presentation - button rendering and routing
pub mod message_components;

// Application layer
pub mod commands;

pub use crate::core::Config;
pub use database::Database;
pub use features::{ConfigurationWizard, ReminderCatalog, ReminderScheduler};
