//! # Command System
//!
//! Slash command (/) handling for Discord interactions.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.0.0: Reminder subscription commands driving the configuration wizard
//! - 2.1.0: Add modular handler infrastructure (handler trait, context, registry)
//! - 1.0.0: Initial reorganization with modular command structure

pub mod context;
pub mod handler;
pub mod handlers;
pub mod registry;
pub mod slash;

pub use context::CommandContext;
pub use handler::SlashCommandHandler;
pub use handlers::create_all_handlers;
pub use registry::CommandRegistry;
pub use slash::{create_slash_commands, register_global_commands, register_guild_commands};
