//! Shared context for command handlers
//!
//! - **Version**: 2.0.0
//! - **Since**: 3.38.0
//!
//! ## Changelog
//! - 2.0.0: Reduced to the configuration wizard
//! - 1.0.0: Initial implementation with core shared state

use std::sync::Arc;

use crate::features::wizard::ConfigurationWizard;

/// State every slash command handler can reach
#[derive(Clone)]
pub struct CommandContext {
    pub wizard: Arc<ConfigurationWizard>,
}

impl CommandContext {
    pub fn new(wizard: Arc<ConfigurationWizard>) -> Self {
        Self { wizard }
    }
}
