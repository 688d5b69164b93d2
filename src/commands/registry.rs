//! Command handler registry
//!
//! - **Version**: 1.0.0
//! - **Since**: 3.38.0

use std::collections::HashMap;
use std::sync::Arc;

use super::handler::SlashCommandHandler;

/// Maps slash command names to the handler that owns them
#[derive(Clone, Default)]
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Arc<dyn SlashCommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of handlers
    pub fn with_handlers(handlers: Vec<Arc<dyn SlashCommandHandler>>) -> Self {
        let mut registry = Self::new();
        for handler in handlers {
            registry.register(handler);
        }
        registry
    }

    /// Register a handler under every name it declares
    pub fn register(&mut self, handler: Arc<dyn SlashCommandHandler>) {
        for name in handler.command_names() {
            self.handlers.insert(name, Arc::clone(&handler));
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SlashCommandHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Number of registered command names (not handlers)
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
