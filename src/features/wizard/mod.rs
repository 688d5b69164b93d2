//! # Configuration Wizard Feature
//!
//! Multi-step dialogue for adding, listing and removing reminder subscriptions, plus
//! the short on-demand istighfar flow.
//! Per-user progress lives in memory only and is lost on restart.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod actions;
pub mod machine;
pub mod session;
pub mod state;

/// Slash command that opens the main menu
pub const ENTRY_COMMAND: &str = "adhkar";
/// Slash command that removes every subscription of the caller
pub const UNSUBSCRIBE_COMMAND: &str = "adhkar_stop";
/// Slash command that abandons a configuration in progress
pub const CANCEL_COMMAND: &str = "adhkar_cancel";
/// Slash command that offers an istighfar for a chosen sin
pub const ISTIGHFAR_COMMAND: &str = "istighfar";

/// Shown when a wizard step fails on storage
pub const STEP_FAILED_MESSAGE: &str =
    "⚠️ Something went wrong while saving your reminders. Please try again in a moment.";

pub use actions::{ButtonKind, MenuAction, MenuButton, WizardReply};
pub use machine::ConfigurationWizard;
pub use session::SessionStore;
pub use state::{StepOutcome, WizardState};
