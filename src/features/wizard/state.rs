//! Wizard states and step outcomes

use crate::features::reminders::ReminderType;

/// Where a user currently is in the configuration dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardState {
    /// No session; only the entry command does anything useful
    #[default]
    AwaitingEntry,
    MainMenu,
    ChoosingType,
    ChoosingInterval {
        reminder_type: ReminderType,
        /// Set once the user asked to type a custom number of minutes
        awaiting_custom: bool,
    },
    ViewingSubscriptions,
    /// Waiting for the user to type a sin for an on-demand istighfar
    AwaitingSin,
}

impl WizardState {
    pub fn pending_type(&self) -> Option<ReminderType> {
        match self {
            WizardState::ChoosingInterval { reminder_type, .. } => Some(*reminder_type),
            _ => None,
        }
    }

    pub fn is_awaiting_text(&self) -> bool {
        matches!(
            self,
            WizardState::ChoosingInterval {
                awaiting_custom: true,
                ..
            } | WizardState::AwaitingSin
        )
    }
}

impl std::fmt::Display for WizardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WizardState::AwaitingEntry => write!(f, "awaiting_entry"),
            WizardState::MainMenu => write!(f, "main_menu"),
            WizardState::ChoosingType => write!(f, "choosing_type"),
            WizardState::ChoosingInterval {
                reminder_type,
                awaiting_custom,
            } => {
                if *awaiting_custom {
                    write!(f, "choosing_interval({reminder_type}, custom)")
                } else {
                    write!(f, "choosing_interval({reminder_type})")
                }
            }
            WizardState::ViewingSubscriptions => write!(f, "viewing_subscriptions"),
            WizardState::AwaitingSin => write!(f, "awaiting_sin"),
        }
    }
}

/// Result of a single wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The dialogue goes on
    Continue,
    /// A subscription was saved, or everything was removed
    Completed,
    /// The user abandoned the dialogue
    Cancelled,
    /// Nothing left to show; the user has to start over
    ImplicitEnd,
}

impl StepOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StepOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_type_only_while_choosing_interval() {
        assert_eq!(WizardState::MainMenu.pending_type(), None);
        let state = WizardState::ChoosingInterval {
            reminder_type: ReminderType::Hawqala,
            awaiting_custom: false,
        };
        assert_eq!(state.pending_type(), Some(ReminderType::Hawqala));
        assert!(!state.is_awaiting_text());
    }

    #[test]
    fn test_terminal_outcomes() {
        assert!(!StepOutcome::Continue.is_terminal());
        assert!(StepOutcome::Completed.is_terminal());
        assert!(StepOutcome::Cancelled.is_terminal());
        assert!(StepOutcome::ImplicitEnd.is_terminal());
    }

    #[test]
    fn test_display() {
        let state = WizardState::ChoosingInterval {
            reminder_type: ReminderType::Tasbih,
            awaiting_custom: true,
        };
        assert_eq!(state.to_string(), "choosing_interval(tasbih, custom)");
        assert_eq!(WizardState::default().to_string(), "awaiting_entry");
        assert_eq!(WizardState::AwaitingSin.to_string(), "awaiting_sin");
    }

    #[test]
    fn test_sin_entry_awaits_text() {
        assert!(WizardState::AwaitingSin.is_awaiting_text());
        assert_eq!(WizardState::AwaitingSin.pending_type(), None);
    }
}
