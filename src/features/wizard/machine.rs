//! # Configuration Wizard
//!
//! Finite-state dialogue that turns menu taps and typed input into stored
//! subscriptions. The state machine is transport-agnostic: it consumes
//! [`UserEvent`]s and produces [`WizardReply`]s for the dispatch layer to render.

use chrono::{DateTime, Utc};
use log::{debug, error, info};

use super::actions::{MenuAction, MenuButton, WizardReply};
use super::session::SessionStore;
use super::state::{StepOutcome, WizardState};
use super::{ENTRY_COMMAND, STEP_FAILED_MESSAGE};
use crate::core::StoreError;
use crate::database::Database;
use crate::features::reminders::{
    format_interval, istighfar_for, next_due_after, parse_custom_interval, parse_custom_sin,
    CommonSin, ReminderType, PRESET_INTERVALS,
};
use crate::transport::{UserEvent, WizardCommand};

type StepResult<T> = Result<T, StoreError>;

pub struct ConfigurationWizard {
    database: Database,
    sessions: SessionStore,
    max_custom_interval_minutes: u32,
}

impl ConfigurationWizard {
    pub fn new(database: Database, max_custom_interval_minutes: u32) -> Self {
        Self {
            database,
            sessions: SessionStore::new(),
            max_custom_interval_minutes,
        }
    }

    /// Current dialogue state of a user
    pub fn state_of(&self, user_id: &str) -> WizardState {
        self.sessions.state(user_id)
    }

    /// Number of users with a dialogue in progress
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Process one user event. `Ok(None)` means the event is not for the wizard.
    pub async fn handle(&self, user_id: &str, event: UserEvent) -> StepResult<Option<WizardReply>> {
        self.handle_at(user_id, event, Utc::now()).await
    }

    /// Like [`handle`](Self::handle), but a failed step becomes an apology reply.
    /// The session is left as it was so the user can retry the same step.
    pub async fn respond(&self, user_id: &str, event: UserEvent) -> Option<WizardReply> {
        match self.handle(user_id, event).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Wizard step failed for user {user_id}: {e}");
                Some(
                    WizardReply::text(STEP_FAILED_MESSAGE, StepOutcome::Continue)
                        .with_row(vec![back_button()]),
                )
            }
        }
    }

    /// Same as [`handle`](Self::handle) with an explicit clock reading
    pub async fn handle_at(
        &self,
        user_id: &str,
        event: UserEvent,
        now: DateTime<Utc>,
    ) -> StepResult<Option<WizardReply>> {
        match event {
            UserEvent::Command(WizardCommand::Start) => {
                self.sessions.set(user_id, WizardState::MainMenu);
                Ok(Some(main_menu(None)))
            }
            UserEvent::Command(WizardCommand::UnsubscribeAll) => {
                self.unsubscribe_all(user_id).await.map(Some)
            }
            UserEvent::Command(WizardCommand::Cancel) => Ok(Some(self.cancel(user_id))),
            UserEvent::Command(WizardCommand::Istighfar) => {
                self.sessions.clear(user_id);
                Ok(Some(istighfar_menu()))
            }
            UserEvent::Text(input) => self.handle_text(user_id, &input, now).await,
            UserEvent::Tap(tag) => match MenuAction::parse(&tag) {
                Some(action) => self.handle_action(user_id, action, now).await.map(Some),
                None => {
                    debug!("Unknown wizard tag '{tag}' from user {user_id}");
                    Ok(Some(self.restart(user_id)))
                }
            },
        }
    }

    async fn handle_action(
        &self,
        user_id: &str,
        action: MenuAction,
        now: DateTime<Utc>,
    ) -> StepResult<WizardReply> {
        let state = self.sessions.state(user_id);

        match (action, state) {
            // Navigation works from anywhere, including a stale menu after a restart
            (MenuAction::Add, _) => {
                self.sessions.set(user_id, WizardState::ChoosingType);
                Ok(type_menu())
            }
            (MenuAction::List, _) => self.show_subscriptions(user_id).await,
            (MenuAction::MainMenu, _) => {
                self.sessions.set(user_id, WizardState::MainMenu);
                Ok(main_menu(None))
            }
            (MenuAction::UnsubscribeAll, _) => self.unsubscribe_all(user_id).await,
            (MenuAction::SinMenu, _) => {
                self.sessions.clear(user_id);
                Ok(sin_menu())
            }
            (MenuAction::Sin(sin), _) => Ok(self.forgive(user_id, sin.name())),
            (MenuAction::CustomSin, _) => {
                self.sessions.set(user_id, WizardState::AwaitingSin);
                Ok(sin_prompt(None))
            }

            (MenuAction::ChooseType(reminder_type), WizardState::ChoosingType) => {
                self.sessions.set(
                    user_id,
                    WizardState::ChoosingInterval {
                        reminder_type,
                        awaiting_custom: false,
                    },
                );
                Ok(interval_menu(reminder_type))
            }
            (MenuAction::ChooseInterval(minutes), WizardState::ChoosingInterval { reminder_type, .. }) => {
                self.complete(user_id, reminder_type, minutes, now).await
            }
            (MenuAction::CustomInterval, WizardState::ChoosingInterval { reminder_type, .. }) => {
                self.sessions.set(
                    user_id,
                    WizardState::ChoosingInterval {
                        reminder_type,
                        awaiting_custom: true,
                    },
                );
                Ok(self.custom_prompt(None))
            }
            (MenuAction::Remove(reminder_type), WizardState::ViewingSubscriptions) => {
                self.remove(user_id, reminder_type).await
            }

            (action, state) => {
                debug!("Out-of-sequence {action:?} in state {state} for user {user_id}");
                Ok(self.restart(user_id))
            }
        }
    }

    async fn handle_text(
        &self,
        user_id: &str,
        input: &str,
        now: DateTime<Utc>,
    ) -> StepResult<Option<WizardReply>> {
        let reminder_type = match self.sessions.state(user_id) {
            WizardState::ChoosingInterval {
                reminder_type,
                awaiting_custom: true,
            } => reminder_type,
            WizardState::AwaitingSin => {
                return Ok(Some(match parse_custom_sin(input) {
                    Ok(sin) => self.forgive(user_id, &sin),
                    Err(e) => sin_prompt(Some(&e.to_string())),
                }));
            }
            _ => return Ok(None),
        };

        match parse_custom_interval(input, self.max_custom_interval_minutes) {
            Ok(minutes) => self.complete(user_id, reminder_type, minutes, now).await.map(Some),
            Err(e) => {
                debug!("Rejected custom interval from user {user_id}: {e}");
                Ok(Some(self.custom_prompt(Some(&e.to_string()))))
            }
        }
    }

    fn forgive(&self, user_id: &str, sin: &str) -> WizardReply {
        self.sessions.clear(user_id);
        WizardReply::text(istighfar_for(sin), StepOutcome::Completed)
            .with_row(vec![MenuButton::new("🤲 Another sin", MenuAction::SinMenu)])
    }

    async fn complete(
        &self,
        user_id: &str,
        reminder_type: ReminderType,
        interval_minutes: u32,
        now: DateTime<Utc>,
    ) -> StepResult<WizardReply> {
        let next_due_at = next_due_after(now, interval_minutes);
        self.database
            .upsert(user_id, reminder_type, interval_minutes, next_due_at)
            .await?;
        self.sessions.clear(user_id);

        info!(
            "User {user_id} subscribed to {reminder_type} every {interval_minutes}m (first at {next_due_at})"
        );

        Ok(WizardReply::text(
            format!(
                "✅ Done! I'll remind you of **{}** every {}.\nFirst reminder <t:{}:R>.",
                reminder_type.label(),
                format_interval(interval_minutes),
                next_due_at.timestamp()
            ),
            StepOutcome::Completed,
        )
        .with_buttons(vec![
            MenuButton::new("➕ Add another", MenuAction::Add),
            MenuButton::new("📋 My reminders", MenuAction::List),
        ]))
    }

    async fn show_subscriptions(&self, user_id: &str) -> StepResult<WizardReply> {
        let subscriptions = self.database.list_for_user(user_id).await?;

        if subscriptions.is_empty() {
            self.sessions.clear(user_id);
            return Ok(WizardReply::text(
                format!(
                    "📭 You don't have any reminders yet.\n\nUse `/{ENTRY_COMMAND}` to start over and add one."
                ),
                StepOutcome::ImplicitEnd,
            ));
        }

        self.sessions.set(user_id, WizardState::ViewingSubscriptions);

        let mut text = String::from("📋 **Your reminders:**\n\n");
        for sub in &subscriptions {
            text.push_str(&format!(
                "• **{}** every {} (next <t:{}:R>)\n",
                sub.reminder_type.label(),
                format_interval(sub.interval_minutes),
                sub.next_due_at.timestamp()
            ));
        }
        text.push_str("\n*Tap a reminder to remove it.*");

        let buttons = subscriptions
            .iter()
            .map(|sub| {
                MenuButton::danger(
                    format!("🗑️ {}", sub.reminder_type.label()),
                    MenuAction::Remove(sub.reminder_type),
                )
            })
            .collect();

        Ok(WizardReply::text(text, StepOutcome::Continue)
            .with_buttons(buttons)
            .with_row(vec![back_button()]))
    }

    async fn remove(&self, user_id: &str, reminder_type: ReminderType) -> StepResult<WizardReply> {
        let removed = self.database.delete(user_id, reminder_type).await?;
        self.sessions.set(user_id, WizardState::MainMenu);

        let notice = if removed {
            info!("User {user_id} removed their {reminder_type} reminder");
            format!("🗑️ Removed your **{}** reminder.", reminder_type.label())
        } else {
            format!("That **{}** reminder was already gone.", reminder_type.label())
        };
        Ok(main_menu(Some(&notice)))
    }

    async fn unsubscribe_all(&self, user_id: &str) -> StepResult<WizardReply> {
        let removed = self.database.delete_all(user_id).await?;
        self.sessions.clear(user_id);

        let text = if removed == 0 {
            "🔕 You had no reminders. Nothing to remove.".to_string()
        } else {
            info!("User {user_id} unsubscribed from all {removed} reminders");
            format!(
                "🔕 Removed all {} reminder{}. You won't hear from me again unless you use `/{}`.",
                removed,
                if removed == 1 { "" } else { "s" },
                ENTRY_COMMAND
            )
        };
        Ok(WizardReply::text(text, StepOutcome::Completed))
    }

    fn cancel(&self, user_id: &str) -> WizardReply {
        let had_session = self.sessions.has_session(user_id);
        self.sessions.clear(user_id);

        let text = if had_session {
            "👋 Configuration cancelled. Your existing reminders are unchanged."
        } else {
            "Nothing to cancel."
        };
        WizardReply::text(text, StepOutcome::Cancelled)
    }

    /// Send the user back to the main menu after a lost or mismatched session
    fn restart(&self, user_id: &str) -> WizardReply {
        self.sessions.set(user_id, WizardState::MainMenu);
        main_menu(Some("⌛ That menu has expired. Let's start over."))
    }

    fn custom_prompt(&self, problem: Option<&str>) -> WizardReply {
        let range = format!("between 1 and {}", self.max_custom_interval_minutes);
        let text = match problem {
            Some(problem) => format!(
                "❌ {problem}.\nPlease send a whole number of minutes {range}, for example `45`."
            ),
            None => format!(
                "✏️ Send me a direct message with how often I should remind you, in minutes ({range})."
            ),
        };
        WizardReply::text(text, StepOutcome::Continue).with_row(vec![back_button()])
    }
}

fn back_button() -> MenuButton {
    MenuButton::new("⬅️ Back", MenuAction::MainMenu)
}

fn main_menu(notice: Option<&str>) -> WizardReply {
    let mut text = String::new();
    if let Some(notice) = notice {
        text.push_str(notice);
        text.push_str("\n\n");
    }
    text.push_str("🕌 **Adhkar Reminders**\nWhat would you like to do?");

    WizardReply::text(text, StepOutcome::Continue).with_buttons(vec![
        MenuButton::primary("➕ Add reminder", MenuAction::Add),
        MenuButton::new("📋 My reminders", MenuAction::List),
        MenuButton::danger("🔕 Unsubscribe all", MenuAction::UnsubscribeAll),
    ])
}

fn istighfar_menu() -> WizardReply {
    WizardReply::text(
        "🤲 **Istighfar**\nWhich sin would you like to seek forgiveness for?",
        StepOutcome::Continue,
    )
    .with_buttons(vec![
        MenuButton::primary("الذنوب المعتادة", MenuAction::SinMenu),
        MenuButton::new("ذنب مخصص", MenuAction::CustomSin),
    ])
}

fn sin_menu() -> WizardReply {
    let buttons = CommonSin::ALL
        .iter()
        .map(|sin| MenuButton::new(sin.name(), MenuAction::Sin(*sin)))
        .collect();

    WizardReply::text("Choose the sin:", StepOutcome::Continue)
        .with_buttons(buttons)
        .with_row(vec![MenuButton::new("✏️ Another sin", MenuAction::CustomSin)])
}

fn sin_prompt(problem: Option<&str>) -> WizardReply {
    let text = match problem {
        Some(problem) => format!("❌ {problem}."),
        None => "✏️ Send me a direct message naming the sin.".to_string(),
    };
    WizardReply::text(text, StepOutcome::Continue)
        .with_row(vec![MenuButton::new("⬅️ Back", MenuAction::SinMenu)])
}

fn type_menu() -> WizardReply {
    let buttons = ReminderType::ALL
        .iter()
        .map(|t| MenuButton::new(t.label(), MenuAction::ChooseType(*t)))
        .collect();

    WizardReply::text(
        "Which remembrance would you like to be reminded of?",
        StepOutcome::Continue,
    )
    .with_buttons(buttons)
    .with_row(vec![back_button()])
}

fn interval_menu(reminder_type: ReminderType) -> WizardReply {
    let mut buttons: Vec<MenuButton> = PRESET_INTERVALS
        .iter()
        .map(|m| {
            MenuButton::new(
                format!("Every {}", format_interval(*m)),
                MenuAction::ChooseInterval(*m),
            )
        })
        .collect();
    buttons.push(MenuButton::new("✏️ Custom", MenuAction::CustomInterval));

    WizardReply::text(
        format!(
            "How often should I remind you of **{}**?",
            reminder_type.label()
        ),
        StepOutcome::Continue,
    )
    .with_buttons(buttons)
    .with_row(vec![back_button()])
}
