//! # Wizard Menu Actions
//!
//! Button vocabulary of the configuration wizard and its tag encoding. Tags are the
//! opaque strings the transport hands back on a tap (Discord `custom_id`s).

use super::state::StepOutcome;
use crate::features::reminders::{is_preset_interval, CommonSin, ReminderType};

/// Prefix shared by every wizard tag, used for routing
pub const TAG_PREFIX: &str = "rem_";

const ADD: &str = "rem_add";
const LIST: &str = "rem_list";
const MENU: &str = "rem_menu";
const UNSUBSCRIBE_ALL: &str = "rem_unsubscribe_all";
const CUSTOM_INTERVAL: &str = "rem_interval_custom";
const TYPE_PREFIX: &str = "rem_type_";
const INTERVAL_PREFIX: &str = "rem_interval_";
const REMOVE_PREFIX: &str = "rem_remove_";
const SIN_MENU: &str = "rem_sins";
const CUSTOM_SIN: &str = "rem_sin_custom";
const SIN_PREFIX: &str = "rem_sin_";

/// An action a menu button triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Add,
    List,
    MainMenu,
    UnsubscribeAll,
    ChooseType(ReminderType),
    ChooseInterval(u32),
    CustomInterval,
    Remove(ReminderType),
    /// Show the list of common sins
    SinMenu,
    Sin(CommonSin),
    /// Ask the user to type a sin
    CustomSin,
}

impl MenuAction {
    /// Encode into a button tag
    pub fn tag(&self) -> String {
        match self {
            MenuAction::Add => ADD.to_string(),
            MenuAction::List => LIST.to_string(),
            MenuAction::MainMenu => MENU.to_string(),
            MenuAction::UnsubscribeAll => UNSUBSCRIBE_ALL.to_string(),
            MenuAction::ChooseType(t) => format!("{TYPE_PREFIX}{t}"),
            MenuAction::ChooseInterval(m) => format!("{INTERVAL_PREFIX}{m}"),
            MenuAction::CustomInterval => CUSTOM_INTERVAL.to_string(),
            MenuAction::Remove(t) => format!("{REMOVE_PREFIX}{t}"),
            MenuAction::SinMenu => SIN_MENU.to_string(),
            MenuAction::Sin(sin) => format!("{SIN_PREFIX}{sin}"),
            MenuAction::CustomSin => CUSTOM_SIN.to_string(),
        }
    }

    /// Decode a button tag; None for anything not produced by `tag()`
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            ADD => return Some(MenuAction::Add),
            LIST => return Some(MenuAction::List),
            MENU => return Some(MenuAction::MainMenu),
            UNSUBSCRIBE_ALL => return Some(MenuAction::UnsubscribeAll),
            CUSTOM_INTERVAL => return Some(MenuAction::CustomInterval),
            SIN_MENU => return Some(MenuAction::SinMenu),
            CUSTOM_SIN => return Some(MenuAction::CustomSin),
            _ => {}
        }

        if let Some(key) = tag.strip_prefix(TYPE_PREFIX) {
            return key.parse().ok().map(MenuAction::ChooseType);
        }
        if let Some(key) = tag.strip_prefix(REMOVE_PREFIX) {
            return key.parse().ok().map(MenuAction::Remove);
        }
        if let Some(key) = tag.strip_prefix(SIN_PREFIX) {
            return key.parse().ok().map(MenuAction::Sin);
        }
        if let Some(minutes) = tag.strip_prefix(INTERVAL_PREFIX) {
            // Only presets travel as tags, custom values come in as text
            return minutes
                .parse::<u32>()
                .ok()
                .filter(|m| is_preset_interval(*m))
                .map(MenuAction::ChooseInterval);
        }
        None
    }

    /// Whether a tag belongs to the wizard
    pub fn owns(tag: &str) -> bool {
        tag.starts_with(TAG_PREFIX)
    }
}

/// Visual emphasis of a button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    Primary,
    Secondary,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuButton {
    pub label: String,
    pub action: MenuAction,
    pub kind: ButtonKind,
}

impl MenuButton {
    pub fn new(label: impl Into<String>, action: MenuAction) -> Self {
        Self {
            label: label.into(),
            action,
            kind: ButtonKind::Secondary,
        }
    }

    pub fn primary(label: impl Into<String>, action: MenuAction) -> Self {
        Self {
            kind: ButtonKind::Primary,
            ..Self::new(label, action)
        }
    }

    pub fn danger(label: impl Into<String>, action: MenuAction) -> Self {
        Self {
            kind: ButtonKind::Danger,
            ..Self::new(label, action)
        }
    }
}

/// Maximum buttons per keyboard row
pub const ROW_WIDTH: usize = 3;

/// What the wizard wants shown to the user after a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardReply {
    pub text: String,
    pub keyboard: Vec<Vec<MenuButton>>,
    pub outcome: StepOutcome,
}

impl WizardReply {
    pub fn text(text: impl Into<String>, outcome: StepOutcome) -> Self {
        Self {
            text: text.into(),
            keyboard: Vec::new(),
            outcome,
        }
    }

    /// Attach buttons, wrapping them into rows of `ROW_WIDTH`
    pub fn with_buttons(mut self, buttons: Vec<MenuButton>) -> Self {
        let mut row = Vec::new();
        for button in buttons {
            row.push(button);
            if row.len() == ROW_WIDTH {
                self.keyboard.push(std::mem::take(&mut row));
            }
        }
        if !row.is_empty() {
            self.keyboard.push(row);
        }
        self
    }

    /// Attach a row of its own (navigation controls)
    pub fn with_row(mut self, row: Vec<MenuButton>) -> Self {
        if !row.is_empty() {
            self.keyboard.push(row);
        }
        self
    }

    /// Every action reachable from this reply's keyboard
    pub fn actions(&self) -> Vec<MenuAction> {
        self.keyboard
            .iter()
            .flatten()
            .map(|button| button.action)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_decode_to_same_action() {
        let mut actions = vec![
            MenuAction::Add,
            MenuAction::List,
            MenuAction::MainMenu,
            MenuAction::UnsubscribeAll,
            MenuAction::CustomInterval,
            MenuAction::SinMenu,
            MenuAction::CustomSin,
        ];
        actions.extend(CommonSin::ALL.iter().map(|sin| MenuAction::Sin(*sin)));
        actions.extend(ReminderType::ALL.iter().map(|t| MenuAction::ChooseType(*t)));
        actions.extend(ReminderType::ALL.iter().map(|t| MenuAction::Remove(*t)));
        actions.extend([15, 30, 60, 120].iter().map(|m| MenuAction::ChooseInterval(*m)));

        for action in actions {
            let tag = action.tag();
            assert!(MenuAction::owns(&tag), "{tag} should carry the wizard prefix");
            assert!(tag.len() <= 100, "Discord custom_id limit");
            assert_eq!(MenuAction::parse(&tag), Some(action));
        }
    }

    #[test]
    fn test_parse_rejects_foreign_tags() {
        assert_eq!(MenuAction::parse("persona_chef"), None);
        assert_eq!(MenuAction::parse("rem_type_takbir"), None);
        assert_eq!(MenuAction::parse("rem_interval_45"), None);
        assert_eq!(MenuAction::parse("rem_interval_"), None);
        assert_eq!(MenuAction::parse("rem_sin_riba"), None);
        assert_eq!(MenuAction::parse(""), None);
        assert!(!MenuAction::owns("debate_end_1"));
    }

    #[test]
    fn test_with_buttons_wraps_rows() {
        let buttons: Vec<MenuButton> = ReminderType::ALL
            .iter()
            .map(|t| MenuButton::new(t.label(), MenuAction::ChooseType(*t)))
            .collect();
        let reply = WizardReply::text("pick", StepOutcome::Continue)
            .with_buttons(buttons)
            .with_row(vec![MenuButton::new("back", MenuAction::MainMenu)]);

        assert_eq!(reply.keyboard.len(), 3);
        assert_eq!(reply.keyboard[0].len(), 3);
        assert_eq!(reply.keyboard[1].len(), 3);
        assert_eq!(reply.keyboard[2].len(), 1);
        assert_eq!(reply.actions().len(), 7);
    }
}
