//! Reminder slash commands: /adhkar, /adhkar_stop, /adhkar_cancel, /istighfar

use serenity::builder::CreateApplicationCommand;

use crate::features::wizard::{
    CANCEL_COMMAND, ENTRY_COMMAND, ISTIGHFAR_COMMAND, UNSUBSCRIBE_COMMAND,
};

/// Creates reminder commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![
        CreateApplicationCommand::default()
            .name(ENTRY_COMMAND)
            .description("Set up recurring dhikr reminders delivered by DM")
            .to_owned(),
        CreateApplicationCommand::default()
            .name(UNSUBSCRIBE_COMMAND)
            .description("Stop all of your dhikr reminders")
            .to_owned(),
        CreateApplicationCommand::default()
            .name(CANCEL_COMMAND)
            .description("Cancel the reminder setup in progress")
            .to_owned(),
        CreateApplicationCommand::default()
            .name(ISTIGHFAR_COMMAND)
            .description("Ask forgiveness for a specific sin")
            .to_owned(),
    ]
}
