//! Reminder command handlers
//!
//! Handles: adhkar, adhkar_stop, adhkar_cancel, istighfar
//!
//! - **Version**: 2.1.0
//! - **Since**: 3.38.0
//!
//! ## Changelog
//! - 2.1.0: /istighfar
//! - 2.0.0: Commands drive the configuration wizard instead of one-shot reminders
//! - 1.0.0: Extracted from command_handler.rs

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::features::wizard::{
    CANCEL_COMMAND, ENTRY_COMMAND, ISTIGHFAR_COMMAND, UNSUBSCRIBE_COMMAND,
};
use crate::message_components::render_components;
use crate::transport::{UserEvent, WizardCommand};

/// Handler for the reminder subscription commands
pub struct RemindHandler;

impl RemindHandler {
    /// Wizard command behind a slash command name
    pub fn wizard_command(name: &str) -> Option<WizardCommand> {
        match name {
            ENTRY_COMMAND => Some(WizardCommand::Start),
            UNSUBSCRIBE_COMMAND => Some(WizardCommand::UnsubscribeAll),
            CANCEL_COMMAND => Some(WizardCommand::Cancel),
            ISTIGHFAR_COMMAND => Some(WizardCommand::Istighfar),
            _ => None,
        }
    }
}

#[async_trait]
impl SlashCommandHandler for RemindHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &[
            ENTRY_COMMAND,
            UNSUBSCRIBE_COMMAND,
            CANCEL_COMMAND,
            ISTIGHFAR_COMMAND,
        ]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let Some(wizard_command) = Self::wizard_command(&command.data.name) else {
            return Ok(());
        };

        let user_id = command.user.id.to_string();
        // Menus stay private when opened in a server channel
        let ephemeral = command.guild_id.is_some();
        debug!("/{} from user {user_id}", command.data.name);

        let Some(reply) = ctx
            .wizard
            .respond(&user_id, UserEvent::Command(wizard_command))
            .await
        else {
            return Ok(());
        };

        let components = render_components(&reply);
        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|msg| {
                        msg.content(&reply.text)
                            .set_components(components)
                            .ephemeral(ephemeral)
                    })
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names_map_to_wizard_commands() {
        assert_eq!(
            RemindHandler::wizard_command("adhkar"),
            Some(WizardCommand::Start)
        );
        assert_eq!(
            RemindHandler::wizard_command("adhkar_stop"),
            Some(WizardCommand::UnsubscribeAll)
        );
        assert_eq!(
            RemindHandler::wizard_command("adhkar_cancel"),
            Some(WizardCommand::Cancel)
        );
        assert_eq!(
            RemindHandler::wizard_command("istighfar"),
            Some(WizardCommand::Istighfar)
        );
        assert_eq!(RemindHandler::wizard_command("remind"), None);
    }

    #[test]
    fn test_every_declared_name_is_mapped() {
        for name in RemindHandler.command_names() {
            assert!(RemindHandler::wizard_command(name).is_some());
        }
    }
}
