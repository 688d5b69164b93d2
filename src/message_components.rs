use anyhow::Result;
use log::info;
use serenity::builder::CreateComponents;
use serenity::model::application::component::ButtonStyle;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::features::wizard::{ButtonKind, ConfigurationWizard, MenuAction, WizardReply};
use crate::transport::UserEvent;

/// Handler for wizard button presses
pub struct MessageComponentHandler {
    wizard: Arc<ConfigurationWizard>,
}

impl MessageComponentHandler {
    pub fn new(wizard: Arc<ConfigurationWizard>) -> Self {
        Self { wizard }
    }

    /// Handle all types of component interactions
    pub async fn handle_component_interaction(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
    ) -> Result<()> {
        let custom_id = &interaction.data.custom_id;
        let user_id = interaction.user.id.to_string();

        info!("Processing component interaction: {custom_id} from user: {user_id}");

        if !MenuAction::owns(custom_id) {
            interaction
                .create_interaction_response(&ctx.http, |response| {
                    response
                        .kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|message| {
                            message
                                .content("Unknown component interaction.")
                                .ephemeral(true)
                        })
                })
                .await?;
            return Ok(());
        }

        let Some(reply) = self
            .wizard
            .respond(&user_id, UserEvent::Tap(custom_id.clone()))
            .await
        else {
            interaction
                .create_interaction_response(&ctx.http, |response| {
                    response.kind(InteractionResponseType::DeferredUpdateMessage)
                })
                .await?;
            return Ok(());
        };

        let components = render_components(&reply);
        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::UpdateMessage)
                    .interaction_response_data(|message| {
                        message.content(&reply.text).set_components(components)
                    })
            })
            .await?;

        Ok(())
    }
}

/// Render a wizard keyboard as Discord action rows
pub fn render_components(reply: &WizardReply) -> CreateComponents {
    let mut components = CreateComponents::default();
    for row in &reply.keyboard {
        components.create_action_row(|action_row| {
            for button in row {
                action_row.create_button(|b| {
                    b.custom_id(button.action.tag())
                        .label(&button.label)
                        .style(button_style(button.kind))
                });
            }
            action_row
        });
    }
    components
}

fn button_style(kind: ButtonKind) -> ButtonStyle {
    match kind {
        ButtonKind::Primary => ButtonStyle::Primary,
        ButtonKind::Secondary => ButtonStyle::Secondary,
        ButtonKind::Danger => ButtonStyle::Danger,
    }
}
