use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info, warn};
use serenity::async_trait;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;
use tokio::sync::watch;

use dhikr::commands::{
    create_all_handlers, register_global_commands, register_guild_commands, CommandContext,
    CommandRegistry,
};
use dhikr::core::Config;
use dhikr::database::Database;
use dhikr::features::reminders::{ReminderCatalog, ReminderScheduler};
use dhikr::features::wizard::ConfigurationWizard;
use dhikr::message_components::{render_components, MessageComponentHandler};
use dhikr::transport::{text_event, DiscordTransport};

struct Handler {
    context: Arc<CommandContext>,
    registry: CommandRegistry,
    component_handler: Arc<MessageComponentHandler>,
    guild_id: Option<GuildId>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let Some(event) = text_event(&msg.content, msg.guild_id.is_none()) else {
            return;
        };

        let user_id = msg.author.id.to_string();
        // None: not waiting on typed input from this user
        let Some(reply) = self.context.wizard.respond(&user_id, event).await else {
            return;
        };

        let components = render_components(&reply);
        if let Err(why) = msg
            .channel_id
            .send_message(&ctx.http, |m| {
                m.content(&reply.text).set_components(components)
            })
            .await
        {
            error!("Failed to send wizard reply: {why}");
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);

        if let Some(shard) = ready.shard {
            info!("⚡ Shard: {}/{}", shard[0] + 1, shard[1]);
        }

        if let Some(guild_id) = self.guild_id {
            info!("🔧 Development mode: Registering commands for guild {guild_id}");
            if let Err(e) = register_guild_commands(&ctx, guild_id).await {
                error!("❌ Failed to register guild slash commands: {e}");
            } else {
                info!("✅ Successfully registered slash commands for guild {guild_id} (instant update)");
            }
        } else {
            info!("🌍 Production mode: Registering commands globally");
            if let Err(e) = register_global_commands(&ctx).await {
                error!("❌ Failed to register global slash commands: {e}");
            } else {
                info!("✅ Successfully registered slash commands globally (may take up to 1 hour to propagate)");
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::ApplicationCommand(command) => {
                let Some(handler) = self.registry.get(&command.data.name) else {
                    warn!("No handler registered for /{}", command.data.name);
                    return;
                };

                if let Err(e) = handler
                    .handle(Arc::clone(&self.context), &ctx, &command)
                    .await
                {
                    error!(
                        "Error handling slash command '{}': {}",
                        command.data.name, e
                    );
                    let _ = command
                        .create_interaction_response(&ctx.http, |response| {
                            response
                                .kind(InteractionResponseType::ChannelMessageWithSource)
                                .interaction_response_data(|message| {
                                    message
                                        .content("❌ Sorry, I encountered an error processing your command. Please try again.")
                                        .ephemeral(true)
                                })
                        })
                        .await;
                }
            }
            Interaction::MessageComponent(component) => {
                if let Err(e) = self
                    .component_handler
                    .handle_component_interaction(&ctx, &component)
                    .await
                {
                    error!(
                        "Error handling component interaction '{}': {}",
                        component.data.custom_id, e
                    );
                }
            }
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting dhikr reminder bot...");

    let database = Database::new(&config.database_path).await?;
    info!(
        "🗄️ Subscription store ready at {} ({} subscriptions)",
        config.database_path,
        database.count().await?
    );

    let catalog = Arc::new(ReminderCatalog::load(&config.reminders_config_path)?);
    let wizard = Arc::new(ConfigurationWizard::new(
        database.clone(),
        config.max_custom_interval_minutes,
    ));
    let context = Arc::new(CommandContext::new(Arc::clone(&wizard)));

    // Parse guild ID if provided for development mode
    let guild_id = config
        .discord_guild_id
        .as_ref()
        .and_then(|id| id.parse::<u64>().ok())
        .map(GuildId);

    let handler = Handler {
        context,
        registry: CommandRegistry::with_handlers(create_all_handlers()),
        component_handler: Arc::new(MessageComponentHandler::new(wizard)),
        guild_id,
    };

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Bot configured successfully. Connecting to Discord gateway...");

    // Start the reminder scheduler
    let transport = Arc::new(DiscordTransport::new(client.cache_and_http.http.clone()));
    let scheduler = ReminderScheduler::new(database, transport, catalog)
        .with_tick(config.scheduler_tick())
        .with_delivery_timeout(config.delivery_timeout());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx));

    // Ctrl-C: let the scheduler finish its batch, then close the gateway
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
            return;
        }
        info!("🛑 Shutdown requested");
        let _ = shutdown_tx.send(true);
        if let Err(e) = scheduler_handle.await {
            error!("Reminder scheduler ended abnormally: {e}");
        }
        shard_manager.lock().await.shutdown_all().await;
    });

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    info!("👋 Bot stopped");
    Ok(())
}
