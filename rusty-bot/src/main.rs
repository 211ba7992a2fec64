use std::sync::Arc;

use tracing::{error, info};
use twilight_gateway::{EventTypeFlags, Intents, Shard, ShardId, StreamExt as _};
use twilight_http::Client;
use twilight_model::gateway::event::Event;

use rustls::crypto::ring::default_provider;

use rusty_commands::handle_message;
use rusty_core::{BotConfig, Context};
use rusty_utils::{ReactionHub, TwilightMenuClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    // Load the .env file
    dotenvy::dotenv().ok();

    let config = Arc::new(BotConfig::from_env()?);
    info!(menu = ?config.menu, "configuration loaded");

    // Create a single shared HTTP Client
    let http = Arc::new(Client::new(config.token.clone()));
    let hub = Arc::new(ReactionHub::new());
    let menus = Arc::new(TwilightMenuClient::connect(Arc::clone(&http), hub).await?);
    let ctx = Context::new(Arc::clone(&http), menus, Arc::clone(&config));

    // Menus listen for reactions in guilds and DMs
    let intents = Intents::GUILDS
        | Intents::GUILD_MESSAGES
        | Intents::MESSAGE_CONTENT
        | Intents::GUILD_MESSAGE_REACTIONS
        | Intents::DIRECT_MESSAGES
        | Intents::DIRECT_MESSAGE_REACTIONS;
    let events = EventTypeFlags::READY
        | EventTypeFlags::MESSAGE_CREATE
        | EventTypeFlags::MESSAGE_DELETE
        | EventTypeFlags::MESSAGE_DELETE_BULK
        | EventTypeFlags::REACTION_ADD;

    let mut shard = Shard::new(ShardId::new(0, 1), config.token.clone(), intents);

    info!("Rusty is connecting...");

    while let Some(item) = shard.next_event(events).await {
        let event = match item {
            Ok(event) => event,
            Err(source) => {
                error!(?source, "gateway event stream error");
                continue;
            }
        };

        match event {
            Event::Ready(_) => {
                info!("Rusty has successfully awoken!");
            }
            Event::MessageCreate(msg) => {
                // Menus keep rendering after the command returns, so each command gets its own task.
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    if let Err(source) = handle_message(ctx, msg).await {
                        error!(?source, "command failed");
                    }
                });
            }
            Event::ReactionAdd(_) | Event::MessageDelete(_) | Event::MessageDeleteBulk(_) => {
                ctx.reactions().handle_event(&event).await;
            }
            _ => {} // Ignore unused events
        }
    }

    Ok(()) // Return Success, shutdown cleanly
}
