/// Environment-driven bot configuration.
pub mod config;

use std::sync::Arc;

use twilight_http::Client;

use rusty_utils::{ReactionHub, TwilightMenuClient};

pub use config::{BotConfig, ConfigError};

/// Shared application context passed into command handlers.
///
/// Cheap to clone because it only stores reference-counted shared state.
#[derive(Clone)]
pub struct Context {
    pub http: Arc<Client>,
    pub menus: Arc<TwilightMenuClient>,
    pub config: Arc<BotConfig>,
}

impl Context {
    /// Create a new application context.
    pub fn new(http: Arc<Client>, menus: Arc<TwilightMenuClient>, config: Arc<BotConfig>) -> Self {
        Self {
            http,
            menus,
            config,
        }
    }

    /// Gateway hub feeding reaction events to open menus.
    pub fn reactions(&self) -> &Arc<ReactionHub> {
        self.menus.hub()
    }
}
