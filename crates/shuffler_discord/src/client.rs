//! Discord client setup and lifecycle.

use crate::{DiscordError, DiscordErrorKind, ShufflerHandler};
use serenity::Client;
use shuffler_core::ShuffleService;
use tracing::{info, warn};

/// The running bot: a Serenity client wired to a [`ShufflerHandler`].
///
/// # Example
/// ```no_run
/// use shuffler_core::{InMemoryShuffleStore, ShuffleService, ShuffleSettings};
/// use shuffler_discord::ShufflerBot;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let token = std::env::var("BOT_TOKEN")?;
///     let service = ShuffleService::new(
///         Arc::new(InMemoryShuffleStore::new()),
///         ShuffleSettings::default(),
///     );
///
///     let mut bot = ShufflerBot::new(&token, service).await?;
///     bot.start().await?;
///     Ok(())
/// }
/// ```
pub struct ShufflerBot {
    client: Client,
}

impl ShufflerBot {
    /// Build the client.
    ///
    /// # Errors
    /// Returns an error if the token is malformed or the client fails to build.
    pub async fn new(token: &str, service: ShuffleService) -> Result<Self, DiscordError> {
        let intents = ShufflerHandler::intents();
        info!(?intents, "Building Serenity client");

        let client = Client::builder(token, intents)
            .event_handler(ShufflerHandler::new(service))
            .await
            .map_err(|e| {
                DiscordError::new(DiscordErrorKind::ConnectionFailed(format!(
                    "Failed to build client: {}",
                    e
                )))
            })?;

        Ok(Self { client })
    }

    /// Connect and run until Ctrl+C or a fatal gateway error.
    pub async fn start(&mut self) -> Result<(), DiscordError> {
        let shard_manager = self.client.shard_manager.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Shutdown requested");
                    shard_manager.shutdown_all().await;
                }
                Err(e) => warn!(error = %e, "Could not listen for Ctrl+C"),
            }
        });

        info!("Starting Discord bot");
        self.client.start().await.map_err(|e| {
            DiscordError::new(DiscordErrorKind::ConnectionFailed(format!(
                "Client error: {}",
                e
            )))
        })?;

        info!("Bot stopped");
        Ok(())
    }
}
