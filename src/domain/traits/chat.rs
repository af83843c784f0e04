use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::{MessageChain, Target};

/// Chat trait - abstraction for the messaging platform's outbound side
///
/// Sends are fire-and-forget from the handlers' perspective; no delivery
/// confirmation is modeled.
#[async_trait]
pub trait Chat: Send + Sync {
    /// Send a message chain to a target, optionally quoting a source message
    async fn send(
        &self,
        target: Target,
        chain: MessageChain,
        quote: Option<i64>,
    ) -> Result<(), BotError>;
}
