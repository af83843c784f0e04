//! Collaborators handed to every command handler
//!
//! Built once at startup and passed by reference into the dispatcher;
//! nothing here is ambient global state.

use std::sync::Arc;

use crate::domain::traits::{Chat, DataSource, NotificationStore, PluginHost};
use crate::infrastructure::config::Config;

#[derive(Clone)]
pub struct BotContext {
    /// The bot's own account id
    pub account: u64,
    pub config: Arc<Config>,
    pub chat: Arc<dyn Chat>,
    pub store: Arc<dyn NotificationStore>,
    pub datasource: Arc<dyn DataSource>,
    pub plugins: Arc<dyn PluginHost>,
}
