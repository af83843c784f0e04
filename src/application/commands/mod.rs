//! Built-in chat commands

pub mod at_list;
pub mod at_subscribe;
pub mod reload_plugins;

pub use at_list::AtListCommand;
pub use at_subscribe::{AtSubscribeCommand, AtUnsubscribeCommand};
pub use reload_plugins::ReloadPluginsCommand;

#[cfg(test)]
pub(crate) mod testing;
