//! Domain traits (ports)

pub mod chat;
pub mod datasource;
pub mod plugins;
pub mod store;

pub use chat::Chat;
pub use datasource::DataSource;
pub use plugins::{PluginHost, PluginInfo};
pub use store::NotificationStore;
