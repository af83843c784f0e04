//! Hot-reload of the custom command package
//!
//! Operator-only, private chat. The package and all of its sub-units are
//! unloaded, the host is given a short settle delay, and the package is then
//! loaded fresh from disk. No lock is taken on the plugin host; concurrent
//! reloads are assumed not to happen (single operator).

use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::application::context::BotContext;
use crate::application::errors::BotError;
use crate::application::messaging::dispatcher::{CommandHandler, Scope};
use crate::application::messaging::matcher::CommandPattern;
use crate::domain::entities::{MessageChain, MessageEvent};

pub struct ReloadPluginsCommand {
    pattern: CommandPattern,
}

impl ReloadPluginsCommand {
    pub fn new(prefix: &str) -> Self {
        Self {
            pattern: CommandPattern::new(prefix, &["重载插件", "reloadplugin"]),
        }
    }

    async fn reload(&self, ctx: &BotContext, package: &str) -> Result<(), BotError> {
        if let Some(unit) = ctx.plugins.lookup(package) {
            info!("Unloading {} v{}", unit.name, unit.version);
            ctx.plugins.unload(package)?;
        }
        let sub_prefix = format!("{}.", package);
        for name in ctx.plugins.loaded() {
            if name.starts_with(&sub_prefix) {
                ctx.plugins.unload(&name)?;
            }
        }
        // Unconditional settle delay; the host has no unload-completion
        // signal to wait on.
        tokio::time::sleep(Duration::from_millis(ctx.config.plugins.reload_settle_ms)).await;
        ctx.plugins.load(package)?;
        Ok(())
    }
}

#[async_trait]
impl CommandHandler for ReloadPluginsCommand {
    fn name(&self) -> &str {
        "reload-plugins"
    }

    fn scope(&self) -> Scope {
        Scope::Friend
    }

    fn pattern(&self) -> &CommandPattern {
        &self.pattern
    }

    async fn handle(&self, ctx: &BotContext, event: &MessageEvent) -> Result<(), BotError> {
        let sender = event.sender_id();
        info!(
            "Friend [{}]({}) triggered command: {}",
            sender,
            event.sender_name(),
            self.name()
        );

        if let Some(master) = ctx.config.bot.master {
            if sender != master {
                warn!(
                    "{} is restricted to the operator, ignoring request from [{}]",
                    self.name(),
                    sender
                );
                return Ok(());
            }
        }

        let package = match ctx.config.plugins.custom_package.as_deref() {
            Some(package) if !package.is_empty() => package.to_string(),
            _ => {
                info!("No custom command package configured, nothing to reload");
                return Ok(());
            }
        };

        match self.reload(ctx, &package).await {
            Ok(()) => {
                info!("Custom command package ({}) reloaded", package);
                ctx.chat
                    .send(
                        event.reply_target(),
                        MessageChain::plain(format!("自定义命令({})重载成功", package)),
                        None,
                    )
                    .await?;
                Ok(())
            }
            Err(e) => {
                error!("Failed to reload custom command package ({}): {}", package, e);
                let reply = MessageChain::plain(format!("自定义命令({})重载失败\n{}", package, e));
                if let Err(send_err) = ctx.chat.send(event.reply_target(), reply, None).await {
                    error!("Failed to report reload failure: {}", send_err);
                }
                Err(e)
            }
        }
    }
}
