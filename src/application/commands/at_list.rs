//! Dynamic-at list command
//!
//! Group members ask the bot which accounts are on the group's dynamic-at
//! list, i.e. who gets mentioned when a tracked creator posts an update.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::info;

use crate::application::context::BotContext;
use crate::application::errors::BotError;
use crate::application::messaging::dispatcher::{CommandHandler, Scope};
use crate::application::messaging::matcher::{addressed_to_bot, CommandPattern};
use crate::domain::entities::{MessageChain, MessageEvent};

pub struct AtListCommand {
    pattern: CommandPattern,
}

impl AtListCommand {
    pub fn new(prefix: &str) -> Self {
        Self {
            pattern: CommandPattern::new(prefix, &["动态@列表", "动态@名单"]).with_leading_mention(),
        }
    }
}

#[async_trait]
impl CommandHandler for AtListCommand {
    fn name(&self) -> &str {
        "dynamic-at-list"
    }

    fn scope(&self) -> Scope {
        Scope::Group
    }

    fn pattern(&self) -> &CommandPattern {
        &self.pattern
    }

    async fn handle(&self, ctx: &BotContext, event: &MessageEvent) -> Result<(), BotError> {
        if !addressed_to_bot(ctx.account, &event.chain) {
            return Ok(());
        }
        let group_id = event.target_id();
        info!(
            "Group [{}]({}) triggered command: {}",
            group_id,
            event.chat_name(),
            self.name()
        );

        // Only groups with configured subscriptions get a reply at all.
        let subscribers = ctx
            .datasource
            .subscribers(group_id, event.push_type())
            .await?;
        if subscribers.is_empty() {
            return Ok(());
        }

        if ctx.store.dynamic_at_count(group_id).await? == 0 {
            ctx.chat
                .send(
                    event.reply_target(),
                    MessageChain::plain("本群的动态@列表为空~"),
                    Some(event.source),
                )
                .await?;
            return Ok(());
        }

        let ids = ctx.store.dynamic_at_list(group_id).await?;
        let distinct: HashSet<u64> = ids.into_iter().collect();
        let lines = distinct
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        ctx.chat
            .send(
                event.reply_target(),
                MessageChain::plain(format!("本群的动态@列表如下:\n{}", lines)),
                Some(event.source),
            )
            .await?;
        Ok(())
    }
}
