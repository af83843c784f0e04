//! Join/leave the group's dynamic-at list

use async_trait::async_trait;
use tracing::info;

use crate::application::context::BotContext;
use crate::application::errors::BotError;
use crate::application::messaging::dispatcher::{CommandHandler, Scope};
use crate::application::messaging::matcher::{addressed_to_bot, CommandPattern};
use crate::domain::entities::{MessageChain, MessageEvent};

/// Adds the sender to the group's dynamic-at list
pub struct AtSubscribeCommand {
    pattern: CommandPattern,
}

impl AtSubscribeCommand {
    pub fn new(prefix: &str) -> Self {
        Self {
            pattern: CommandPattern::new(prefix, &["动态@我"]).with_leading_mention(),
        }
    }
}

#[async_trait]
impl CommandHandler for AtSubscribeCommand {
    fn name(&self) -> &str {
        "dynamic-at-subscribe"
    }

    fn scope(&self) -> Scope {
        Scope::Group
    }

    fn pattern(&self) -> &CommandPattern {
        &self.pattern
    }

    async fn handle(&self, ctx: &BotContext, event: &MessageEvent) -> Result<(), BotError> {
        if !has_subscriptions(ctx, event).await? {
            return Ok(());
        }
        let group_id = event.target_id();
        info!("Group [{}] triggered command: {}", group_id, self.name());

        let added = ctx
            .store
            .dynamic_at_add(group_id, event.sender_id())
            .await?;
        let reply = if added {
            "已加入本群的动态@列表~"
        } else {
            "您已在本群的动态@列表中~"
        };
        ctx.chat
            .send(
                event.reply_target(),
                MessageChain::plain(reply),
                Some(event.source),
            )
            .await?;
        Ok(())
    }
}

/// Removes the sender from the group's dynamic-at list
pub struct AtUnsubscribeCommand {
    pattern: CommandPattern,
}

impl AtUnsubscribeCommand {
    pub fn new(prefix: &str) -> Self {
        Self {
            pattern: CommandPattern::new(prefix, &["取消动态@我"]).with_leading_mention(),
        }
    }
}

#[async_trait]
impl CommandHandler for AtUnsubscribeCommand {
    fn name(&self) -> &str {
        "dynamic-at-unsubscribe"
    }

    fn scope(&self) -> Scope {
        Scope::Group
    }

    fn pattern(&self) -> &CommandPattern {
        &self.pattern
    }

    async fn handle(&self, ctx: &BotContext, event: &MessageEvent) -> Result<(), BotError> {
        if !has_subscriptions(ctx, event).await? {
            return Ok(());
        }
        let group_id = event.target_id();
        info!("Group [{}] triggered command: {}", group_id, self.name());

        let removed = ctx
            .store
            .dynamic_at_remove(group_id, event.sender_id())
            .await?;
        let reply = if removed {
            "已退出本群的动态@列表~"
        } else {
            "您不在本群的动态@列表中~"
        };
        ctx.chat
            .send(
                event.reply_target(),
                MessageChain::plain(reply),
                Some(event.source),
            )
            .await?;
        Ok(())
    }
}

/// Shared guards: the message must address the bot and the group must have
/// configured subscriptions.
async fn has_subscriptions(ctx: &BotContext, event: &MessageEvent) -> Result<bool, BotError> {
    if !addressed_to_bot(ctx.account, &event.chain) {
        return Ok(false);
    }
    let subscribers = ctx
        .datasource
        .subscribers(event.target_id(), event.push_type())
        .await?;
    Ok(!subscribers.is_empty())
}
