//! Message dispatcher - Routes incoming events to command handlers

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::application::context::BotContext;
use crate::application::errors::BotError;
use crate::application::messaging::matcher::CommandPattern;
use crate::domain::entities::{MessageEvent, Origin};

/// Which incoming events a handler listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Group,
    Friend,
}

impl Scope {
    fn accepts(self, origin: &Origin) -> bool {
        matches!(
            (self, origin),
            (Scope::Group, Origin::Group { .. }) | (Scope::Friend, Origin::Friend(_))
        )
    }
}

/// A registered chat command
#[async_trait]
pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &str;

    fn scope(&self) -> Scope;

    fn pattern(&self) -> &CommandPattern;

    async fn handle(&self, ctx: &BotContext, event: &MessageEvent) -> Result<(), BotError>;
}

/// Routes each event to the first handler whose scope and pattern match
///
/// Handler errors are logged here and do not tear down the message loop;
/// this is the generic error path genuine faults surface to.
#[derive(Default)]
pub struct Dispatcher {
    handlers: Vec<Arc<dyn CommandHandler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) {
        debug!("Registered command handler: {}", handler.name());
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub async fn dispatch(&self, ctx: &BotContext, event: &MessageEvent) {
        for handler in &self.handlers {
            if !handler.scope().accepts(&event.origin) {
                continue;
            }
            if !handler.pattern().matches(&event.chain) {
                continue;
            }
            debug!(
                "[{}] dispatching to {}",
                event.time.format("%H:%M:%S"),
                handler.name()
            );
            if let Err(e) = handler.handle(ctx, event).await {
                error!("Command {} failed: {}", handler.name(), e);
            }
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::testing::{context, friend_event, group_event};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        pattern: CommandPattern,
        scope: Scope,
        hits: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CommandHandler for CountingHandler {
        fn name(&self) -> &str {
            "counting"
        }

        fn scope(&self) -> Scope {
            self.scope
        }

        fn pattern(&self) -> &CommandPattern {
            &self.pattern
        }

        async fn handle(&self, _ctx: &BotContext, _event: &MessageEvent) -> Result<(), BotError> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn dispatch_invokes_first_matching_handler_only() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Arc::new(CountingHandler {
            pattern: CommandPattern::new("/", &["ping"]),
            scope: Scope::Group,
            hits: hits.clone(),
        }));
        dispatcher.register(Arc::new(CountingHandler {
            pattern: CommandPattern::new("/", &["ping"]),
            scope: Scope::Group,
            hits: hits.clone(),
        }));

        let ctx = context();
        dispatcher.dispatch(&ctx, &group_event(1, 2, "/ping")).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dispatch_respects_scope_and_pattern() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Arc::new(CountingHandler {
            pattern: CommandPattern::new("/", &["ping"]),
            scope: Scope::Friend,
            hits: hits.clone(),
        }));

        let ctx = context();
        dispatcher.dispatch(&ctx, &group_event(1, 2, "/ping")).await;
        dispatcher.dispatch(&ctx, &friend_event(3, "/pong")).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        dispatcher.dispatch(&ctx, &friend_event(3, "/ping")).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
