//! Console adapter for development/testing

use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::{MessageChain, Target};
use crate::domain::traits::Chat;

/// Prints outbound messages to stdout
pub struct ConsoleAdapter;

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self
    }

    pub async fn read_line(&self, prompt: &str) -> Option<String> {
        use std::io::Write;
        print!("{}", prompt);
        std::io::stdout().flush().ok()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input).ok()?;
        Some(input.trim().to_string())
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Chat for ConsoleAdapter {
    async fn send(
        &self,
        target: Target,
        chain: MessageChain,
        quote: Option<i64>,
    ) -> Result<(), BotError> {
        match quote {
            Some(id) => println!("[BOT -> {}] (re {}) {}", target, id, chain.text()),
            None => println!("[BOT -> {}] {}", target, chain.text()),
        }
        Ok(())
    }
}
