//! Command pattern matching
//!
//! A command is an ordered sequence of match tokens: an optional leading
//! mention, a literal prefix, and one of a set of literal command words.
//! Tokens are checked left to right; the first mismatch rejects the chain.

use crate::domain::entities::{Element, MessageChain};

/// Textual trigger for a command
#[derive(Debug, Clone)]
pub struct CommandPattern {
    leading_mention: bool,
    prefix: String,
    aliases: Vec<String>,
}

impl CommandPattern {
    pub fn new(prefix: impl Into<String>, aliases: &[&str]) -> Self {
        Self {
            leading_mention: false,
            prefix: prefix.into(),
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Permit a single mention element before the command text
    pub fn with_leading_mention(mut self) -> Self {
        self.leading_mention = true;
        self
    }

    /// Whether the chain spells out this command
    pub fn matches(&self, chain: &MessageChain) -> bool {
        let mut elements = chain.elements();

        if self.leading_mention {
            if let Some(Element::At { .. }) = elements.first() {
                elements = &elements[1..];
            }
        }

        if elements.is_empty() {
            return false;
        }

        let mut text = String::new();
        for element in elements {
            match element {
                Element::Plain(part) => text.push_str(part),
                _ => return false,
            }
        }

        let text = text.trim();
        let Some(word) = text.strip_prefix(&self.prefix) else {
            return false;
        };
        self.aliases.iter().any(|alias| alias == word)
    }
}

/// Whether a chain is addressed to the bot itself
///
/// Quoted replies and at-everyone markers disqualify the chain outright, as
/// does a mention of any account other than the bot's own. An empty chain is
/// eligible.
pub fn addressed_to_bot(account: u64, chain: &MessageChain) -> bool {
    for element in chain.elements() {
        match element {
            Element::Quote { .. } | Element::AtAll => return false,
            Element::At { target } if *target != account => return false,
            _ => {}
        }
    }
    true
}
