use chrono::{DateTime, Utc};

use super::PushType;

/// A single element of a message chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Plain text segment
    Plain(String),
    /// Mention of a specific account
    At { target: u64 },
    /// Mention of everyone in the group
    AtAll,
    /// Quoted reply to an earlier message
    Quote { origin: i64 },
    /// Image, referenced by URL
    Image(String),
}

/// Ordered sequence of message elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageChain {
    elements: Vec<Element>,
}

impl MessageChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain consisting of a single text segment
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            elements: vec![Element::Plain(text.into())],
        }
    }

    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self { elements }
    }

    pub fn push(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    pub fn at(self, target: u64) -> Self {
        self.push(Element::At { target })
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Concatenated text of all plain segments
    pub fn text(&self) -> String {
        let mut text = String::new();
        for element in &self.elements {
            if let Element::Plain(part) = element {
                text.push_str(part);
            }
        }
        text
    }
}

/// A group chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: u64,
    pub name: String,
}

/// A member of a group chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: u64,
    pub name: String,
}

/// A private (friend) contact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Friend {
    pub id: u64,
    pub nickname: String,
}

/// Where an incoming message came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Group { group: Group, member: Member },
    Friend(Friend),
}

/// Destination of an outbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Group(u64),
    Friend(u64),
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Group(id) => write!(f, "group {}", id),
            Target::Friend(id) => write!(f, "friend {}", id),
        }
    }
}

/// An incoming chat message
#[derive(Debug, Clone)]
pub struct MessageEvent {
    /// Platform message id, usable for quoting
    pub source: i64,
    pub time: DateTime<Utc>,
    pub chain: MessageChain,
    pub origin: Origin,
}

impl MessageEvent {
    /// Account id of the user who sent the message
    pub fn sender_id(&self) -> u64 {
        match &self.origin {
            Origin::Group { member, .. } => member.id,
            Origin::Friend(friend) => friend.id,
        }
    }

    /// Display name of the user who sent the message
    pub fn sender_name(&self) -> &str {
        match &self.origin {
            Origin::Group { member, .. } => &member.name,
            Origin::Friend(friend) => &friend.nickname,
        }
    }

    /// Display name of the chat the message belongs to
    pub fn chat_name(&self) -> &str {
        match &self.origin {
            Origin::Group { group, .. } => &group.name,
            Origin::Friend(friend) => &friend.nickname,
        }
    }

    /// Id of the chat the message belongs to (group id or friend id)
    pub fn target_id(&self) -> u64 {
        match &self.origin {
            Origin::Group { group, .. } => group.id,
            Origin::Friend(friend) => friend.id,
        }
    }

    pub fn push_type(&self) -> PushType {
        match &self.origin {
            Origin::Group { .. } => PushType::Group,
            Origin::Friend(_) => PushType::Friend,
        }
    }

    /// Where a reply to this message should be sent
    pub fn reply_target(&self) -> Target {
        match &self.origin {
            Origin::Group { group, .. } => Target::Group(group.id),
            Origin::Friend(friend) => Target::Friend(friend.id),
        }
    }
}
