//! Domain entities

pub mod message;
pub mod subscriber;

pub use message::{Element, Friend, Group, Member, MessageChain, MessageEvent, Origin, Target};
pub use subscriber::{PushType, Subscriber};
