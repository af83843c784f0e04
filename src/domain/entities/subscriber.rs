use serde::{Deserialize, Serialize};

/// Kind of chat a notification is pushed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushType {
    Group,
    Friend,
}

/// A tracked creator whose updates are pushed to a chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub uid: u64,
    pub uname: String,
}

impl Subscriber {
    pub fn new(uid: u64, uname: impl Into<String>) -> Self {
        Self {
            uid,
            uname: uname.into(),
        }
    }
}
