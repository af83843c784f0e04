//! mirai-api-http adapter
//!
//! Talks to a mirai-api-http endpoint over its REST interface: verify/bind a
//! session at startup, poll `fetchMessage` for incoming events, and send
//! replies through `sendGroupMessage`/`sendFriendMessage`.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::application::errors::BotError;
use crate::domain::entities::{
    Element, Friend, Group, Member, MessageChain, MessageEvent, Origin, Target,
};
use crate::domain::traits::Chat;

/// Incoming message chain element, as mirai serializes it
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum InboundElement {
    Source { id: i64, time: i64 },
    Plain { text: String },
    At { target: u64 },
    AtAll,
    Quote { id: i64 },
    Image { url: Option<String> },
    #[serde(other)]
    Unsupported,
}

/// Outbound message chain element
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum OutboundElement {
    Plain { text: String },
    At { target: u64 },
    AtAll,
    Image { url: String },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum WireEvent {
    GroupMessage {
        #[serde(rename = "messageChain")]
        message_chain: Vec<InboundElement>,
        sender: WireMember,
    },
    FriendMessage {
        #[serde(rename = "messageChain")]
        message_chain: Vec<InboundElement>,
        sender: WireFriend,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct WireMember {
    id: u64,
    #[serde(rename = "memberName")]
    member_name: String,
    group: WireGroup,
}

#[derive(Debug, Deserialize)]
struct WireGroup {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireFriend {
    id: u64,
    nickname: String,
}

/// mirai-api-http session adapter
pub struct MiraiAdapter {
    base_url: String,
    client: Client,
    session: String,
}

impl MiraiAdapter {
    /// Verify and bind a session for the bot account
    pub async fn connect(
        base_url: impl Into<String>,
        verify_key: Option<&str>,
        account: u64,
    ) -> Result<Self, BotError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::new();

        #[derive(Serialize)]
        struct VerifyRequest<'a> {
            #[serde(rename = "verifyKey")]
            verify_key: &'a str,
        }

        #[derive(Deserialize)]
        struct VerifyResponse {
            code: i32,
            session: Option<String>,
            msg: Option<String>,
        }

        let response = client
            .post(format!("{}/verify", base_url))
            .json(&VerifyRequest {
                verify_key: verify_key.unwrap_or(""),
            })
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!(
                "mirai API error: {}",
                response.status()
            )));
        }

        let data: VerifyResponse = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        if data.code != 0 {
            return Err(BotError::Network(format!(
                "Session verify failed: {}",
                data.msg.unwrap_or_default()
            )));
        }
        let session = data
            .session
            .ok_or_else(|| BotError::Parse("Verify response missing session".to_string()))?;

        #[derive(Serialize)]
        struct BindRequest<'a> {
            #[serde(rename = "sessionKey")]
            session_key: &'a str,
            qq: u64,
        }

        #[derive(Deserialize)]
        struct BindResponse {
            code: i32,
            msg: Option<String>,
        }

        let response = client
            .post(format!("{}/bind", base_url))
            .json(&BindRequest {
                session_key: &session,
                qq: account,
            })
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let data: BindResponse = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        if data.code != 0 {
            return Err(BotError::Network(format!(
                "Session bind failed: {}",
                data.msg.unwrap_or_default()
            )));
        }

        info!("Bound mirai session for account {}", account);
        Ok(Self {
            base_url,
            client,
            session,
        })
    }

    /// Poll the endpoint for pending message events
    pub async fn fetch_messages(&self, count: u32) -> Result<Vec<MessageEvent>, BotError> {
        #[derive(Deserialize)]
        struct FetchResponse {
            code: i32,
            data: Option<Vec<WireEvent>>,
            msg: Option<String>,
        }

        let url = format!(
            "{}/fetchMessage?sessionKey={}&count={}",
            self.base_url, self.session, count
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!(
                "mirai API error: {}",
                response.status()
            )));
        }

        let data: FetchResponse = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        if data.code != 0 {
            return Err(BotError::Network(format!(
                "fetchMessage failed: {}",
                data.msg.unwrap_or_default()
            )));
        }

        Ok(data
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(to_event)
            .collect())
    }
}

fn to_event(wire: WireEvent) -> Option<MessageEvent> {
    match wire {
        WireEvent::GroupMessage {
            message_chain,
            sender,
        } => {
            let (source, time, chain) = split_chain(message_chain);
            Some(MessageEvent {
                source,
                time,
                chain,
                origin: Origin::Group {
                    group: Group {
                        id: sender.group.id,
                        name: sender.group.name,
                    },
                    member: Member {
                        id: sender.id,
                        name: sender.member_name,
                    },
                },
            })
        }
        WireEvent::FriendMessage {
            message_chain,
            sender,
        } => {
            let (source, time, chain) = split_chain(message_chain);
            Some(MessageEvent {
                source,
                time,
                chain,
                origin: Origin::Friend(Friend {
                    id: sender.id,
                    nickname: sender.nickname,
                }),
            })
        }
        WireEvent::Other => None,
    }
}

/// Separate the Source metadata element from the visible chain
fn split_chain(wire: Vec<InboundElement>) -> (i64, DateTime<Utc>, MessageChain) {
    let mut source = 0;
    let mut time = Utc::now();
    let mut elements = Vec::new();

    for element in wire {
        match element {
            InboundElement::Source { id, time: seconds } => {
                source = id;
                if let Some(stamp) = Utc.timestamp_opt(seconds, 0).single() {
                    time = stamp;
                }
            }
            InboundElement::Plain { text } => elements.push(Element::Plain(text)),
            InboundElement::At { target } => elements.push(Element::At { target }),
            InboundElement::AtAll => elements.push(Element::AtAll),
            InboundElement::Quote { id } => elements.push(Element::Quote { origin: id }),
            InboundElement::Image { url } => {
                elements.push(Element::Image(url.unwrap_or_default()))
            }
            InboundElement::Unsupported => {}
        }
    }

    (source, time, MessageChain::from_elements(elements))
}

fn outbound(element: &Element) -> Option<OutboundElement> {
    match element {
        Element::Plain(text) => Some(OutboundElement::Plain { text: text.clone() }),
        Element::At { target } => Some(OutboundElement::At { target: *target }),
        Element::AtAll => Some(OutboundElement::AtAll),
        Element::Image(url) => Some(OutboundElement::Image { url: url.clone() }),
        // Quoting is carried by the request's quote field
        Element::Quote { .. } => None,
    }
}

#[async_trait]
impl Chat for MiraiAdapter {
    async fn send(
        &self,
        target: Target,
        chain: MessageChain,
        quote: Option<i64>,
    ) -> Result<(), BotError> {
        let (method, id) = match target {
            Target::Group(id) => ("sendGroupMessage", id),
            Target::Friend(id) => ("sendFriendMessage", id),
        };

        #[derive(Serialize)]
        struct SendRequest<'a> {
            #[serde(rename = "sessionKey")]
            session_key: &'a str,
            target: u64,
            #[serde(skip_serializing_if = "Option::is_none")]
            quote: Option<i64>,
            #[serde(rename = "messageChain")]
            message_chain: Vec<OutboundElement>,
        }

        #[derive(Deserialize)]
        struct SendResponse {
            code: i32,
            msg: Option<String>,
        }

        debug!("Sending to {}: {}", target, chain.text());

        let request = SendRequest {
            session_key: &self.session,
            target: id,
            quote,
            message_chain: chain.elements().iter().filter_map(outbound).collect(),
        };

        let response = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!(
                "mirai API error: {}",
                response.status()
            )));
        }

        let data: SendResponse = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        if data.code != 0 {
            return Err(BotError::Network(format!(
                "{} failed: {}",
                method,
                data.msg.unwrap_or_default()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_group_message_event() {
        let json = serde_json::json!({
            "type": "GroupMessage",
            "messageChain": [
                {"type": "Source", "id": 123, "time": 1700000000},
                {"type": "At", "target": 10000},
                {"type": "Plain", "text": "/动态@列表"},
                {"type": "Face", "faceId": 1}
            ],
            "sender": {
                "id": 200,
                "memberName": "bob",
                "permission": "MEMBER",
                "group": {"id": 100, "name": "测试群", "permission": "ADMINISTRATOR"}
            }
        });

        let wire: WireEvent = serde_json::from_value(json).unwrap();
        let event = to_event(wire).expect("group message should convert");

        assert_eq!(event.source, 123);
        assert_eq!(event.sender_id(), 200);
        assert_eq!(event.target_id(), 100);
        assert_eq!(
            event.chain.elements(),
            &[
                Element::At { target: 10000 },
                Element::Plain("/动态@列表".to_string()),
            ]
        );
    }

    #[test]
    fn parses_friend_message_event() {
        let json = serde_json::json!({
            "type": "FriendMessage",
            "messageChain": [
                {"type": "Source", "id": 9, "time": 1700000000},
                {"type": "Plain", "text": "/重载插件"}
            ],
            "sender": {"id": 900, "nickname": "op", "remark": ""}
        });

        let wire: WireEvent = serde_json::from_value(json).unwrap();
        let event = to_event(wire).expect("friend message should convert");
        assert_eq!(event.source, 9);
        assert_eq!(event.chain.text(), "/重载插件");
    }

    #[test]
    fn unknown_event_types_are_skipped() {
        let json = serde_json::json!({"type": "BotOnlineEvent", "qq": 123});
        let wire: WireEvent = serde_json::from_value(json).unwrap();
        assert!(to_event(wire).is_none());
    }

    #[test]
    fn outbound_chain_serializes_in_wire_format() {
        let chain = MessageChain::plain("hello").at(42);
        let elements: Vec<OutboundElement> =
            chain.elements().iter().filter_map(outbound).collect();
        let value = serde_json::to_value(&elements).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"type": "Plain", "text": "hello"},
                {"type": "At", "target": 42}
            ])
        );
    }
}
