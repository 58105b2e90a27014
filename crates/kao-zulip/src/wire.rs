//! JSON shapes of the Zulip REST API that the bot reads.

use serde::Deserialize;

use kao_core::{
    domain::{Address, MessageId},
    messaging::types::{InboundMessage, MessageKind, StreamContext},
};

/// Envelope fields present on every response, success or error.
#[derive(Debug, Default, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterResponse {
    pub queue_id: String,
    pub last_event_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
pub struct RawEvent {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
pub struct RawMessage {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub sender_email: String,
    #[serde(default)]
    pub content: String,
    /// Stream name for stream messages, recipient list for private ones.
    #[serde(default)]
    pub display_recipient: serde_json::Value,
    #[serde(default)]
    pub subject: String,
}

#[derive(Debug, Deserialize)]
pub struct StreamsResponse {
    #[serde(default)]
    pub streams: Vec<StreamEntry>,
}

#[derive(Debug, Deserialize)]
pub struct StreamEntry {
    pub name: String,
}

impl RawEvent {
    /// Message events become inbound messages; heartbeats and the rest are dropped.
    pub fn into_inbound(self) -> Option<InboundMessage> {
        if self.kind != "message" {
            return None;
        }
        self.message?.into_inbound()
    }
}

impl RawMessage {
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let (kind, stream) = match self.kind.as_str() {
            "private" | "direct" => (MessageKind::Private, None),
            "stream" => {
                let stream = self
                    .display_recipient
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                (
                    MessageKind::Stream,
                    Some(StreamContext {
                        stream,
                        topic: self.subject,
                    }),
                )
            }
            _ => return None,
        };

        Some(InboundMessage {
            kind,
            author: Address(self.sender_email),
            body: self.content,
            stream,
            message_id: MessageId(self.id),
        })
    }
}
