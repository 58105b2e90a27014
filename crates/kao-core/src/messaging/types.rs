use crate::domain::{Address, Credential, MessageId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    /// Direct message to the bot.
    Private,
    /// Post on a stream (channel).
    Stream,
}

/// Where a stream message was posted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamContext {
    pub stream: String,
    pub topic: String,
}

/// One inbound chat event, consumed once by the dispatcher.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    pub kind: MessageKind,
    pub author: Address,
    pub body: String,
    pub stream: Option<StreamContext>,
    pub message_id: MessageId,
}

impl InboundMessage {
    pub fn private(id: u64, author: &str, body: &str) -> Self {
        Self {
            kind: MessageKind::Private,
            author: Address::from(author),
            body: body.to_string(),
            stream: None,
            message_id: MessageId(id),
        }
    }

    pub fn stream(id: u64, author: &str, body: &str, stream: &str, topic: &str) -> Self {
        Self {
            kind: MessageKind::Stream,
            author: Address::from(author),
            body: body.to_string(),
            stream: Some(StreamContext {
                stream: stream.to_string(),
                topic: topic.to_string(),
            }),
            message_id: MessageId(id),
        }
    }
}

/// In-place rewrite of a message, authenticated as its author.
#[derive(Clone, Debug)]
pub struct OutboundEdit {
    pub message_id: MessageId,
    pub new_body: String,
    pub credential: Credential,
}
