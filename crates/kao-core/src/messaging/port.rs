use async_trait::async_trait;

use crate::{
    domain::Address,
    messaging::types::{InboundMessage, OutboundEdit},
    Result,
};

/// Chat transport port: event feed, private replies, stream management.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// The bot's own account; messages from it are never handled.
    fn own_address(&self) -> &Address;

    /// Block until the next batch of message events is available.
    ///
    /// Returns events in arrival order. An empty batch (e.g. a long-poll heartbeat) is fine.
    async fn poll_events(&self) -> Result<Vec<InboundMessage>>;

    async fn send_private(&self, to: &Address, content: &str) -> Result<()>;

    /// Names of every stream visible to the discovery account.
    async fn list_streams(&self) -> Result<Vec<String>>;

    async fn subscribe(&self, streams: &[String]) -> Result<()>;
}

/// Message edit endpoint. Authenticates with the credential carried by the edit.
#[async_trait]
pub trait EditApi: Send + Sync {
    /// Non-2xx responses are `Error::EditApi`; nothing is retried.
    async fn edit(&self, edit: &OutboundEdit) -> Result<()>;
}
