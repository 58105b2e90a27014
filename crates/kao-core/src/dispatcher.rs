//! Single-consumer event loop.
//!
//! Events are handled one at a time, in arrival order, each to completion (store calls
//! and the edit round-trip included) before the next one starts. Find-then-write on the
//! credential table relies on this; handling events concurrently would need a lock per
//! author address around private-message handling.

use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    credentials::CredentialStore,
    handlers::{
        private::handle_private,
        public::{handle_stream, PublicContext, PublicOutcome},
    },
    kaomoji::KaomojiTable,
    messaging::{
        port::{ChatClient, EditApi},
        types::{InboundMessage, MessageKind},
    },
    replies::Reply,
    Result,
};

const POLL_RETRY_DELAY: Duration = Duration::from_secs(2);

/// What the dispatcher did with one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handled {
    /// Sent by the bot itself.
    Skipped,
    Private(Reply),
    Public(PublicOutcome),
}

pub struct Dispatcher {
    chat: Arc<dyn ChatClient>,
    edits: Arc<dyn EditApi>,
    store: CredentialStore,
    table: KaomojiTable,
    command: String,
}

impl Dispatcher {
    pub fn new(
        chat: Arc<dyn ChatClient>,
        edits: Arc<dyn EditApi>,
        store: CredentialStore,
        table: KaomojiTable,
        command: impl Into<String>,
    ) -> Self {
        Self {
            chat,
            edits,
            store,
            table,
            command: command.into(),
        }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Route one event to the private or public handler.
    pub async fn dispatch(&mut self, msg: InboundMessage) -> Handled {
        if &msg.author == self.chat.own_address() {
            return Handled::Skipped;
        }

        debug!(
            kind = ?msg.kind,
            author = %msg.author,
            message_id = msg.message_id.0,
            "handling event"
        );

        match msg.kind {
            MessageKind::Private => {
                let reply = handle_private(&mut self.store, &msg.author, &msg.body);
                let text = reply.render(&self.command, &self.table);
                if let Err(e) = self.chat.send_private(&msg.author, &text).await {
                    warn!(author = %msg.author, error = %e, "failed to send reply");
                }
                Handled::Private(reply)
            }
            MessageKind::Stream => {
                let ctx = PublicContext {
                    command: &self.command,
                    table: &self.table,
                    store: &self.store,
                    chat: self.chat.as_ref(),
                    edits: self.edits.as_ref(),
                };
                Handled::Public(handle_stream(&ctx, &msg).await)
            }
        }
    }

    /// Poll and dispatch until `cancel` fires or the transport fails fatally.
    ///
    /// Cancellation is only observed between polls.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        info!(command = %self.command, keywords = self.table.len(), "listening for events");

        loop {
            let polled = tokio::select! {
                _ = cancel.cancelled() => break,
                r = self.chat.poll_events() => r,
            };

            match polled {
                Ok(events) => {
                    for ev in events {
                        self.dispatch(ev).await;
                    }
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(error = %e, "event poll failed; retrying in {:?}", POLL_RETRY_DELAY);
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                    }
                }
            }
        }

        info!("shutdown requested; event loop stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        credentials::MemoryRecordStore,
        domain::{Address, Secret},
        errors::Error,
        testing::{FakeChat, FakeEdits, KEY},
    };

    fn dispatcher(chat: Arc<FakeChat>, edits: Arc<FakeEdits>) -> Dispatcher {
        Dispatcher::new(
            chat,
            edits,
            CredentialStore::new(Box::new(MemoryRecordStore::new())),
            KaomojiTable::builtin(),
            "@kao",
        )
    }

    #[tokio::test]
    async fn private_flow_stores_then_stream_message_is_edited() {
        let chat = Arc::new(FakeChat::new());
        let edits = Arc::new(FakeEdits::default());
        let mut d = dispatcher(chat.clone(), edits.clone());

        let h = d
            .dispatch(InboundMessage::private(1, "ada@example.com", KEY))
            .await;
        assert_eq!(h, Handled::Private(Reply::Stored));

        let h = d
            .dispatch(InboundMessage::stream(
                2,
                "ada@example.com",
                "@kao shrug banana",
                "general",
                "chat",
            ))
            .await;
        assert_eq!(h, Handled::Public(PublicOutcome::Edited));

        let edits = edits.edits.lock().unwrap();
        assert_eq!(edits[0].new_body, r"@kao ¯\_(ツ)_/¯ banana");
        assert_eq!(edits[0].credential.secret, Secret::new(KEY));

        let sent = chat.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].1,
            Reply::Stored.render("@kao", &KaomojiTable::builtin())
        );
    }

    #[tokio::test]
    async fn remove_twice_replies_removed_then_nothing_on_file() {
        let chat = Arc::new(FakeChat::new());
        let mut d = dispatcher(chat.clone(), Arc::new(FakeEdits::default()));

        d.dispatch(InboundMessage::private(1, "ada@example.com", KEY))
            .await;
        assert_eq!(
            d.dispatch(InboundMessage::private(2, "ada@example.com", "remove"))
                .await,
            Handled::Private(Reply::Removed)
        );
        assert!(d
            .store()
            .find(&Address::from("ada@example.com"))
            .unwrap()
            .is_none());
        assert_eq!(
            d.dispatch(InboundMessage::private(3, "ada@example.com", "remove"))
                .await,
            Handled::Private(Reply::NothingOnFile)
        );
        assert_eq!(chat.sent.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn own_messages_are_skipped() {
        let chat = Arc::new(FakeChat::new());
        let mut d = dispatcher(chat.clone(), Arc::new(FakeEdits::default()));

        let h = d
            .dispatch(InboundMessage::private(1, "kao-bot@example.com", "help"))
            .await;
        assert_eq!(h, Handled::Skipped);
        assert!(chat.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn run_handles_batches_in_order_and_stops_on_cancel() {
        let chat = Arc::new(FakeChat::scripted(vec![
            Ok(vec![
                InboundMessage::private(1, "ada@example.com", "info"),
                InboundMessage::private(2, "ada@example.com", KEY),
            ]),
            Err(Error::External("gateway timeout".to_string())),
            Ok(vec![InboundMessage::private(3, "ada@example.com", "info")]),
        ]));
        let mut d = dispatcher(chat.clone(), Arc::new(FakeEdits::default()));

        let cancel = CancellationToken::new();
        let stopper = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            stopper.cancel();
        });

        d.run(cancel).await.unwrap();

        let table = KaomojiTable::builtin();
        assert_eq!(
            chat.sent_texts(),
            vec![
                Reply::NothingOnFile.render("@kao", &table),
                Reply::Stored.render("@kao", &table),
                Reply::InfoFound.render("@kao", &table),
            ]
        );
    }

    #[tokio::test]
    async fn run_stops_on_auth_failure() {
        let chat = Arc::new(FakeChat::scripted(vec![Err(Error::TransportAuth(
            "401".to_string(),
        ))]));
        let mut d = dispatcher(chat, Arc::new(FakeEdits::default()));

        let err = d.run(CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, Error::TransportAuth(_)));
    }
}
