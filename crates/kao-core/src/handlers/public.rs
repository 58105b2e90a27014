use tracing::{debug, error, info, warn};

use crate::{
    credentials::CredentialStore,
    kaomoji::KaomojiTable,
    messaging::{
        port::{ChatClient, EditApi},
        types::{InboundMessage, OutboundEdit},
    },
    replies::Reply,
    substitution::substitute,
};

/// What happened to a stream message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublicOutcome {
    /// No command, or nothing after it.
    Ignored,
    /// `<command> help`: help text went to the author privately.
    HelpSent,
    /// Author has no key on file; they were asked to set one up.
    SetupPromptSent,
    Edited,
    /// The edit endpoint failed; the message stays as it was.
    EditFailed,
    /// Credential lookup failed; nothing was sent.
    StoreFailed,
}

pub struct PublicContext<'a> {
    pub command: &'a str,
    pub table: &'a KaomojiTable,
    pub store: &'a CredentialStore,
    pub chat: &'a dyn ChatClient,
    pub edits: &'a dyn EditApi,
}

pub async fn handle_stream(ctx: &PublicContext<'_>, msg: &InboundMessage) -> PublicOutcome {
    let body = msg.body.trim();
    let author = &msg.author;

    if is_help_request(body, ctx.command) {
        let text = Reply::Help.render(ctx.command, ctx.table);
        if let Err(e) = ctx.chat.send_private(author, &text).await {
            warn!(%author, error = %e, "failed to send help");
        }
        return PublicOutcome::HelpSent;
    }

    let new_body = match substitute(body, ctx.command, ctx.table) {
        Ok(b) => b,
        Err(_) => {
            debug!(message_id = msg.message_id.0, "no command in stream message");
            return PublicOutcome::Ignored;
        }
    };

    let credential = match ctx.store.find(author) {
        Ok(Some(c)) => c,
        Ok(None) => {
            info!(%author, "rewrite requested without a key on file");
            let text = Reply::SetupPrompt.render(ctx.command, ctx.table);
            if let Err(e) = ctx.chat.send_private(author, &text).await {
                warn!(%author, error = %e, "failed to send setup prompt");
            }
            return PublicOutcome::SetupPromptSent;
        }
        Err(e) => {
            error!(%author, error = %e, "credential lookup failed");
            return PublicOutcome::StoreFailed;
        }
    };

    let edit = OutboundEdit {
        message_id: msg.message_id,
        new_body,
        credential,
    };
    match ctx.edits.edit(&edit).await {
        Ok(()) => {
            debug!(message_id = msg.message_id.0, "message rewritten");
            PublicOutcome::Edited
        }
        Err(e) => {
            warn!(message_id = msg.message_id.0, error = %e, "edit failed; leaving message as is");
            PublicOutcome::EditFailed
        }
    }
}

fn is_help_request(body: &str, command: &str) -> bool {
    let Some((first, rest)) = body.split_once(' ') else {
        return false;
    };
    first.eq_ignore_ascii_case(command) && rest.eq_ignore_ascii_case("help")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        credentials::MemoryRecordStore,
        domain::{Address, Secret},
        testing::{FailingRecords, FakeChat, FakeEdits, KEY},
    };

    fn ctx<'a>(
        table: &'a KaomojiTable,
        store: &'a CredentialStore,
        chat: &'a FakeChat,
        edits: &'a FakeEdits,
    ) -> PublicContext<'a> {
        PublicContext {
            command: "@kao",
            table,
            store,
            chat,
            edits,
        }
    }

    fn store_with_ada() -> CredentialStore {
        let mut store = CredentialStore::new(Box::new(MemoryRecordStore::new()));
        store
            .insert(&Address::from("ada@example.com"), &Secret::new(KEY))
            .unwrap();
        store
    }

    fn msg(body: &str) -> InboundMessage {
        InboundMessage::stream(42, "ada@example.com", body, "general", "chat")
    }

    #[tokio::test]
    async fn rewrites_with_author_credential() {
        let table = KaomojiTable::builtin();
        let store = store_with_ada();
        let chat = FakeChat::new();
        let edits = FakeEdits::default();

        let out = handle_stream(&ctx(&table, &store, &chat, &edits), &msg("@kao shrug banana")).await;
        assert_eq!(out, PublicOutcome::Edited);

        let edits = edits.edits.lock().unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].message_id.0, 42);
        assert_eq!(edits[0].new_body, r"@kao ¯\_(ツ)_/¯ banana");
        assert_eq!(edits[0].credential.address.as_str(), "ada@example.com");
        assert_eq!(edits[0].credential.secret.expose(), KEY);
        assert!(chat.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bare_command_is_ignored_silently() {
        let table = KaomojiTable::builtin();
        let store = store_with_ada();
        let chat = FakeChat::new();
        let edits = FakeEdits::default();
        let ctx = ctx(&table, &store, &chat, &edits);

        assert_eq!(handle_stream(&ctx, &msg("@kao")).await, PublicOutcome::Ignored);
        assert_eq!(
            handle_stream(&ctx, &msg("just chatting")).await,
            PublicOutcome::Ignored
        );
        assert!(edits.edits.lock().unwrap().is_empty());
        assert!(chat.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_credential_prompts_setup_without_editing() {
        let table = KaomojiTable::builtin();
        let store = CredentialStore::new(Box::new(MemoryRecordStore::new()));
        let chat = FakeChat::new();
        let edits = FakeEdits::default();

        let out = handle_stream(&ctx(&table, &store, &chat, &edits), &msg("@kao yay")).await;
        assert_eq!(out, PublicOutcome::SetupPromptSent);
        assert!(edits.edits.lock().unwrap().is_empty());

        let sent = chat.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0.as_str(), "ada@example.com");
        assert_eq!(sent[0].1, Reply::SetupPrompt.render("@kao", &table));
    }

    #[tokio::test]
    async fn store_failure_is_logged_without_edit_or_reply() {
        let table = KaomojiTable::builtin();
        let store = CredentialStore::new(Box::new(FailingRecords));
        let chat = FakeChat::new();
        let edits = FakeEdits::default();

        let out = handle_stream(&ctx(&table, &store, &chat, &edits), &msg("@kao yay")).await;
        assert_eq!(out, PublicOutcome::StoreFailed);
        assert!(edits.edits.lock().unwrap().is_empty());
        assert!(chat.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn edit_failure_is_swallowed() {
        let table = KaomojiTable::builtin();
        let store = store_with_ada();
        let chat = FakeChat::new();
        let edits = FakeEdits::failing();

        let out = handle_stream(&ctx(&table, &store, &chat, &edits), &msg("@kao sad")).await;
        assert_eq!(out, PublicOutcome::EditFailed);
        assert_eq!(edits.edits.lock().unwrap().len(), 1);
        assert!(chat.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn help_on_stream_goes_to_author_privately() {
        let table = KaomojiTable::builtin();
        let store = store_with_ada();
        let chat = FakeChat::new();
        let edits = FakeEdits::default();

        let out = handle_stream(&ctx(&table, &store, &chat, &edits), &msg("  @kao HELP ")).await;
        assert_eq!(out, PublicOutcome::HelpSent);
        assert!(edits.edits.lock().unwrap().is_empty());
        let sent = chat.sent.lock().unwrap();
        assert_eq!(sent[0].1, Reply::Help.render("@kao", &table));
    }

    #[test]
    fn help_request_needs_exact_shape() {
        assert!(is_help_request("@kao help", "@kao"));
        assert!(!is_help_request("@kao help me", "@kao"));
        assert!(!is_help_request("please @kao help", "@kao"));
        assert!(!is_help_request("@kao", "@kao"));
    }
}
