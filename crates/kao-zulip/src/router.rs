use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use kao_core::{
    config::Config,
    credentials::CredentialStore,
    dispatcher::Dispatcher,
    kaomoji::KaomojiTable,
    messaging::port::{ChatClient, EditApi},
    Result,
};

use crate::ZulipClient;

/// Subscribe to the configured streams and run the event loop until ctrl-c.
///
/// Credential and stream-listing failures here are fatal.
pub async fn run_bot(cfg: Arc<Config>, store: CredentialStore) -> anyhow::Result<()> {
    let client = Arc::new(ZulipClient::new(&cfg)?);

    let streams = resolve_streams(&cfg, client.as_ref()).await?;
    if streams.is_empty() {
        warn!("no streams to subscribe to; only private messages will be handled");
    } else {
        client.subscribe(&streams).await?;
        info!(count = streams.len(), streams = ?streams, "subscribed to streams");
    }

    let edits: Arc<dyn EditApi> = Arc::new(client.edit_api());
    let chat: Arc<dyn ChatClient> = client;
    info!(bot = %chat.own_address(), "kao started");

    let mut dispatcher = Dispatcher::new(
        chat,
        edits,
        store,
        KaomojiTable::builtin(),
        cfg.command.clone(),
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("ctrl-c received; finishing current event");
                on_signal.cancel();
            }
            Err(e) => warn!(error = %e, "cannot listen for ctrl-c"),
        }
    });

    dispatcher.run(cancel).await?;
    Ok(())
}

/// Explicit stream list from config, or every stream the discovery account can see.
pub async fn resolve_streams(cfg: &Config, chat: &dyn ChatClient) -> Result<Vec<String>> {
    if !cfg.subscribed_streams.is_empty() {
        return Ok(cfg.subscribed_streams.clone());
    }
    chat.list_streams().await
}
