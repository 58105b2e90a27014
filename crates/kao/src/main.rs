use std::sync::Arc;

use tracing::error;

use kao_core::{config::Config, credentials::CredentialStore};
use kao_sqlite::SqliteRecordStore;

#[tokio::main]
async fn main() -> Result<(), kao_core::Error> {
    kao_core::logging::init("kao")?;

    let cfg = Arc::new(Config::load()?);

    // Without a working credential table the bot could only fail every request.
    let records = SqliteRecordStore::open(&cfg.database).map_err(|e| {
        error!(error = %e, "unable to open the credential store");
        kao_core::Error::Store(e)
    })?;
    let store = CredentialStore::new(Box::new(records));

    kao_zulip::router::run_bot(cfg, store)
        .await
        .map_err(|e| match e.downcast::<kao_core::Error>() {
            Ok(core) => core,
            Err(other) => kao_core::Error::External(format!("kao bot failed: {other}")),
        })?;

    Ok(())
}
