use crate::credentials::StoreError;

/// Core error type for the bot.
///
/// Adapter crates map their specific errors into this type so the core can tell
/// fatal conditions (auth, store unreachable) from ones it only logs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("chat API rejected credentials: {0}")]
    TransportAuth(String),

    #[error("chat API request failed: {0}")]
    TransportFetch(String),

    #[error("credential store error: {0}")]
    Store(#[from] StoreError),

    #[error("edit request failed: {status} {body}")]
    EditApi { status: u16, body: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    /// Errors after which the bot cannot do useful work.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::TransportAuth(_)
                | Error::Store(StoreError::Connection(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
