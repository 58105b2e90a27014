use std::{fmt, sync::OnceLock};

use regex::Regex;

/// Chat account address (the user's e-mail on the platform).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address(pub String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Platform message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub u64);

/// API key that lets the bot edit messages on a user's behalf.
///
/// `Debug` is redacted so secrets never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub const LEN: usize = 32;

    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `token` has the shape of an API key: exactly 32 ASCII word characters.
    pub fn is_secret_shaped(token: &str) -> bool {
        static SHAPE: OnceLock<Regex> = OnceLock::new();
        SHAPE
            .get_or_init(|| {
                Regex::new(&format!(r"^[[:word:]]{{{}}}$", Self::LEN)).expect("valid regex")
            })
            .is_match(token)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(***)")
    }
}

/// One user's linkage to the editing API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    pub address: Address,
    pub secret: Secret,
}
