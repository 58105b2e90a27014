use tracing::{error, warn};

use crate::{
    credentials::{CredentialStore, StoreError},
    domain::{Address, Secret},
    replies::Reply,
};

/// Words that remove the author's key.
pub const REMOVE_COMMANDS: &[&str] = &["delete", "remove", "exit", "stop"];

/// What a private message asks for, decided from its literal content only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrivateCommand {
    TooManyArguments,
    StoreKey(Secret),
    Remove,
    Info,
    Help,
    Unrecognized,
}

pub fn classify(body: &str) -> PrivateCommand {
    let mut tokens = body.split_whitespace();
    let (Some(token), None) = (tokens.next(), tokens.next()) else {
        return PrivateCommand::TooManyArguments;
    };

    if Secret::is_secret_shaped(token) {
        PrivateCommand::StoreKey(Secret::new(token))
    } else if REMOVE_COMMANDS.contains(&token) {
        PrivateCommand::Remove
    } else if token == "info" {
        PrivateCommand::Info
    } else if token == "help" {
        PrivateCommand::Help
    } else {
        PrivateCommand::Unrecognized
    }
}

/// Classify a private message, apply it to the author's credential and pick the reply.
///
/// Store access is blocking and happens only for key, removal and info requests.
pub fn handle_private(store: &mut CredentialStore, author: &Address, body: &str) -> Reply {
    let outcome = match classify(body) {
        PrivateCommand::TooManyArguments => Ok(Reply::TooManyArguments),
        PrivateCommand::Help => Ok(Reply::Help),
        PrivateCommand::Unrecognized => Ok(Reply::Unrecognized),
        PrivateCommand::StoreKey(secret) => store_key(store, author, &secret),
        PrivateCommand::Remove => remove_key(store, author),
        PrivateCommand::Info => store.find(author).map(|c| match c {
            Some(_) => Reply::InfoFound,
            None => Reply::NothingOnFile,
        }),
    };

    outcome.unwrap_or_else(|e| {
        error!(%author, error = %e, "credential store failed");
        Reply::StoreUnavailable
    })
}

fn store_key(
    store: &mut CredentialStore,
    author: &Address,
    secret: &Secret,
) -> Result<Reply, StoreError> {
    if store.find(author)?.is_some() {
        return match store.update(author, secret) {
            Ok(()) => Ok(Reply::Updated),
            // Row vanished between find and update.
            Err(StoreError::NotFound(_)) => {
                warn!(%author, "credential disappeared before update; inserting");
                store.insert(author, secret).map(|_| Reply::Stored)
            }
            Err(e) => Err(e),
        };
    }

    match store.insert(author, secret) {
        Ok(()) => Ok(Reply::Stored),
        // Row appeared between find and insert.
        Err(StoreError::DuplicateKey(_)) => {
            warn!(%author, "credential appeared before insert; updating");
            store.update(author, secret).map(|_| Reply::Updated)
        }
        Err(e) => Err(e),
    }
}

fn remove_key(store: &mut CredentialStore, author: &Address) -> Result<Reply, StoreError> {
    if store.find(author)?.is_none() {
        return Ok(Reply::NothingOnFile);
    }
    match store.remove(author) {
        Ok(()) => Ok(Reply::Removed),
        Err(StoreError::NotFound(_)) => Ok(Reply::NothingOnFile),
        Err(e) => Err(e),
    }
}
