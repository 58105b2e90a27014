//! Command/keyword substitution.
//!
//! `substitute()` is pure: it never touches the network or the credential store.

use crate::kaomoji::KaomojiTable;

/// The body holds no command, or nothing follows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("no command with trailing keywords")]
pub struct NoMatch;

/// Rewrite the keywords that follow `command` in `body`.
///
/// The body is split on single spaces. Everything up to and including the first
/// command token (ASCII case-insensitive) is kept verbatim; each following token is
/// replaced by its kaomoji when it is a known keyword and kept unchanged otherwise.
pub fn substitute(body: &str, command: &str, table: &KaomojiTable) -> Result<String, NoMatch> {
    let tokens: Vec<&str> = body.split(' ').collect();

    let Some(idx) = tokens.iter().position(|t| t.eq_ignore_ascii_case(command)) else {
        return Err(NoMatch);
    };
    if idx + 1 >= tokens.len() {
        return Err(NoMatch);
    }

    let (prefix, candidates) = tokens.split_at(idx + 1);
    let out: Vec<&str> = prefix
        .iter()
        .copied()
        .chain(candidates.iter().map(|&t| table.get(t).unwrap_or(t)))
        .collect();

    if out.is_empty() {
        return Err(NoMatch);
    }
    Ok(out.join(" "))
}
