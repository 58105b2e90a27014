//! Message handlers.
//!
//! - `private`: direct messages that manage the author's API key
//! - `public`: stream messages that may be rewritten in place

pub mod private;
pub mod public;
