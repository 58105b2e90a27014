//! Chat platform abstractions: inbound events, outbound edits, and the ports that carry them.

pub mod port;
pub mod types;
