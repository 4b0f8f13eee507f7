//! Alert wording and delivery
//!
//! The composer turns an `Analysis` into a short human-readable message and
//! the sink delivers it. Both are seams for external services (language
//! models, speech synthesis); the defaults here need no network.

mod message;
mod sink;

pub use message::{format_summary, FallbackComposer, MessageComposer};
pub use sink::{AlertSink, LogSink};
