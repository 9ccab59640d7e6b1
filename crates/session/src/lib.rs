//! Field Session: the one context object that owns every component.
//!
//! # Invariants
//! - The record count is fetched once, before any placement.
//! - A batch lands in the field and the collider index together.
//! - All per-frame work happens inside `FieldSession::tick`.
//! - A failed chunk fetch stops ingest; what is loaded stays usable.

mod config;
mod session;
mod source;

pub use config::{ConfigError, FieldConfig, SpawnPoint};
pub use session::{FieldSession, FrameReport, SessionError, SessionPhase};
pub use source::{
    ChunkedLoader, JsonFileSource, LoaderStatus, MemorySource, RecordSource, SourceError,
};

pub fn crate_info() -> &'static str {
    "vigil-session v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("session"));
    }
}
