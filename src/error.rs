//! Error types for the I/O and parsing seams.
//!
//! Gameplay itself never fails: invalid purchases, stale ids and
//! out-of-bounds moves are silent no-ops inside the tick.

use thiserror::Error;

/// Errors that can occur when loading or validating tuning data.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Tuning file could not be read.
    #[error("Failed to read tuning file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing failed.
    #[error("Parse error in tuning data: {0}")]
    Parse(#[from] serde_json::Error),

    /// Parsed values break a balance invariant.
    #[error("Invalid tuning: {0}")]
    Invalid(String),
}

/// Errors that can occur when saving or restoring a session envelope.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Failed to encode session: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to decode session: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Unsupported save version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Errors reported by a narrative generator.
///
/// Never surfaced to the player; the driver substitutes fallback text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NarrativeError {
    #[error("Narrative generator failed: {0}")]
    Generator(String),

    #[error("Narrative generator returned no text")]
    Empty,

    #[error("Narrative request timed out after {waited_ticks} ticks")]
    Timeout { waited_ticks: u64 },

    #[error("Narrative worker disconnected")]
    Disconnected,
}
