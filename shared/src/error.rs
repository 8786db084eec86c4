//! Cross-cutting error taxonomy shared by the scheduling core and the service layer.

use thiserror::Error;

/// Errors raised at the seams between the core and its collaborators.
///
/// The tick loop itself never propagates these outward: `BufferOverflow` and
/// `UnknownVehicle` are folded into counters and `tracing` events instead. They exist as a
/// type so command handlers and tests can match on *why* something didn't happen.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("no admissible buffer lane for color {color}")]
    BufferOverflow { color: String },

    #[error("oven queue referenced unknown vehicle {car_id}")]
    UnknownVehicle { car_id: u64 },

    #[error("persistence operation failed: {0}")]
    PersistenceTransient(String),

    #[error("reset requested while the tick loop is running")]
    ResetWhileRunning,

    #[error("required configuration missing: {0}")]
    ConfigMissing(String),

    #[error("unknown buffer lane id: {0}")]
    UnknownBuffer(String),

    #[error("unknown color: {0}")]
    UnknownColor(String),
}
