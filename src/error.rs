//! Error types
//!
//! Only input parsing and file I/O are fatal (§7 of SPEC_FULL.md).
//! `FlowImbalance` and `NoFeasibleTree` are logged via `tracing::warn!` at
//! the point of detection rather than surfaced as errors — they are
//! "warn, continue" conditions, not failures. `InfeasibleHydraulics` never
//! escapes the hydraulic evaluator: it is encoded as `None` and absorbed as
//! a cost penalty inside the design evaluator.

use thiserror::Error;

/// Fatal errors that abort a run.
#[derive(Debug, Error)]
pub enum SewerError {
    /// The input file did not match the `Manholes <N>` / `Sections <M>`
    /// text format.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Could not read or write a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding/decoding failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, SewerError>;
