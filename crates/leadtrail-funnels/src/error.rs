//! Error types for funnel tables
//!
//! Every variant is a data-authoring mistake. They surface when a registry is
//! built, never while events are being tracked.

use thiserror::Error;

/// Errors found while loading or validating funnel tables
#[derive(Debug, Error)]
pub enum FunnelError {
    /// Two funnels share an id
    #[error("Duplicate funnel id: {0}")]
    DuplicateFunnel(String),

    /// A funnel has no id or no stages
    #[error("Funnel '{0}' is empty: it needs an id and at least one stage")]
    EmptyFunnel(String),

    /// Stage ordinals are not exactly 1..=N in order
    #[error("Funnel '{funnel}': expected stage {expected}, found stage {found}")]
    StageOrdinal {
        funnel: String,
        expected: u32,
        found: u32,
    },

    /// A stage is missing required content
    #[error("Funnel '{funnel}', stage {stage}: {message}")]
    InvalidStage {
        funnel: String,
        stage: u32,
        message: String,
    },

    /// Event name is not a snake_case identifier
    #[error("Funnel '{funnel}', stage {stage}: invalid event name '{event}'")]
    InvalidEventName {
        funnel: String,
        stage: u32,
        event: String,
    },

    /// The same raw event would satisfy two stages
    #[error("Funnel '{funnel}': event '{event}' is assigned to stage {first} and stage {second}")]
    DuplicateEvent {
        funnel: String,
        event: String,
        first: u32,
        second: u32,
    },

    /// Conversion flags are inconsistent
    #[error("Funnel '{funnel}', stage {stage}: {message}")]
    InvalidConversion {
        funnel: String,
        stage: u32,
        message: String,
    },

    /// Benchmark key or rate is unusable
    #[error("Funnel '{funnel}': invalid benchmark '{key}': {message}")]
    InvalidBenchmark {
        funnel: String,
        key: String,
        message: String,
    },

    /// Funnel not found in a registry
    #[error("Funnel not found: {0}")]
    NotFound(String),

    /// Authoring file is not valid JSON for the funnel schema
    #[error("Failed to parse funnel tables: {0}")]
    Parse(#[from] serde_json::Error),

    /// Authoring file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for funnel operations
pub type Result<T> = std::result::Result<T, FunnelError>;
