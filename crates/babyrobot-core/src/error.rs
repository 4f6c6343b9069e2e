//! Error types for the Baby Robot toolkit

use thiserror::Error;

/// Core error type for grid-world operations
#[derive(Error, Debug)]
pub enum BabyRobotError {
    /// Structurally invalid configuration, detected at construction
    #[error("Configuration error: {0}")]
    Config(String),

    /// Action outside the action enumeration or not allowed by the action space
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Direction bitfield outside `0..=15`
    #[error("Invalid direction bitfield: {0}")]
    InvalidDirection(u8),

    /// Coordinate outside `[0,width) x [0,height)`
    #[error("Cell ({x},{y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        /// Queried column
        x: usize,
        /// Queried row
        y: usize,
        /// Grid width
        width: usize,
        /// Grid height
        height: usize,
    },

    /// Invalid state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Environment-related errors
    #[error("Environment error: {0}")]
    Environment(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for grid-world operations
pub type Result<T> = std::result::Result<T, BabyRobotError>;
