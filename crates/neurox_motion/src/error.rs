//! Motion error types
//!
//! None of these are fatal to the engine. Target and value errors are
//! recovered per task and per frame; they surface only in logs.

use crate::property::Property;
use thiserror::Error;

/// Failure to write a property onto a target
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TargetError {
    /// The target was removed or detached from its host
    #[error("target is detached")]
    Detached,

    /// The target's lock was poisoned by a panicking writer
    #[error("target lock poisoned")]
    Poisoned,

    /// The target does not expose this property
    #[error("target does not support property {0}")]
    Unsupported(Property),

    /// The value is the wrong shape for the property
    #[error("cannot write {value} to {property}")]
    Malformed { property: Property, value: String },
}

/// Recoverable motion failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    /// Target missing or detached at schedule time or at a tick
    #[error("invalid target: {0}")]
    InvalidTarget(#[from] TargetError),

    /// Easing name not in the easing library
    #[error("unknown easing {0:?}")]
    UnknownEasing(String),

    /// A source value could not be read as a number
    #[error("malformed value {raw:?} for {property}")]
    MalformedValue { property: Property, raw: String },
}

/// Failure to load a [`crate::config::MotionConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read motion config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse motion config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for motion operations
pub type Result<T> = std::result::Result<T, MotionError>;
