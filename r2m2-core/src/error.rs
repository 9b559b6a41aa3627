//! # Error Types for r2m2-core

use crate::location::LocKey;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // Context errors
    #[error("No machine selected; available machines: {available}")]
    NoArchSelected { available: String },

    #[error("Unknown machine '{name}'; available machines: {available}")]
    UnknownArch { name: String, available: String },

    // Location errors
    #[error("Location {0} has no known offset")]
    UnknownLocation(LocKey),

    #[error("Location {key} already at {existing:#x}, cannot move to {requested:#x}")]
    LocationRedefined {
        key: LocKey,
        existing: u64,
        requested: u64,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;
