//! Error types for streaming PCEN

use std::fmt;

/// Errors that can occur while configuring or running the PCEN filter
#[derive(Debug, Clone, PartialEq)]
pub enum PcenError {
    /// Invalid filter configuration or derived coefficient
    Configuration(String),

    /// State or block dimensions do not match
    Shape(String),

    /// Input magnitude outside the valid domain (negative or NaN)
    NumericalDomain(String),

    /// Invalid parameters for a block source or STFT collaborator
    InvalidInput(String),
}

impl fmt::Display for PcenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PcenError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            PcenError::Shape(msg) => write!(f, "Shape error: {}", msg),
            PcenError::NumericalDomain(msg) => write!(f, "Numerical domain error: {}", msg),
            PcenError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for PcenError {}
