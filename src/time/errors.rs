//! Error types for time and timecode conversion

use thiserror::Error;

/// Failure to decode an FCPXML time value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// String is not of the form `"<n>s"` or `"<n>/<d>s"`
    #[error("malformed time value: {0:?}")]
    Malformed(String),

    /// Fraction has a zero denominator
    #[error("time value has zero denominator: {0:?}")]
    ZeroDenominator(String),

    /// Frame duration does not correspond to a supported video rate
    #[error("unsupported frame duration: {0}")]
    UnsupportedFrameDuration(String),
}

/// Failure to build or parse a timecode
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimecodeError {
    /// Negative time cannot be represented as timecode
    #[error("negative time cannot be expressed as timecode: {0}")]
    Negative(String),

    /// String is not `HH:MM:SS:FF` (or `;` drop-frame separator)
    #[error("malformed timecode string: {0:?}")]
    Malformed(String),

    /// A component is out of range for the frame rate
    #[error("invalid timecode component: {0}")]
    InvalidComponent(String),
}
