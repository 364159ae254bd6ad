//! Error types for the hazard arbiter.
//!
//! The arbitration path itself never fails: malformed or unroutable input is
//! dropped and logged. Errors surface only from message decoding and from the
//! constructors that validate configuration and the asset catalog.

use thiserror::Error;

/// Errors produced while decoding input or validating startup data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArbiterError {
    /// The inbound envelope is not valid JSON or lacks a required part.
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// A payload field is present but cannot be interpreted.
    #[error("Invalid field {field}: {reason}")]
    InvalidField {
        /// Wire name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The application id does not name a known hazard type.
    #[error("Unknown hazard application id: {0}")]
    UnknownHazardType(u64),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The asset catalog has no entry for an image or sound cue.
    #[error("Asset catalog has no entry for {0}")]
    MissingAsset(String),

    /// The asset catalog document could not be parsed.
    #[error("Asset catalog could not be parsed: {0}")]
    CatalogParse(String),
}

impl ArbiterError {
    /// Create a malformed message error.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedMessage(reason.into())
    }

    /// Create an invalid field error.
    #[must_use]
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }

    /// Create a missing asset error.
    #[must_use]
    pub fn missing_asset(name: impl Into<String>) -> Self {
        Self::MissingAsset(name.into())
    }

    /// Whether the error means the input should be silently ignored
    /// rather than reported as a fault.
    pub fn is_ignorable_input(&self) -> bool {
        matches!(
            self,
            Self::MalformedMessage(_) | Self::InvalidField { .. } | Self::UnknownHazardType(_)
        )
    }
}

impl From<serde_json::Error> for ArbiterError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedMessage(err.to_string())
    }
}

impl From<serde_yaml::Error> for ArbiterError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::CatalogParse(err.to_string())
    }
}

/// Result type alias for arbiter operations.
pub type ArbiterResult<T> = std::result::Result<T, ArbiterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ArbiterError::invalid_field("Severity", "not a number");
        assert_eq!(err.to_string(), "Invalid field Severity: not a number");

        let err = ArbiterError::UnknownHazardType(99);
        assert_eq!(err.to_string(), "Unknown hazard application id: 99");
    }

    #[test]
    fn test_ignorable_classification() {
        assert!(ArbiterError::malformed("eof").is_ignorable_input());
        assert!(ArbiterError::UnknownHazardType(4).is_ignorable_input());
        assert!(!ArbiterError::invalid_configuration("zero").is_ignorable_input());
        assert!(!ArbiterError::missing_asset("Splash").is_ignorable_input());
    }
}
