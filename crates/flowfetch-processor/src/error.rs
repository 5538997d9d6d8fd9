//! Fetch error types.

use std::num::ParseIntError;

use strum::IntoStaticStr;

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Why a unit was routed to failure.
#[derive(Debug, thiserror::Error, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FetchError {
    /// A property expression could not be evaluated.
    #[error("cannot evaluate {property}: {source}")]
    Expression {
        property: &'static str,
        #[source]
        source: flowfetch_core::Error,
    },

    /// A required property evaluated to an empty value.
    #[error("{property} evaluated to an empty value")]
    MissingParameter { property: &'static str },

    /// A byte index is not a non-negative integer.
    #[error("invalid {property} {value:?}: {source}")]
    InvalidByteIndex {
        property: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// The last byte index is before the first.
    #[error("last byte index {end} is less than first byte index {start}")]
    InvertedRange { start: u64, end: u64 },

    /// The remote call or the content transfer failed.
    #[error("failed to retrieve object: {0}")]
    Retrieval(#[source] flowfetch_core::Error),
}

impl FetchError {
    /// Broad class of the failure: `parameter`, `range` or `retrieval`.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Expression { .. }
            | Self::MissingParameter { .. }
            | Self::InvalidByteIndex { .. } => "parameter",
            Self::InvertedRange { .. } => "range",
            Self::Retrieval(_) => "retrieval",
        }
    }

    /// Variant name, for structured logs.
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

impl From<flowfetch_core::Error> for FetchError {
    fn from(err: flowfetch_core::Error) -> Self {
        Self::Retrieval(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        let parse = "x".parse::<u64>().unwrap_err();
        let err = FetchError::InvalidByteIndex {
            property: "range start",
            value: "x".into(),
            source: parse,
        };
        assert_eq!(err.category(), "parameter");
        assert_eq!(err.kind(), "invalid_byte_index");

        let err = FetchError::InvertedRange { start: 5, end: 1 };
        assert_eq!(err.category(), "range");
        assert_eq!(
            err.to_string(),
            "last byte index 1 is less than first byte index 5"
        );

        let err = FetchError::from(flowfetch_core::Error::network_error());
        assert_eq!(err.category(), "retrieval");
        assert_eq!(err.kind(), "retrieval");
    }
}
