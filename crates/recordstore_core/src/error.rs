//! Error types for recordstore core.

use crate::types::SequenceNumber;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in container operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Codec error while converting a payload.
    #[error("codec error: {0}")]
    Codec(#[from] recordstore_codec::CodecError),

    /// A key is not a 36-character hyphenated UUID.
    #[error("key does not appear to be a string UUID: {key:?}")]
    InvalidKey {
        /// The rejected key, as given.
        key: String,
    },

    /// A record carries an empty (nil) UID.
    #[error("record has empty UUID")]
    EmptyUid,

    /// No UID could be determined for an update.
    #[error("record missing UID")]
    MissingUid,

    /// No record with this UID is contained.
    #[error("record not found contained within: {uid}")]
    NotFound {
        /// The UID that was looked up.
        uid: String,
    },

    /// A proposed order is not a permutation of the current order.
    #[error("invalid order: {message}")]
    InvalidOrder {
        /// Which check failed.
        message: String,
    },

    /// The same UID appears twice in one bulk payload.
    #[error("duplicate record UID in payload: {uid}")]
    DuplicateUid {
        /// The repeated UID.
        uid: String,
    },

    /// A bulk payload has an unsupported shape.
    #[error("invalid payload: {message}")]
    InvalidPayload {
        /// Description of the problem.
        message: String,
    },

    /// A change feed no longer holds events a consumer has not seen.
    #[error("change feed dropped events after seq:{cursor}; next available is seq:{next}")]
    EventsDropped {
        /// Last sequence the consumer applied.
        cursor: u64,
        /// First sequence the feed can still deliver.
        next: u64,
    },
}

impl CoreError {
    /// Creates an invalid key error.
    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey { key: key.into() }
    }

    /// Creates a not found error.
    pub fn not_found(uid: impl ToString) -> Self {
        Self::NotFound {
            uid: uid.to_string(),
        }
    }

    /// Creates an invalid order error.
    pub fn invalid_order(message: impl Into<String>) -> Self {
        Self::InvalidOrder {
            message: message.into(),
        }
    }

    /// Creates an invalid payload error.
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            message: message.into(),
        }
    }

    /// Creates an events-dropped error.
    pub fn events_dropped(cursor: SequenceNumber, next: SequenceNumber) -> Self {
        Self::EventsDropped {
            cursor: cursor.as_u64(),
            next: next.as_u64(),
        }
    }

    /// Returns true for errors raised by input validation.
    ///
    /// Validation errors are always raised before any state is changed.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidKey { .. }
                | Self::EmptyUid
                | Self::MissingUid
                | Self::InvalidOrder { .. }
                | Self::DuplicateUid { .. }
                | Self::InvalidPayload { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_key() {
        let err = CoreError::invalid_key("abc");
        assert_eq!(
            err.to_string(),
            "key does not appear to be a string UUID: \"abc\""
        );
    }

    #[test]
    fn validation_classification() {
        assert!(CoreError::EmptyUid.is_validation());
        assert!(CoreError::invalid_order("duplicate keys in order").is_validation());
        assert!(!CoreError::not_found("x").is_validation());
        assert!(!CoreError::events_dropped(SequenceNumber::new(2), SequenceNumber::new(5))
            .is_validation());
    }

    #[test]
    fn dropped_events_name_both_sequences() {
        let err = CoreError::events_dropped(SequenceNumber::new(2), SequenceNumber::new(5));
        assert_eq!(
            err.to_string(),
            "change feed dropped events after seq:2; next available is seq:5"
        );
    }
}
