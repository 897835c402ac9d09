//! Record identifiers.

use crate::error::{CoreError, CoreResult};
use recordstore_codec::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Length of the hyphenated UUID form, the only accepted key shape.
pub const UID_LENGTH: usize = 36;

/// Field name carrying a record's UID in field maps and bulk payloads.
pub const UID_KEY: &str = "record_uid";

/// Unique identifier for a record.
///
/// Record UIDs are 128-bit UUIDs that are:
/// - Generated randomly (v4) when not supplied
/// - Immutable once assigned to a record
/// - Written and parsed only in the 36-character hyphenated form
///
/// The nil UUID is representable but is treated as an *empty* UID: a
/// container refuses to store a record carrying it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordUid(Uuid);

impl RecordUid {
    /// Creates a new random record UID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The empty UID.
    #[must_use]
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Creates a record UID from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns true for the empty (nil) UID.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Parses the 36-character hyphenated form.
    ///
    /// An empty string is reported as [`CoreError::EmptyUid`]; any other
    /// shape (simple, braced, URN, wrong length) as
    /// [`CoreError::InvalidKey`].
    pub fn parse(key: &str) -> CoreResult<Self> {
        if key.is_empty() {
            return Err(CoreError::EmptyUid);
        }
        if key.len() != UID_LENGTH {
            return Err(CoreError::invalid_key(key));
        }
        Uuid::try_parse(key)
            .map(Self)
            .map_err(|_| CoreError::invalid_key(key))
    }

    /// Reads a UID from an attribute value; only text values qualify.
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        match value {
            Value::Text(text) => Self::parse(text),
            other => Err(CoreError::invalid_key(format!("<{}>", other.type_name()))),
        }
    }
}

impl Default for RecordUid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecordUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordUid({})", self.0)
    }
}

impl fmt::Display for RecordUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for RecordUid {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RecordUid {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RecordUid> for String {
    fn from(uid: RecordUid) -> Self {
        uid.to_string()
    }
}

impl From<Uuid> for RecordUid {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl From<RecordUid> for Uuid {
    fn from(uid: RecordUid) -> Self {
        uid.0
    }
}

impl From<RecordUid> for Value {
    fn from(uid: RecordUid) -> Self {
        Value::Text(uid.to_string())
    }
}

/// Anything that names a record: a UID, its string form, or a record.
///
/// Container lookups accept any `RecordKey`, so callers can pass whichever
/// they hold. String keys are validated on conversion.
pub trait RecordKey {
    /// Converts this key into a record UID.
    fn to_record_uid(&self) -> CoreResult<RecordUid>;
}

impl RecordKey for RecordUid {
    fn to_record_uid(&self) -> CoreResult<RecordUid> {
        Ok(*self)
    }
}

impl RecordKey for Uuid {
    fn to_record_uid(&self) -> CoreResult<RecordUid> {
        Ok(RecordUid(*self))
    }
}

impl RecordKey for str {
    fn to_record_uid(&self) -> CoreResult<RecordUid> {
        RecordUid::parse(self)
    }
}

impl RecordKey for String {
    fn to_record_uid(&self) -> CoreResult<RecordUid> {
        RecordUid::parse(self)
    }
}

impl<T: RecordKey + ?Sized> RecordKey for &T {
    fn to_record_uid(&self) -> CoreResult<RecordUid> {
        (**self).to_record_uid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_unique() {
        assert_ne!(RecordUid::new(), RecordUid::new());
    }

    #[test]
    fn display_parse_roundtrip() {
        let uid = RecordUid::new();
        let text = uid.to_string();
        assert_eq!(text.len(), UID_LENGTH);
        assert_eq!(RecordUid::parse(&text).unwrap(), uid);
    }

    #[test]
    fn only_hyphenated_form_is_accepted() {
        let uuid = Uuid::new_v4();
        assert!(RecordUid::parse(&uuid.hyphenated().to_string()).is_ok());

        for shape in [
            uuid.simple().to_string(),
            uuid.braced().to_string(),
            uuid.urn().to_string(),
            "not-a-uuid".to_string(),
        ] {
            let err = RecordUid::parse(&shape).unwrap_err();
            assert!(matches!(err, CoreError::InvalidKey { .. }), "{shape}");
        }
    }

    #[test]
    fn empty_string_is_empty_uid() {
        assert!(matches!(RecordUid::parse(""), Err(CoreError::EmptyUid)));
    }

    #[test]
    fn nil_parses_but_reports_nil() {
        let uid = RecordUid::parse("00000000-0000-0000-0000-000000000000").unwrap();
        assert!(uid.is_nil());
        assert_eq!(uid, RecordUid::nil());
    }

    #[test]
    fn from_value_requires_text() {
        let uid = RecordUid::new();
        assert_eq!(RecordUid::from_value(&Value::from(uid)).unwrap(), uid);
        assert!(RecordUid::from_value(&Value::Integer(1)).is_err());
    }

    #[test]
    fn serde_uses_hyphenated_string() {
        let uid = RecordUid::new();
        let json = serde_json::to_string(&uid).unwrap();
        assert_eq!(json, format!("\"{uid}\""));
        let back: RecordUid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uid);
        assert!(serde_json::from_str::<RecordUid>("\"abc\"").is_err());
    }

    #[test]
    fn record_key_impls_agree() {
        let uid = RecordUid::new();
        let text = uid.to_string();
        assert_eq!(uid.to_record_uid().unwrap(), uid);
        assert_eq!(text.as_str().to_record_uid().unwrap(), uid);
        assert_eq!(text.to_record_uid().unwrap(), uid);
        assert_eq!(uid.as_uuid().to_record_uid().unwrap(), uid);
    }
}
