//! Bulk sync payloads.
//!
//! [`crate::RecordContainer::update_all`] accepts several payload shapes:
//!
//! - a JSON array of field maps
//! - a single JSON field map
//! - an envelope object `{ "notes": ..., "entries": [...] }`, where the
//!   sibling keys of `entries` are container metadata
//! - any of the above already parsed, or as JSON text
//!
//! An object is an envelope only when its `entries` value is an array.

use crate::error::{CoreError, CoreResult};
use recordstore_codec::{field_map_from_json, FieldMap, Value};

/// Key holding the entry list inside an envelope.
pub const ENTRIES_KEY: &str = "entries";

/// Input to a bulk sync.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkInput {
    /// JSON text of any supported shape.
    Text(String),
    /// Parsed JSON of any supported shape.
    Json(serde_json::Value),
    /// A sequence of field maps.
    Entries(Vec<FieldMap>),
    /// A single field map.
    Single(FieldMap),
}

impl From<&str> for BulkInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for BulkInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<serde_json::Value> for BulkInput {
    fn from(json: serde_json::Value) -> Self {
        Self::Json(json)
    }
}

impl From<Vec<FieldMap>> for BulkInput {
    fn from(entries: Vec<FieldMap>) -> Self {
        Self::Entries(entries)
    }
}

impl From<FieldMap> for BulkInput {
    fn from(entry: FieldMap) -> Self {
        Self::Single(entry)
    }
}

/// A normalized bulk payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Batch {
    /// Envelope metadata; `None` when the payload was not an envelope.
    pub metadata: Option<FieldMap>,
    /// Entries in payload order.
    pub entries: Vec<FieldMap>,
}

impl Batch {
    /// Normalizes any supported input shape.
    pub fn parse(input: BulkInput) -> CoreResult<Self> {
        match input {
            BulkInput::Text(text) => {
                let json: serde_json::Value =
                    serde_json::from_str(&text).map_err(recordstore_codec::CodecError::from)?;
                Self::from_json(&json)
            }
            BulkInput::Json(json) => Self::from_json(&json),
            BulkInput::Entries(entries) => Ok(Self {
                metadata: None,
                entries,
            }),
            BulkInput::Single(entry) => Self::from_field_map(entry),
        }
    }

    fn from_json(json: &serde_json::Value) -> CoreResult<Self> {
        match json {
            serde_json::Value::Array(items) => Ok(Self {
                metadata: None,
                entries: entries_from_json(items)?,
            }),
            serde_json::Value::Object(obj) => match obj.get(ENTRIES_KEY) {
                Some(serde_json::Value::Array(items)) => {
                    let metadata = obj
                        .iter()
                        .filter(|(k, _)| k.as_str() != ENTRIES_KEY)
                        .map(|(k, v)| (k.clone(), Value::from_json(v)))
                        .collect();
                    Ok(Self {
                        metadata: Some(metadata),
                        entries: entries_from_json(items)?,
                    })
                }
                _ => Ok(Self {
                    metadata: None,
                    entries: vec![field_map_from_json(json)?],
                }),
            },
            _ => Err(CoreError::invalid_payload(
                "expected an array of entries, an entry object or an envelope",
            )),
        }
    }

    // A field map can be an envelope too, when it carries an entry list.
    fn from_field_map(mut entry: FieldMap) -> CoreResult<Self> {
        if !matches!(entry.get(ENTRIES_KEY), Some(Value::List(_))) {
            return Ok(Self {
                metadata: None,
                entries: vec![entry],
            });
        }
        let Some(Value::List(items)) = entry.remove(ENTRIES_KEY) else {
            return Err(CoreError::invalid_payload("envelope entries must be a list"));
        };
        let entries = items
            .iter()
            .enumerate()
            .map(|(position, item)| {
                recordstore_codec::field_map_from_value(item).ok_or_else(|| {
                    CoreError::invalid_payload(format!("entry {position} is not a map"))
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(Self {
            metadata: Some(entry),
            entries,
        })
    }

    /// Returns true if the batch has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn entries_from_json(items: &[serde_json::Value]) -> CoreResult<Vec<FieldMap>> {
    items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            if item.is_object() {
                Ok(field_map_from_json(item)?)
            } else {
                Err(CoreError::invalid_payload(format!(
                    "entry {position} is not an object"
                )))
            }
        })
        .collect()
}
