//! Records and the field-copy whitelist.

mod populate;
mod uid;

pub use populate::{is_copyable_field, populate_fields, storable_attributes};
pub use uid::{RecordKey, RecordUid, UID_KEY, UID_LENGTH};

use crate::error::CoreResult;
use crate::types::ContainerId;
use recordstore_codec::{FieldMap, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A minimal identity-bearing entity.
///
/// A record is its UID, a non-owning handle to the container it lives in, the
/// set of schema names it provides, and a map of attributes. Two records are
/// "the same record" when their UIDs are equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    uid: RecordUid,
    #[serde(default)]
    parent: Option<ContainerId>,
    #[serde(default)]
    schemas: BTreeSet<String>,
    #[serde(default)]
    attributes: FieldMap,
}

impl Record {
    /// Creates a detached record with a fresh random UID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_uid(RecordUid::new())
    }

    /// Creates a detached record with the given UID.
    #[must_use]
    pub fn with_uid(uid: RecordUid) -> Self {
        Self {
            uid,
            parent: None,
            schemas: BTreeSet::new(),
            attributes: FieldMap::new(),
        }
    }

    /// Returns the record UID.
    #[must_use]
    pub fn uid(&self) -> RecordUid {
        self.uid
    }

    /// Returns the record's name within its container (its UID string).
    #[must_use]
    pub fn name(&self) -> String {
        self.uid.to_string()
    }

    /// Returns the container this record was created for or added to.
    #[must_use]
    pub fn parent(&self) -> Option<ContainerId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ContainerId>) {
        self.parent = parent;
    }

    /// Returns the names of the schemas this record provides.
    pub fn schemas(&self) -> impl Iterator<Item = &str> + '_ {
        self.schemas.iter().map(String::as_str)
    }

    /// Returns true if the record provides the named schema.
    #[must_use]
    pub fn provides(&self, schema: &str) -> bool {
        self.schemas.contains(schema)
    }

    /// Marks the record as providing the named schema.
    pub fn provide(&mut self, schema: impl Into<String>) {
        self.schemas.insert(schema.into());
    }

    /// Returns an attribute value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Sets an attribute directly, returning the previous value.
    ///
    /// This is the low-level modification path: no whitelist is applied and
    /// no events are fired.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attributes.insert(name.into(), value.into())
    }

    /// Removes an attribute, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.attributes.remove(name)
    }

    /// Returns all attributes, ordered by name.
    #[must_use]
    pub fn attributes(&self) -> &FieldMap {
        &self.attributes
    }

    /// Copies whitelisted fields from `data`, returning the changed names.
    ///
    /// See [`populate_fields`] for the whitelist.
    pub fn populate(&mut self, data: &FieldMap) -> Vec<String> {
        populate_fields(&mut self.attributes, data)
    }

    /// Returns the record as a field map including its UID, as a bulk
    /// payload entry would carry it.
    #[must_use]
    pub fn to_field_map(&self) -> FieldMap {
        let mut fields = self.attributes.clone();
        fields.insert(UID_KEY.to_string(), Value::from(self.uid));
        fields
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordKey for Record {
    fn to_record_uid(&self) -> CoreResult<RecordUid> {
        Ok(self.uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_detached() {
        let record = Record::new();
        assert!(record.parent().is_none());
        assert!(!record.uid().is_nil());
        assert_eq!(record.name(), record.uid().to_string());
    }

    #[test]
    fn direct_set_bypasses_whitelist() {
        let mut record = Record::new();
        record.set("_private", Value::Null);
        assert_eq!(record.get("_private"), Some(&Value::Null));
    }

    #[test]
    fn populate_reports_changes() {
        let mut record = Record::new();
        let data = FieldMap::from([("title".to_string(), Value::from("George"))]);
        assert_eq!(record.populate(&data), vec!["title".to_string()]);
        assert!(record.populate(&data).is_empty());
    }

    #[test]
    fn schemas_are_a_set() {
        let mut record = Record::new();
        record.provide("app.schemas.Person");
        record.provide("app.schemas.Person");
        assert_eq!(record.schemas().count(), 1);
        assert!(record.provides("app.schemas.Person"));
        assert!(!record.provides("app.schemas.Other"));
    }

    #[test]
    fn field_map_carries_uid() {
        let mut record = Record::new();
        record.set("count", 3);
        let fields = record.to_field_map();
        assert_eq!(fields[UID_KEY], Value::from(record.uid()));
        assert_eq!(fields["count"], Value::Integer(3));
    }
}
