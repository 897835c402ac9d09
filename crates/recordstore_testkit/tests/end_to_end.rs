//! End-to-end tests: containers feeding a catalog through the change feed.

use recordstore_catalog::{
    IndexOverrides, IndexSelection, IndexType, Query, QueryOptions, NAME_INDEX, PARENT_INDEX,
};
use recordstore_codec::{FieldMap, Value};
use recordstore_core::{
    ChangeFeed, ContainerConfig, ContainerSnapshot, EventSink, RecordContainer, RecordUid,
};
use recordstore_testkit::prelude::*;
use recordstore_testkit::scenarios::{
    article_entry, article_schema, entry, note_schema, ARTICLE, NOTE,
};
use std::sync::Arc;

const UID_A: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";
const UID_B: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";
const UID_C: &str = "9b2d3e4f-1a2b-4c3d-8e9f-0a1b2c3d4e5f";

fn uid(text: &str) -> RecordUid {
    RecordUid::parse(text).unwrap()
}

fn payload() -> String {
    format!(
        r#"{{
            "title": "Reading list",
            "entries": [
                {{"record_uid": "{UID_A}", "title": "Rust in practice", "body": "Ownership and borrowing", "tags": ["rust", "systems"], "year": 2021}},
                {{"record_uid": "{UID_B}", "title": "Gardening", "body": "Tomatoes need sun", "tags": ["garden"], "year": 2019}},
                {{"record_uid": "{UID_C}", "title": "Rust async", "body": "Futures and executors", "tags": ["rust", "async"], "year": 2023, "_draft": true}}
            ]
        }}"#
    )
}

fn synced_harness() -> (IntegrationHarness, recordstore_core::SharedContainer) {
    let mut harness = IntegrationHarness::new(&[article_schema()]);
    let container = harness.add_container(ContainerConfig::new().schema(ARTICLE));
    container.write().update_all(payload().as_str()).unwrap();
    harness.sync();
    (harness, container)
}

#[test]
fn bulk_payload_is_searchable() {
    let (harness, container) = synced_harness();
    harness.verify_indexed();
    assert_eq!(container.read().metadata().get("title"), Some(&Value::from("Reading list")));
    assert!(container.read().get(UID_C).unwrap().get("_draft").is_none());

    let (count, uids) = harness
        .catalog
        .query(&Query::contains("text.TextLine.title", "rust"), &QueryOptions::new())
        .unwrap();
    assert_eq!(count, 2);
    assert_eq!(uids, vec![uid(UID_A), uid(UID_C)]);

    let (count, _) = harness
        .catalog
        .query(&Query::contains("text.Text.body", "tomatoes"), &QueryOptions::new())
        .unwrap();
    assert_eq!(count, 1);

    let (_, uids) = harness
        .catalog
        .query(&Query::contains("keyword.Set.tags", "async"), &QueryOptions::new())
        .unwrap();
    assert_eq!(uids, vec![uid(UID_C)]);
}

#[test]
fn queries_combine_sort_and_limit() {
    let (harness, _) = synced_harness();

    let rust_after_2020 = Query::contains("keyword.Set.tags", "rust")
        .and(Query::ge("field.Int.year", 2020));
    let (count, _) = harness
        .catalog
        .query(&rust_after_2020, &QueryOptions::new())
        .unwrap();
    assert_eq!(count, 2);

    let options = QueryOptions::new()
        .sort_by("field.Int.year")
        .reverse(true)
        .limit(2);
    let (count, uids) = harness
        .catalog
        .query(&Query::ge("field.Int.year", 0), &options)
        .unwrap();
    assert_eq!(count, 3);
    assert_eq!(uids, vec![uid(UID_C), uid(UID_A)]);

    let (_, uids) = harness
        .catalog
        .query(
            &Query::contains("keyword.Set.tags", "rust").not(),
            &QueryOptions::new(),
        )
        .unwrap();
    assert_eq!(uids, vec![uid(UID_B)]);

    let mut terms = FieldMap::new();
    terms.insert("field.Int.year".to_string(), Value::from(2019));
    let (count, uids) = harness.catalog.search(&terms).unwrap();
    assert_eq!((count, uids), (1, vec![uid(UID_B)]));
}

#[test]
fn records_are_indexed_by_location() {
    let (harness, container) = synced_harness();
    let parent = container.read().id().to_string();

    let (count, _) = harness
        .catalog
        .query(&Query::eq(PARENT_INDEX, parent.as_str()), &QueryOptions::new())
        .unwrap();
    assert_eq!(count, 3);

    let (_, uids) = harness
        .catalog
        .query(&Query::eq(NAME_INDEX, UID_B), &QueryOptions::new())
        .unwrap();
    assert_eq!(uids, vec![uid(UID_B)]);
}

#[test]
fn resync_with_fewer_entries_unindexes_removed_records() {
    let (mut harness, container) = synced_harness();
    let entries = vec![article_entry(uid(UID_B), "Gardening", "Tomatoes need sun", 2019)];
    container.write().update_all(entries).unwrap();
    harness.sync();

    harness.verify_indexed();
    assert_eq!(harness.catalog.len(), 1);
    let (count, _) = harness
        .catalog
        .query(&Query::contains("keyword.Set.tags", "rust"), &QueryOptions::new())
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn shared_indexes_survive_unbinding_one_schema() {
    let mut harness = IntegrationHarness::new(&[article_schema(), note_schema()]);
    let articles = harness.add_container(ContainerConfig::new().schema(ARTICLE));
    let notes = harness.add_container(ContainerConfig::new().schema(NOTE));
    articles
        .write()
        .update(&article_entry(RecordUid::new(), "Shared title", "body", 2020), false)
        .unwrap();
    notes
        .write()
        .update(
            &entry(RecordUid::new(), [("title", Value::from("Shared title")), ("priority", Value::from(1))]),
            false,
        )
        .unwrap();
    harness.sync();

    let (count, _) = harness
        .catalog
        .query(&Query::contains("text.TextLine.title", "shared"), &QueryOptions::new())
        .unwrap();
    assert_eq!(count, 2);

    harness.catalog.unbind(NOTE, true).unwrap();
    assert!(harness.catalog.get("text.TextLine.title").is_some());
    assert!(harness.catalog.get("field.Int.priority").is_none());
    assert_eq!(
        harness.catalog.owners("text.TextLine.title").unwrap().len(),
        1
    );
}

#[test]
fn overrides_change_the_indexes_of_a_field() {
    let mut harness = IntegrationHarness::new(&[]);
    let schema = article_schema();
    let mut overrides = IndexOverrides::new();
    overrides.insert("title".to_string(), IndexSelection::from(IndexType::Field));
    overrides.insert("body".to_string(), IndexSelection::Omit);
    let info = harness
        .catalog
        .bind(&schema, &["year"], Some(&overrides))
        .unwrap();
    assert_eq!(info.field("title").unwrap().indexes, vec!["field.TextLine.title"]);
    assert!(info.field("body").unwrap().indexes.is_empty());
    assert!(info.field("year").unwrap().indexes.is_empty());

    let container = harness.add_container(ContainerConfig::new().schema(ARTICLE));
    container
        .write()
        .update(&article_entry(RecordUid::new(), "Exact title", "body", 2020), false)
        .unwrap();
    harness.sync();

    let (count, _) = harness
        .catalog
        .query(&Query::eq("field.TextLine.title", "Exact title"), &QueryOptions::new())
        .unwrap();
    assert_eq!(count, 1);
    assert!(harness
        .catalog
        .query(&Query::contains("text.TextLine.title", "exact"), &QueryOptions::new())
        .is_err());
}

#[test]
fn snapshot_restores_into_a_fresh_container() {
    let (_, container) = synced_harness();
    let bytes = container.read().snapshot().to_cbor().unwrap();

    let feed = Arc::new(ChangeFeed::new());
    let restored: RecordContainer = ContainerSnapshot::from_cbor(&bytes)
        .unwrap()
        .into_container(
            ContainerConfig::new().schema(ARTICLE),
            feed.clone() as Arc<dyn EventSink>,
        )
        .unwrap();

    assert_eq!(feed.latest_sequence().as_u64(), 0);
    assert_eq!(restored.id(), container.read().id());
    assert_eq!(restored.keys(), container.read().keys());
    assert_eq!(restored.to_json(), container.read().to_json());
    assert_container_consistent(&restored);
}
