//! Benchmark utilities.

use rand::seq::SliceRandom;
use rand::Rng;
use recordstore_catalog::{
    DottedNameResolver, Field, FieldKind, RecordCatalog, ResolverRegistry, Schema,
};
use recordstore_codec::{FieldMap, Value};
use recordstore_core::{Record, RecordUid, UID_KEY};
use std::sync::Arc;

/// Schema name used by the generated records.
pub const BENCH_SCHEMA: &str = "bench.Item";

const WORDS: &[&str] = &[
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliet",
    "kilo", "lima", "mike", "november", "oscar", "papa",
];

/// Generate a sentence of `count` random words.
pub fn random_words(count: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| *WORDS.choose(&mut rng).unwrap_or(&"alpha"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Generate a field map with `fields` integer and text attributes.
pub fn random_fields(fields: usize) -> FieldMap {
    let mut rng = rand::thread_rng();
    (0..fields)
        .map(|i| {
            let value = if i % 2 == 0 {
                Value::Integer(rng.gen_range(0..10_000))
            } else {
                Value::Text(random_words(3))
            };
            (format!("field_{i}"), value)
        })
        .collect()
}

/// Generate bulk sync entries with fresh UIDs.
pub fn generate_entries(count: usize, fields: usize) -> Vec<FieldMap> {
    (0..count)
        .map(|_| {
            let mut entry = random_fields(fields);
            entry.insert(UID_KEY.to_string(), RecordUid::new().into());
            entry
        })
        .collect()
}

/// The schema of the generated records.
pub fn bench_schema() -> Schema {
    Schema::new(BENCH_SCHEMA)
        .field(Field::new("title", FieldKind::TextLine))
        .field(Field::new("body", FieldKind::Text))
        .field(Field::new("rank", FieldKind::Int))
        .field(Field::new("tags", FieldKind::List(Box::new(FieldKind::TextLine))))
}

/// Generate records providing [`BENCH_SCHEMA`].
pub fn generate_records(count: usize) -> Vec<Record> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let mut record = Record::new();
            record.provide(BENCH_SCHEMA);
            record.set("title", random_words(4));
            record.set("body", random_words(24));
            record.set("rank", rng.gen_range(0i64..1000));
            let tags: Vec<Value> = (0..3).map(|_| Value::Text(random_words(1))).collect();
            record.set("tags", tags);
            record
        })
        .collect()
}

/// Create a catalog with [`bench_schema`] bound.
pub fn bench_catalog() -> RecordCatalog {
    let schema = bench_schema();
    let dotted = Arc::new(DottedNameResolver::new());
    dotted.register(schema.clone());
    let mut catalog = RecordCatalog::new(Arc::new(ResolverRegistry::with_dotted(dotted)));
    catalog
        .bind(&schema, &[], None)
        .expect("Failed to bind benchmark schema");
    catalog
}
