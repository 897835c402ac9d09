//! Test fixtures and container helpers.
//!
//! Provides containers wired to a change feed, plus common schemas and
//! pre-populated scenarios.

use recordstore_core::{
    ChangeFeed, ContainerConfig, EventKind, RecordContainer, RecordEvent, SequenceNumber,
};
use std::sync::Arc;

/// A container whose events are captured by a change feed.
pub struct TestContainer {
    /// The container instance.
    pub container: RecordContainer,
    /// The feed the container emits to.
    pub feed: Arc<ChangeFeed>,
    cursor: SequenceNumber,
}

impl TestContainer {
    /// Creates a container with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// Creates a container with a specific configuration.
    pub fn with_config(config: ContainerConfig) -> Self {
        let feed = Arc::new(ChangeFeed::new());
        let container = RecordContainer::with_sink(config, feed.clone());
        Self {
            container,
            feed,
            cursor: SequenceNumber::default(),
        }
    }

    /// Returns the events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<RecordEvent> {
        let events = self.feed.poll(self.cursor, usize::MAX);
        if let Some(last) = events.last() {
            self.cursor = last.sequence;
        }
        events.into_iter().map(|e| e.event).collect()
    }

    /// Returns the kinds of the events emitted since the last drain.
    pub fn drain_kinds(&mut self) -> Vec<EventKind> {
        self.drain_events().into_iter().map(|e| e.kind).collect()
    }

    /// Returns the number of container-level events emitted since the last
    /// drain, discarding the rest.
    pub fn drain_container_events(&mut self) -> usize {
        self.drain_events()
            .iter()
            .filter(|e| e.is_container_event())
            .count()
    }
}

impl Default for TestContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestContainer {
    type Target = RecordContainer;

    fn deref(&self) -> &Self::Target {
        &self.container
    }
}

impl std::ops::DerefMut for TestContainer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.container
    }
}

/// Runs a test with a fresh container wired to a change feed.
///
/// # Example
///
/// ```rust
/// use recordstore_testkit::with_test_container;
///
/// with_test_container(|container| {
///     let record = container.create(None).unwrap();
///     container.add(record).unwrap();
///     assert_eq!(container.drain_events().len(), 2);
/// });
/// ```
pub fn with_test_container<F, R>(f: F) -> R
where
    F: FnOnce(&mut TestContainer) -> R,
{
    let mut container = TestContainer::new();
    f(&mut container)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use recordstore_catalog::{
        DottedNameResolver, Field, FieldKind, RecordCatalog, ResolverRegistry, Schema,
    };
    use recordstore_codec::{FieldMap, Value};
    use recordstore_core::{RecordUid, UID_KEY};

    /// Schema name of [`article_schema`].
    pub const ARTICLE: &str = "app.Article";
    /// Schema name of [`note_schema`].
    pub const NOTE: &str = "app.Note";

    /// An article: title, body, tags, year and a binary attachment.
    pub fn article_schema() -> Schema {
        Schema::new(ARTICLE)
            .field(Field::new("title", FieldKind::TextLine).title("Title"))
            .field(Field::new("body", FieldKind::Text).title("Body"))
            .field(Field::new("tags", FieldKind::Set(Box::new(FieldKind::TextLine))))
            .field(Field::new("year", FieldKind::Int))
            .field(Field::new("attachment", FieldKind::Bytes))
    }

    /// A note sharing `title` with [`article_schema`].
    pub fn note_schema() -> Schema {
        Schema::new(NOTE)
            .field(Field::new("title", FieldKind::TextLine))
            .field(Field::new("priority", FieldKind::Int))
    }

    /// Creates a resolver registry knowing `schemas` by dotted name.
    pub fn registry_with(schemas: &[Schema]) -> Arc<ResolverRegistry> {
        let dotted = Arc::new(DottedNameResolver::new());
        for schema in schemas {
            dotted.register(schema.clone());
        }
        Arc::new(ResolverRegistry::with_dotted(dotted))
    }

    /// Creates a catalog with `schemas` registered and bound by default.
    pub fn catalog_with(schemas: &[Schema]) -> RecordCatalog {
        let mut catalog = RecordCatalog::new(registry_with(schemas));
        for schema in schemas {
            catalog
                .bind(schema, &[], None)
                .expect("Failed to bind schema");
        }
        catalog
    }

    /// Builds a bulk sync entry for `uid`.
    pub fn entry<I, K, V>(uid: RecordUid, fields: I) -> FieldMap
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut map: FieldMap = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        map.insert(UID_KEY.to_string(), uid.into());
        map
    }

    /// Builds an article entry.
    pub fn article_entry(uid: RecordUid, title: &str, body: &str, year: i64) -> FieldMap {
        entry(
            uid,
            [
                ("title", Value::from(title)),
                ("body", Value::from(body)),
                ("year", Value::from(year)),
            ],
        )
    }

    /// Creates an article container holding `count` records.
    ///
    /// Records are titled `"Article {i}"`, in order. Setup events are
    /// drained.
    pub fn populated_container(count: usize) -> TestContainer {
        let mut test = TestContainer::with_config(ContainerConfig::new().schema(ARTICLE));
        let entries: Vec<FieldMap> = (0..count)
            .map(|i| {
                let year = 2000 + i64::try_from(i).unwrap_or(0);
                article_entry(RecordUid::new(), &format!("Article {i}"), "lorem ipsum", year)
            })
            .collect();
        test.update_all(entries)
            .expect("Failed to populate container");
        test.drain_events();
        test
    }
}
