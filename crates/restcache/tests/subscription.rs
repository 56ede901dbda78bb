use restcache::{
    ChangeEvent, Error, RestCache, RowChange,
    config::RestCacheConfig,
    core::{
        obs::{MetricsEvent, MetricsSink, MutationKind, with_metrics_sink},
        query::QueryDescription,
    },
    store::{CacheStore, MemoryStore},
};
use serde_json::json;
use std::{cell::RefCell, io::Write, rc::Rc};

const CONFIG: &str = r#"
    key_prefix = "app"

    [tables."crm.organisation"]
    primary_keys = ["tenant_id", "id"]
"#;

fn cache_from_file() -> RestCache {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(CONFIG.as_bytes()).expect("write config");
    let config = RestCacheConfig::from_path(file.path()).expect("config should load");

    RestCache::new(config).expect("config should validate")
}

fn seeded(cache: &RestCache) -> (MemoryStore, String) {
    let key = cache
        .cache_key(
            &QueryDescription::table("organisation").select("tenant_id,id,name"),
            Some("crm"),
            false,
        )
        .expect("key should build")
        .encode();

    let mut store = MemoryStore::new();
    store.insert(
        key.clone(),
        json!([
            { "tenant_id": "t1", "id": 1, "name": "Acme" },
            { "tenant_id": "t2", "id": 1, "name": "Globex" }
        ]),
    );

    (store, key)
}

#[derive(Default)]
struct RecordingSink {
    mutations: RefCell<Vec<(MutationKind, String, u64, u64, u64)>>,
}

impl MetricsSink for RecordingSink {
    fn record(&self, event: MetricsEvent<'_>) {
        if let MetricsEvent::Mutation {
            kind,
            table,
            inserted,
            updated,
            removed,
        } = event
        {
            self.mutations
                .borrow_mut()
                .push((kind, table.to_string(), inserted, updated, removed));
        }
    }
}

#[test]
fn insert_events_upsert_with_configured_keys() {
    let mut cache = cache_from_file();
    let (mut store, key) = seeded(&cache);
    let change = RowChange::from_json(json!({
        "eventType": "INSERT",
        "schema": "crm",
        "table": "organisation",
        "new": { "tenant_id": "t1", "id": 2, "name": "Initech" },
        "old": {}
    }))
    .expect("payload should deserialize");

    let summary = cache
        .handle_change(&change, &mut store)
        .expect("change should apply");

    assert_eq!(summary.delta.inserted, 1);
    assert_eq!(
        store.get(&key),
        Some(json!([
            { "tenant_id": "t1", "id": 2, "name": "Initech" },
            { "tenant_id": "t1", "id": 1, "name": "Acme" },
            { "tenant_id": "t2", "id": 1, "name": "Globex" }
        ]))
    );
}

#[test]
fn update_events_match_on_the_composite_key() {
    let mut cache = cache_from_file();
    let (mut store, key) = seeded(&cache);
    let change = RowChange {
        event: ChangeEvent::Update,
        schema: "crm".to_string(),
        table: "organisation".to_string(),
        new: json!({ "tenant_id": "t2", "id": 1, "name": "Globex Corp" })
            .as_object()
            .cloned(),
        old: None,
    };

    let summary = cache
        .handle_change(&change, &mut store)
        .expect("change should apply");

    assert_eq!(summary.delta.updated, 1);
    assert_eq!(
        store.get(&key),
        Some(json!([
            { "tenant_id": "t1", "id": 1, "name": "Acme" },
            { "tenant_id": "t2", "id": 1, "name": "Globex Corp" }
        ]))
    );
}

#[test]
fn legacy_delete_events_remove_the_old_record() {
    let mut cache = cache_from_file();
    let (mut store, key) = seeded(&cache);
    let change = RowChange::from_json(json!({
        "type": "DELETE",
        "schema": "crm",
        "table": "organisation",
        "old_record": { "tenant_id": "t1", "id": 1 }
    }))
    .expect("payload should deserialize");

    let sink = Rc::new(RecordingSink::default());
    let summary = with_metrics_sink(sink.clone(), || cache.handle_change(&change, &mut store))
        .expect("change should apply");

    assert_eq!(summary.delta.removed, 1);
    assert_eq!(
        store.get(&key),
        Some(json!([{ "tenant_id": "t2", "id": 1, "name": "Globex" }]))
    );
    assert_eq!(
        *sink.mutations.borrow(),
        vec![(MutationKind::Delete, "organisation".to_string(), 0, 0, 1)]
    );
}

#[test]
fn unconfigured_tables_are_rejected() {
    let mut cache = cache_from_file();
    let (mut store, _) = seeded(&cache);
    let change = RowChange::from_json(json!({
        "eventType": "INSERT",
        "schema": "public",
        "table": "organisation",
        "new": { "tenant_id": "t1", "id": 3 }
    }))
    .expect("payload should deserialize");

    assert_eq!(
        cache.handle_change(&change, &mut store),
        Err(Error::UnknownTable {
            schema: "public".to_string(),
            table: "organisation".to_string(),
        })
    );
}

#[test]
fn events_without_records_are_rejected() {
    let mut cache = cache_from_file();
    let (mut store, _) = seeded(&cache);
    let change = RowChange::from_json(json!({
        "eventType": "UPDATE",
        "schema": "crm",
        "table": "organisation",
        "new": {},
        "old": {}
    }))
    .expect("payload should deserialize");

    assert!(matches!(
        cache.handle_change(&change, &mut store),
        Err(Error::MissingRecord { .. })
    ));
}
