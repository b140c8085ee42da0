use pagewright_store::{Collection, DurableStore, JsonFileStore, Record, StoreError, TxMode};
use serde_json::{json, Value};

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

#[test]
fn test_file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("project.json");

    {
        let mut store = JsonFileStore::open(&path).unwrap();
        store
            .add(
                Collection::Pages,
                record(json!({"id": "home", "projectId": "proj", "slug": "home"})),
            )
            .unwrap();
        store
            .add(
                Collection::ComponentInstances,
                record(json!({"id": "i1", "pageId": "home", "order": 0})),
            )
            .unwrap();
    }

    let store = JsonFileStore::open(&path).unwrap();
    let dyn_store: &dyn DurableStore = &store;
    let instances = dyn_store
        .where_field(Collection::ComponentInstances, "pageId")
        .equals("home")
        .unwrap();

    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0]["order"], json!(0));
}

#[test]
fn test_rolled_back_transaction_is_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("project.json");

    let mut store = JsonFileStore::open(&path).unwrap();
    store
        .add(Collection::Pages, record(json!({"id": "home"})))
        .unwrap();

    let result = store.transaction(
        TxMode::ReadWrite,
        &[Collection::Pages],
        &mut |tx: &mut dyn DurableStore| {
            tx.delete(Collection::Pages, "home")?;
            Err(StoreError::Unavailable("simulated".to_string()))
        },
    );
    assert!(result.is_err());

    let reopened = JsonFileStore::open(&path).unwrap();
    assert!(reopened.get(Collection::Pages, "home").unwrap().is_some());
}
