//! End-to-end component loading through the public API

use std::fs;
use std::path::Path;
use std::sync::Arc;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tempfile::tempdir;

use extsys::component::{
    ComponentLifecycle, ComponentLoader, InProcessPlatform, LoadFlags, ObjectRegistry,
    PublishedObject, RuntimeVersion,
};

type Journal = Arc<Mutex<Vec<String>>>;

/// Service published by the storage component
trait Storage: Send + Sync {
    fn backend(&self) -> &str;
}

struct MemoryStorage;

impl Storage for MemoryStorage {
    fn backend(&self) -> &str {
        "memory"
    }
}

struct StorageComponent {
    journal: Journal,
    published: Option<Arc<MemoryStorage>>,
}

impl ComponentLifecycle for StorageComponent {
    fn initialise_event(&mut self, registry: &ObjectRegistry) {
        let storage = Arc::new(MemoryStorage);
        let as_trait: Arc<dyn Storage> = storage.clone();
        registry.add(PublishedObject::new("storage", Arc::clone(&storage)).with_interface(as_trait));
        self.published = Some(storage);
        self.journal.lock().push("init:Storage".to_string());
    }

    fn finalise_event(&mut self, registry: &ObjectRegistry) {
        if let Some(storage) = self.published.take() {
            registry.remove(&storage);
        }
        self.journal.lock().push("final:Storage".to_string());
    }
}

struct IndexerComponent {
    journal: Journal,
}

impl ComponentLifecycle for IndexerComponent {
    fn initialise_event(&mut self, registry: &ObjectRegistry) {
        let backend = registry
            .first::<dyn Storage>()
            .map(|storage| storage.backend().to_string())
            .unwrap_or_else(|| "none".to_string());
        self.journal.lock().push(format!("init:Indexer({})", backend));
    }

    fn initialisation_finished_event(&mut self, _registry: &ObjectRegistry) {
        self.journal.lock().push("finished:Indexer".to_string());
    }

    fn finalise_event(&mut self, _registry: &ObjectRegistry) {
        self.journal.lock().push("final:Indexer".to_string());
    }
}

fn document(name: &str, version: &str, dependencies: Value) -> Value {
    json!({
        "debug": cfg!(debug_assertions),
        "version": RuntimeVersion::host().packed(),
        "className": format!("{}Component", name),
        "MetaData": {
            "Name": name,
            "Version": version,
            "Vendor": "Example",
            "Dependencies": dependencies
        }
    })
}

fn touch(dir: &Path, file_name: &str) {
    fs::write(dir.join(file_name), b"").expect("Failed to create component marker");
}

#[test]
fn test_services_flow_between_components() {
    let dir = tempdir().expect("Failed to create temp directory");
    let journal: Journal = Arc::default();

    let storage_journal = Arc::clone(&journal);
    let indexer_journal = Arc::clone(&journal);
    let platform = InProcessPlatform::new()
        .with_component("indexer.component", document("Indexer", "1.0", json!([{ "Name": "Storage", "Version": "2.0" }])), move || {
            Box::new(IndexerComponent { journal: Arc::clone(&indexer_journal) })
        })
        .with_component("storage.component", document("Storage", "2.1", json!([])), move || {
            Box::new(StorageComponent { journal: Arc::clone(&storage_journal), published: None })
        });
    touch(dir.path(), "indexer.component");
    touch(dir.path(), "storage.component");

    let registry = Arc::new(ObjectRegistry::new());
    let mut loader = ComponentLoader::new(Arc::new(platform), Arc::clone(&registry));

    assert_eq!(loader.add_components(dir.path()), 2);
    loader.load_components();

    let order: Vec<&str> = loader.load_order().map(|c| c.name()).collect();
    assert_eq!(order, vec!["Storage", "Indexer"]);
    assert_eq!(registry.len(), 1);
    assert!(registry.first::<MemoryStorage>().is_some());

    loader.unload_components();

    assert!(registry.is_empty());
    assert_eq!(*journal.lock(), vec![
        "init:Storage",
        "init:Indexer(memory)",
        "finished:Indexer",
        "final:Indexer",
        "final:Storage",
    ]);
}

#[test]
fn test_failures_are_reported_not_fatal() {
    let dir = tempdir().expect("Failed to create temp directory");
    let journal: Journal = Arc::default();

    let storage_journal = Arc::clone(&journal);
    let indexer_journal = Arc::clone(&journal);
    let platform = InProcessPlatform::new()
        .with_component("storage.component", document("Storage", "1.4", json!([])), move || {
            Box::new(StorageComponent { journal: Arc::clone(&storage_journal), published: None })
        })
        .with_component("indexer.component", document("Indexer", "1.0", json!([{ "Name": "Storage", "Version": "2.0" }])), move || {
            Box::new(IndexerComponent { journal: Arc::clone(&indexer_journal) })
        })
        .with_open_failure("broken.component", document("Broken", "1.0", json!([])), "undefined symbol: frobnicate");
    for file in ["storage.component", "indexer.component", "broken.component"] {
        touch(dir.path(), file);
    }

    let mut loader = ComponentLoader::new(Arc::new(platform), Arc::new(ObjectRegistry::new()));
    loader.add_components(dir.path());
    loader.load_components();

    assert_eq!(loader.loaded_count(), 1);

    let indexer = loader.component("Indexer").expect("Indexer discovered");
    assert_eq!(indexer.load_status(), LoadFlags::INCOMPATIBLE_VERSION);

    let broken = loader.component("Broken").expect("Broken discovered");
    assert_eq!(broken.load_status(), LoadFlags::UNABLE_TO_LOAD);
    assert!(broken.load_error().unwrap_or_default().contains("frobnicate"));

    assert!(loader.component("Storage").map_or(false, |c| c.is_loaded()));
    assert_eq!(*journal.lock(), vec!["init:Storage"]);
}

#[test]
fn test_drop_tears_down_loaded_components() {
    let dir = tempdir().expect("Failed to create temp directory");
    let journal: Journal = Arc::default();

    let storage_journal = Arc::clone(&journal);
    let platform = Arc::new(InProcessPlatform::new()
        .with_component("storage.component", document("Storage", "1.0", json!([])), move || {
            Box::new(StorageComponent { journal: Arc::clone(&storage_journal), published: None })
        }));
    touch(dir.path(), "storage.component");

    let registry = Arc::new(ObjectRegistry::new());
    {
        let mut loader = ComponentLoader::new(platform.clone(), Arc::clone(&registry));
        loader.add_components(dir.path());
        loader.load_components();
        assert_eq!(registry.len(), 1);
    }

    assert!(registry.is_empty());
    assert_eq!(platform.closed(), vec!["storage.component".to_string()]);
    assert_eq!(*journal.lock(), vec!["init:Storage", "final:Storage"]);
}
