//! Mock Component Implementations for Testing
//!
//! A recording lifecycle implementation, metadata builders and a temporary
//! component folder wired to an in-process platform.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::component::lifecycle::ComponentLifecycle;
use crate::component::loader::ComponentLoader;
use crate::component::platform::InProcessPlatform;
use crate::component::registry::{ObjectRegistry, PublishedObject};
use crate::component::version::RuntimeVersion;

/// Shared, ordered record of lifecycle events
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Service every recording component publishes while it is initialised
pub trait OwnedService: Send + Sync {
    fn owner(&self) -> &str;
}

pub struct ComponentService {
    owner: String,
}

impl OwnedService for ComponentService {
    fn owner(&self) -> &str {
        &self.owner
    }
}

/// Component that records every lifecycle event it receives
///
/// Events are logged as `initialise:Name`, `finished:Name`,
/// `finalise:Name`, and `released:Name` when the instance is dropped. During `initialise_event` it also records which services
/// were already published, as `Name<-Owner1,Owner2`.
pub struct RecordingComponent {
    name: String,
    events: EventLog,
    visibility: EventLog,
    service: Option<Arc<ComponentService>>,
}

impl RecordingComponent {
    pub fn new(name: &str, events: EventLog, visibility: EventLog) -> Self {
        Self {
            name: name.to_string(),
            events,
            visibility,
            service: None,
        }
    }
}

impl ComponentLifecycle for RecordingComponent {
    fn initialise_event(&mut self, registry: &ObjectRegistry) {
        let owners: Vec<String> = registry
            .all_of::<dyn OwnedService>()
            .iter()
            .map(|service| service.owner().to_string())
            .collect();
        self.visibility.lock().push(format!("{}<-{}", self.name, owners.join(",")));

        let service = Arc::new(ComponentService { owner: self.name.clone() });
        registry.add(
            PublishedObject::new(self.name.clone(), service.clone())
                .with_interface::<dyn OwnedService>(service.clone()),
        );
        self.service = Some(service);

        self.events.lock().push(format!("initialise:{}", self.name));
    }

    fn initialisation_finished_event(&mut self, _registry: &ObjectRegistry) {
        self.events.lock().push(format!("finished:{}", self.name));
    }

    fn finalise_event(&mut self, registry: &ObjectRegistry) {
        if let Some(service) = self.service.take() {
            registry.remove(&service);
        }
        self.events.lock().push(format!("finalise:{}", self.name));
    }
}

impl Drop for RecordingComponent {
    fn drop(&mut self) {
        self.events.lock().push(format!("released:{}", self.name));
    }
}

/// Metadata document for a component built against the host runtime
pub fn metadata(name: &str, version: &str, dependencies: &[(&str, &str)]) -> Value {
    let dependencies: Vec<Value> = dependencies
        .iter()
        .map(|(name, version)| json!({ "Name": name, "Version": version }))
        .collect();

    json!({
        "debug": cfg!(debug_assertions),
        "version": RuntimeVersion::host().packed(),
        "className": format!("{}Component", name),
        "MetaData": {
            "Name": name,
            "Vendor": "Acme",
            "Version": version,
            "Dependencies": dependencies
        }
    })
}

/// Default file name a component is served under
pub fn file_name(name: &str) -> String {
    format!("{}.component", name.to_lowercase())
}

/// Builder for a temporary component folder
pub struct TestBed {
    dir: TempDir,
    platform: InProcessPlatform,
    events: EventLog,
    visibility: EventLog,
}

impl TestBed {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            platform: InProcessPlatform::new(),
            events: event_log(),
            visibility: event_log(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    fn touch(&self, file_name: &str) {
        fs::write(self.dir.path().join(file_name), b"component").unwrap();
    }

    /// A well-behaved component named `name`
    pub fn component(self, name: &str, version: &str, dependencies: &[(&str, &str)]) -> Self {
        let file = file_name(name);
        self.component_at(&file, name, version, dependencies)
    }

    /// A well-behaved component served under an explicit file name
    pub fn component_at(self, file_name: &str, name: &str, version: &str, dependencies: &[(&str, &str)]) -> Self {
        self.document_at(file_name, name, metadata(name, version, dependencies))
    }

    /// A recording component described by an arbitrary document
    pub fn document_at(mut self, file_name: &str, name: &str, document: Value) -> Self {
        self.touch(file_name);

        let name = name.to_string();
        let events = self.events.clone();
        let visibility = self.visibility.clone();

        self.platform = std::mem::take(&mut self.platform).with_component(file_name, document, move || {
            Box::new(RecordingComponent::new(&name, events.clone(), visibility.clone()))
        });
        self
    }

    /// A component that opens without a lifecycle interface
    pub fn interfaceless(mut self, name: &str, version: &str, dependencies: &[(&str, &str)]) -> Self {
        let file = file_name(name);
        self.touch(&file);
        self.platform = std::mem::take(&mut self.platform)
            .with_interfaceless(&file, metadata(name, version, dependencies));
        self
    }

    /// A component whose open fails
    pub fn failing(mut self, name: &str, version: &str, message: &str) -> Self {
        let file = file_name(name);
        self.touch(&file);
        self.platform = std::mem::take(&mut self.platform)
            .with_open_failure(&file, metadata(name, version, &[]), message);
        self
    }

    /// A plain file that is not served by the platform
    pub fn stray_file(self, file_name: &str) -> Self {
        self.touch(file_name);
        self
    }

    pub fn host_runtime(mut self, version: RuntimeVersion) -> Self {
        self.platform = std::mem::take(&mut self.platform).with_runtime_version(version);
        self
    }

    /// Create a loader and scan the folder
    pub fn build(self) -> Harness {
        let platform = Arc::new(self.platform);
        let registry = Arc::new(ObjectRegistry::new());
        let mut loader = ComponentLoader::new(platform.clone(), registry.clone());
        let discovered = loader.add_components(self.dir.path());

        Harness {
            loader,
            platform,
            registry,
            events: self.events,
            visibility: self.visibility,
            discovered,
            dir: self.dir,
        }
    }
}

/// A loader over a scanned test folder
pub struct Harness {
    pub loader: ComponentLoader,
    pub platform: Arc<InProcessPlatform>,
    pub registry: Arc<ObjectRegistry>,
    pub events: EventLog,
    pub visibility: EventLog,
    pub discovered: usize,
    pub dir: TempDir,
}

impl Harness {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    pub fn visibility(&self) -> Vec<String> {
        self.visibility.lock().clone()
    }

    /// Names of loaded components, in load order
    pub fn load_order(&self) -> Vec<String> {
        self.loader.load_order().map(|c| c.name().to_string()).collect()
    }

    pub fn location(&self, file_name: &str) -> PathBuf {
        self.dir.path().join(file_name)
    }
}
