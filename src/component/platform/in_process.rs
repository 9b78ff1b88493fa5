//! In-process platform
//!
//! Components compiled into the host binary. Each entry is keyed by the file
//! name it is discovered under, so a host can keep marker files in a
//! component folder and still ship the implementations statically. Entries
//! may also be registered without a lifecycle interface or with a scripted
//! open failure.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use parking_lot::Mutex;
use serde_json::Value;

use super::{ComponentArtifact, ComponentPlatform};
use crate::component::error::{ComponentError, ComponentResult};
use crate::component::lifecycle::ComponentLifecycle;
use crate::component::version::RuntimeVersion;

/// Creates a fresh lifecycle object each time an entry is opened
pub type LifecycleFactory = Box<dyn Fn() -> Box<dyn ComponentLifecycle> + Send + Sync>;

struct Entry {
    metadata: Value,
    factory: Option<LifecycleFactory>,
    open_error: Option<String>,
}

/// Platform serving components that live inside the host process
#[derive(Default)]
pub struct InProcessPlatform {
    entries: HashMap<String, Entry>,
    runtime_version: Option<RuntimeVersion>,
    debug_build: Option<bool>,
    opened: Arc<Mutex<Vec<String>>>,
    closed: Arc<Mutex<Vec<String>>>,
}

impl InProcessPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component served under `file_name`
    pub fn with_component<F>(mut self, file_name: &str, metadata: Value, factory: F) -> Self
    where
        F: Fn() -> Box<dyn ComponentLifecycle> + Send + Sync + 'static,
    {
        self.entries.insert(file_name.to_string(), Entry {
            metadata,
            factory: Some(Box::new(factory)),
            open_error: None,
        });
        self
    }

    /// Register an artifact that opens but exposes no lifecycle interface
    pub fn with_interfaceless(mut self, file_name: &str, metadata: Value) -> Self {
        self.entries.insert(file_name.to_string(), Entry {
            metadata,
            factory: None,
            open_error: None,
        });
        self
    }

    /// Register an artifact whose open always fails with `message`
    pub fn with_open_failure(mut self, file_name: &str, metadata: Value, message: &str) -> Self {
        self.entries.insert(file_name.to_string(), Entry {
            metadata,
            factory: None,
            open_error: Some(message.to_string()),
        });
        self
    }

    /// Report a different host runtime version
    pub fn with_runtime_version(mut self, version: RuntimeVersion) -> Self {
        self.runtime_version = Some(version);
        self
    }

    /// Report a different host build mode
    pub fn with_debug_build(mut self, debug_build: bool) -> Self {
        self.debug_build = Some(debug_build);
        self
    }

    /// File names of every open attempt, in order
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }

    /// File names of every closed artifact, in order
    pub fn closed(&self) -> Vec<String> {
        self.closed.lock().clone()
    }

    /// Number of open attempts for `file_name`
    pub fn open_count(&self, file_name: &str) -> usize {
        self.opened.lock().iter().filter(|name| name.as_str() == file_name).count()
    }

    fn entry(&self, path: &Path) -> Option<(&str, &Entry)> {
        let file_name = path.file_name()?.to_str()?;
        self.entries
            .get_key_value(file_name)
            .map(|(key, entry)| (key.as_str(), entry))
    }
}

impl ComponentPlatform for InProcessPlatform {
    fn is_component_file(&self, path: &Path) -> bool {
        self.entry(path).is_some()
    }

    fn read_metadata(&self, path: &Path) -> ComponentResult<Option<Value>> {
        Ok(self.entry(path).map(|(_, entry)| entry.metadata.clone()))
    }

    fn open(&self, path: &Path) -> ComponentResult<Box<dyn ComponentArtifact>> {
        let (file_name, entry) = self.entry(path)
            .ok_or_else(|| ComponentError::load_failed(path, "no such in-process component"))?;

        self.opened.lock().push(file_name.to_string());

        if let Some(message) = &entry.open_error {
            return Err(ComponentError::load_failed(path, message.clone()));
        }

        Ok(Box::new(InProcessArtifact {
            file_name: file_name.to_string(),
            instance: entry.factory.as_ref().map(|factory| factory()),
            closed: Arc::clone(&self.closed),
        }))
    }

    fn host_runtime_version(&self) -> RuntimeVersion {
        self.runtime_version.unwrap_or_else(RuntimeVersion::host)
    }

    fn host_debug_build(&self) -> bool {
        self.debug_build.unwrap_or(cfg!(debug_assertions))
    }
}

struct InProcessArtifact {
    file_name: String,
    instance: Option<Box<dyn ComponentLifecycle>>,
    closed: Arc<Mutex<Vec<String>>>,
}

impl ComponentArtifact for InProcessArtifact {
    fn lifecycle(&mut self) -> Option<&mut (dyn ComponentLifecycle + 'static)> {
        self.instance.as_deref_mut()
    }

    fn close(mut self: Box<Self>) {
        drop(self.instance.take());
        self.closed.lock().push(self.file_name.clone());
    }
}
