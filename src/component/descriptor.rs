//! Component Descriptor
//!
//! In-memory record of one discovered component: identity, dependency edges
//! and accumulated load state. Descriptors are owned by the loader.

use std::fmt;
use std::path::{Path, PathBuf};

use super::flags::LoadFlags;
use super::metadata::ComponentMetadata;
use super::version::VersionNumber;

/// Index of a descriptor within its loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(pub(crate) usize);

impl ComponentId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A resolved dependency edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    /// The component depended upon
    pub component: ComponentId,

    /// Minimum acceptable version of that component
    pub minimum_version: VersionNumber,
}

/// One discovered component
#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    id: ComponentId,
    name: String,
    location: PathBuf,
    metadata: ComponentMetadata,
    dependencies: Vec<DependencyEdge>,
    missing_dependencies: Vec<String>,
    load_flags: LoadFlags,
    is_loaded: bool,
    load_error: Option<String>,
}

impl ComponentDescriptor {
    pub(crate) fn new(id: ComponentId, location: PathBuf, metadata: ComponentMetadata) -> Self {
        Self {
            id,
            name: metadata.name().to_string(),
            location,
            metadata,
            dependencies: Vec::new(),
            missing_dependencies: Vec::new(),
            load_flags: LoadFlags::UNLOADED,
            is_loaded: false,
            load_error: None,
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the artifact this descriptor was created from
    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn metadata(&self) -> &ComponentMetadata {
        &self.metadata
    }

    /// Dependency edges attached during resolution
    pub fn dependencies(&self) -> &[DependencyEdge] {
        &self.dependencies
    }

    /// Declared dependencies that were never discovered
    pub fn missing_dependencies(&self) -> &[String] {
        &self.missing_dependencies
    }

    /// Accumulated load flags
    pub fn load_status(&self) -> LoadFlags {
        self.load_flags
    }

    pub fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    /// Platform error captured when the artifact failed to open
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn version(&self) -> VersionNumber {
        self.metadata.version()
    }

    pub fn vendor(&self) -> String {
        self.metadata.vendor()
    }

    pub fn can_be_disabled(&self) -> bool {
        self.metadata.can_be_disabled()
    }

    /// Lowercase `name.vendor`, used to persist enable/disable choices
    pub fn identifier(&self) -> String {
        format!("{}.{}", self.name, self.metadata.vendor()).to_lowercase()
    }

    /// Version with branch and revision, e.g. `1.2.0-main (4f2a9c1)`
    pub fn version_string(&self) -> String {
        format!(
            "{}-{} ({})",
            self.metadata.details().get("Version").and_then(|v| v.as_str()).unwrap_or_default(),
            self.metadata.branch(),
            self.metadata.revision()
        )
    }

    /// Declared dependencies, one `Name (Version)` per line
    pub fn dependency_summary(&self) -> String {
        self.metadata
            .dependencies()
            .iter()
            .map(|dependency| format!("{} ({})", dependency.name, dependency.version))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Union flags into the accumulated state; flags are never cleared
    pub(crate) fn raise(&mut self, flags: LoadFlags) {
        self.load_flags |= flags;
    }

    pub(crate) fn add_dependency(&mut self, component: ComponentId, minimum_version: VersionNumber) {
        self.dependencies.push(DependencyEdge { component, minimum_version });
    }

    pub(crate) fn add_missing_dependency(&mut self, name: String) {
        self.missing_dependencies.push(name);
    }

    pub(crate) fn mark_loaded(&mut self) {
        self.raise(LoadFlags::LOADED);
        self.is_loaded = true;
    }

    pub(crate) fn set_load_error(&mut self, message: String) {
        self.load_error = Some(message);
    }
}
