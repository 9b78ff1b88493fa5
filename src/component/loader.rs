//! Component Loader
//!
//! Discovers component artifacts in one or more folders, resolves their
//! dependencies, opens them in dependency order and drives them through the
//! lifecycle phases. Unloading runs the phases backwards.
//!
//! Failures never abort a batch: each one is recorded as a [`LoadFlags`] bit
//! on the affected descriptor and loading continues with the rest.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use log::{debug, info, warn};

use super::descriptor::{ComponentDescriptor, ComponentId};
use super::error::ComponentResult;
use super::flags::LoadFlags;
use super::lifecycle::LifecyclePhase;
use super::metadata::ComponentMetadata;
use super::platform::{ComponentArtifact, ComponentPlatform, NativePlatform};
use super::registry::ObjectRegistry;
use super::resolver::DependencyResolver;

/// A successfully opened component
struct LoadedComponent {
    component: ComponentId,
    artifact: Box<dyn ComponentArtifact>,
}

/// Discovers, loads and unloads components
pub struct ComponentLoader {
    platform: Arc<dyn ComponentPlatform>,
    registry: Arc<ObjectRegistry>,
    components: Vec<ComponentDescriptor>,
    search_list: HashMap<String, ComponentId>,
    load_order: Vec<LoadedComponent>,
}

impl ComponentLoader {
    /// Create a loader over `platform` publishing into `registry`
    pub fn new(platform: Arc<dyn ComponentPlatform>, registry: Arc<ObjectRegistry>) -> Self {
        Self {
            platform,
            registry,
            components: Vec::new(),
            search_list: HashMap::new(),
            load_order: Vec::new(),
        }
    }

    /// Create a loader for shared-library components
    pub fn native(registry: Arc<ObjectRegistry>) -> Self {
        Self::new(Arc::new(NativePlatform::new()), registry)
    }

    /// The registry handed to every lifecycle hook
    pub fn registry(&self) -> &Arc<ObjectRegistry> {
        &self.registry
    }

    /// Scan `folder` for components, returning how many were added
    ///
    /// Only the folder itself is scanned. Files the platform does not
    /// recognise, or whose metadata is absent or invalid, are skipped.
    pub fn add_components<P: AsRef<Path>>(&mut self, folder: P) -> usize {
        let folder = folder.as_ref();

        let entries = match fs::read_dir(folder) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot scan component folder {}: {}", folder.display(), e);
                return 0;
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .collect();
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut added = 0;

        for path in paths {
            if path.is_dir() || !self.platform.is_component_file(&path) {
                continue;
            }

            match self.read_component(&path) {
                Ok(Some(metadata)) => {
                    self.register(path, metadata);
                    added += 1;
                }
                Ok(None) => debug!("Skipping {}: no component metadata", path.display()),
                Err(e) => debug!("Skipping {}: {}", path.display(), e),
            }
        }

        info!("Discovered {} component(s) in {}", added, folder.display());
        added
    }

    fn read_component(&self, path: &Path) -> ComponentResult<Option<ComponentMetadata>> {
        match self.platform.read_metadata(path)? {
            Some(document) => ComponentMetadata::from_document(document).map(Some),
            None => Ok(None),
        }
    }

    fn register(&mut self, location: PathBuf, metadata: ComponentMetadata) {
        if metadata.debug_build() != self.platform.host_debug_build() {
            warn!(
                "Component {} debug build mismatch (component: {}, host: {})",
                location.display(), metadata.debug_build(), self.platform.host_debug_build()
            );
        }

        let host_version = self.platform.host_runtime_version();
        let component_version = metadata.runtime_version();
        debug!(
            "Component {} runtime version {}, host runtime version {}",
            location.display(), component_version, host_version
        );

        let id = ComponentId(self.components.len());
        let mut component = ComponentDescriptor::new(id, location, metadata);

        if !component_version.is_compatible_with(&host_version) {
            warn!("Component {} built against incompatible runtime {}", component.name(), component_version);
            component.raise(LoadFlags::INCOMPATIBLE_RUNTIME_VERSION);
        }

        if let Some(existing) = self.search_list.get(component.name()) {
            warn!(
                "Component {} at {} clashes with {}",
                component.name(),
                component.location().display(),
                self.components[existing.index()].location().display()
            );
            component.raise(LoadFlags::NAME_CLASH);
        } else {
            self.search_list.insert(component.name().to_string(), id);
        }

        debug!("Registered component {} as {}", component.name(), id);
        self.components.push(component);
    }

    /// Load every eligible component
    pub fn load_components(&mut self) {
        self.load_components_filtered(|_| true);
    }

    /// Load every eligible component accepted by `filter`
    ///
    /// Components rejected by the filter are flagged `DISABLED` and never
    /// opened. Once loading finishes, the initialise phase runs in load order
    /// and the initialisation finished phase in reverse load order.
    pub fn load_components_filtered<F>(&mut self, mut filter: F)
    where
        F: FnMut(&ComponentDescriptor) -> bool,
    {
        let order = DependencyResolver::resolve(&mut self.components, &self.search_list);
        let first_new = self.load_order.len();

        for id in order {
            self.load_component(id, &mut filter);
        }

        self.run_phase(LifecyclePhase::Initialise, first_new);
        self.run_phase(LifecyclePhase::InitialisationFinished, first_new);

        self.report();
    }

    fn load_component<F>(&mut self, id: ComponentId, filter: &mut F)
    where
        F: FnMut(&ComponentDescriptor) -> bool,
    {
        let index = id.index();

        // flagged during resolution or by an earlier pass
        if !self.components[index].load_status().permits_loading() {
            return;
        }

        let flags = DependencyResolver::validate_dependencies(&self.components[index], &self.components);
        self.components[index].raise(flags);
        if !flags.is_empty() {
            debug!("Component {} skipped: {}", self.components[index].name(), flags);
            return;
        }

        if !filter(&self.components[index]) {
            info!("Component {} disabled", self.components[index].name());
            self.components[index].raise(LoadFlags::DISABLED);
            return;
        }

        let component = &mut self.components[index];

        let mut artifact = match self.platform.open(component.location()) {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!("Component {} failed to load: {}", component.name(), e);
                component.set_load_error(e.to_string());
                component.raise(LoadFlags::UNABLE_TO_LOAD);
                return;
            }
        };

        if artifact.lifecycle().is_none() {
            warn!("Component {} does not implement the lifecycle interface", component.name());
            component.raise(LoadFlags::MISSING_INTERFACE);
            artifact.close();
            return;
        }

        info!("Loaded component {} from {}", component.name(), component.location().display());
        component.mark_loaded();
        self.load_order.push(LoadedComponent { component: id, artifact });
    }

    /// Run `phase` over the load order from position `from` onwards
    fn run_phase(&mut self, phase: LifecyclePhase, from: usize) {
        let registry = Arc::clone(&self.registry);
        let components = &self.components;

        let mut run = |loaded: &mut LoadedComponent| {
            debug!("{} -> {}", phase, components[loaded.component.index()].name());
            if let Some(lifecycle) = loaded.artifact.lifecycle() {
                phase.dispatch(lifecycle, &registry);
            }
        };

        let loaded = &mut self.load_order[from..];
        match phase {
            LifecyclePhase::Initialise => loaded.iter_mut().for_each(&mut run),
            LifecyclePhase::InitialisationFinished | LifecyclePhase::Finalise => {
                loaded.iter_mut().rev().for_each(&mut run)
            }
        }
    }

    fn report(&self) {
        let names: Vec<&str> = self.load_order().map(|component| component.name()).collect();
        info!("Component load order: [{}]", names.join(", "));

        for component in self.components.iter().filter(|c| !c.load_status().failures().is_empty()) {
            info!("Component {} not loaded: {}", component.name(), component.load_status().failures());
            if !component.missing_dependencies().is_empty() {
                info!("  missing dependencies: {}", component.missing_dependencies().join(", "));
            }
            if let Some(error) = component.load_error() {
                info!("  load error: {}", error);
            }
        }
    }

    /// Finalise and close every loaded component in reverse load order
    ///
    /// Each component is finalised and its artifact closed before the next
    /// one is visited. Does nothing when nothing is loaded.
    pub fn unload_components(&mut self) {
        if self.load_order.is_empty() {
            return;
        }

        while let Some(mut loaded) = self.load_order.pop() {
            let name = self.components[loaded.component.index()].name();
            debug!("{} -> {}", LifecyclePhase::Finalise, name);
            if let Some(lifecycle) = loaded.artifact.lifecycle() {
                LifecyclePhase::Finalise.dispatch(lifecycle, &self.registry);
            }

            debug!("Closing component {}", name);
            loaded.artifact.close();
        }

        info!("All components unloaded");
    }

    /// Every discovered descriptor, in discovery order
    pub fn components(&self) -> &[ComponentDescriptor] {
        &self.components
    }

    /// The canonical descriptor registered under `name`
    pub fn component(&self, name: &str) -> Option<&ComponentDescriptor> {
        self.search_list.get(name).map(|id| &self.components[id.index()])
    }

    /// Descriptors of loaded components, in load order
    pub fn load_order(&self) -> impl Iterator<Item = &ComponentDescriptor> + '_ {
        self.load_order.iter().map(|loaded| &self.components[loaded.component.index()])
    }

    /// Number of currently loaded components
    pub fn loaded_count(&self) -> usize {
        self.load_order.len()
    }
}

impl Drop for ComponentLoader {
    fn drop(&mut self) {
        self.unload_components();
    }
}
