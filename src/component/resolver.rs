//! Dependency Resolver
//!
//! Attaches dependency edges between discovered components and computes a
//! load order in which every component follows all of its dependencies.
//!
//! Resolution is a depth-first, post-order walk. Candidates are walked in
//! discovery order and dependencies in declaration order, so the same input
//! always produces the same order. A component reached again while its own
//! walk is still in progress is part of a cycle; it is flagged
//! `CIRCULAR_DEPENDENCY` and left out of the order.

use std::collections::{HashMap, HashSet};
use log::{debug, warn};

use super::descriptor::{ComponentDescriptor, ComponentId};
use super::flags::LoadFlags;

/// Computes load orders over a set of descriptors
pub struct DependencyResolver;

impl DependencyResolver {
    /// Attach edges, then order the resulting candidates
    pub fn resolve(
        components: &mut [ComponentDescriptor],
        index: &HashMap<String, ComponentId>,
    ) -> Vec<ComponentId> {
        let candidates = Self::attach_dependencies(components, index);
        Self::resolve_order(components, &candidates)
    }

    /// Attach dependency edges for every unflagged component
    ///
    /// A dependency that is not in `index` is recorded as missing and the
    /// dependent is flagged `MISSING_DEPENDENCY`. Returns the components that
    /// are still unflagged, in discovery order.
    pub fn attach_dependencies(
        components: &mut [ComponentDescriptor],
        index: &HashMap<String, ComponentId>,
    ) -> Vec<ComponentId> {
        let mut candidates = Vec::new();

        for component in components.iter_mut() {
            if !component.load_status().permits_loading() {
                continue;
            }

            let declared = component.metadata().dependencies();

            for dependency in declared {
                match index.get(&dependency.name) {
                    Some(&target) => {
                        component.add_dependency(target, dependency.minimum_version());
                    }
                    None => {
                        debug!(
                            "Component {} depends on {} which was not discovered",
                            component.name(), dependency.name
                        );
                        component.add_missing_dependency(dependency.name.clone());
                        component.raise(LoadFlags::MISSING_DEPENDENCY);
                    }
                }
            }

            if component.load_status().permits_loading() {
                candidates.push(component.id());
            }
        }

        candidates
    }

    /// Order `candidates` so that dependencies precede dependents
    ///
    /// Dependencies reached through edges are placed even when they are not
    /// candidates themselves; the loader skips anything carrying flags.
    pub fn resolve_order(
        components: &mut [ComponentDescriptor],
        candidates: &[ComponentId],
    ) -> Vec<ComponentId> {
        let mut walk = Walk::default();

        for &candidate in candidates {
            if !walk.placed.contains(&candidate) {
                walk.visit(components, candidate);
            }
        }

        walk.order
    }

    /// Flags earned by `component` given the current state of its dependencies
    ///
    /// A dependency that has not loaded gives `MISSING_DEPENDENCY`; one that
    /// loaded below the declared minimum gives `INCOMPATIBLE_VERSION`. This is
    /// a pure function; the caller unions the result into the descriptor.
    pub fn validate_dependencies(
        component: &ComponentDescriptor,
        components: &[ComponentDescriptor],
    ) -> LoadFlags {
        let mut flags = LoadFlags::UNLOADED;

        for edge in component.dependencies() {
            let dependency = &components[edge.component.index()];

            if !dependency.is_loaded() {
                flags |= LoadFlags::MISSING_DEPENDENCY;
            } else if dependency.version() < edge.minimum_version {
                flags |= LoadFlags::INCOMPATIBLE_VERSION;
            }
        }

        flags
    }
}

/// State of one resolution pass
#[derive(Default)]
struct Walk {
    order: Vec<ComponentId>,
    placed: HashSet<ComponentId>,
    in_progress: HashSet<ComponentId>,
}

impl Walk {
    fn visit(&mut self, components: &mut [ComponentDescriptor], id: ComponentId) {
        if self.placed.contains(&id) {
            return;
        }

        if self.in_progress.contains(&id) {
            let component = &mut components[id.index()];
            warn!("Circular dependency detected involving component: {}", component.name());
            component.raise(LoadFlags::CIRCULAR_DEPENDENCY);
            return;
        }

        self.in_progress.insert(id);

        let dependencies: Vec<ComponentId> = components[id.index()]
            .dependencies()
            .iter()
            .map(|edge| edge.component)
            .collect();

        for dependency in dependencies {
            if !self.placed.contains(&dependency) {
                self.visit(components, dependency);
            }
        }

        let circular = components[id.index()]
            .load_status()
            .contains(LoadFlags::CIRCULAR_DEPENDENCY);

        if !circular && self.placed.insert(id) {
            self.order.push(id);
        }

        self.in_progress.remove(&id);
    }
}
