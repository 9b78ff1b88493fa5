//! Component Lifecycle Contract
//!
//! The interface every loadable component implements. The loader calls the
//! three hooks in a fixed order:
//!
//! 1. `initialise_event` on every component, in load order
//! 2. `initialisation_finished_event` on every component, in reverse load order
//! 3. `finalise_event` on every component, in reverse load order, before its
//!    artifact is closed

use std::fmt;

use super::registry::ObjectRegistry;

/// Lifecycle hooks of a loaded component
pub trait ComponentLifecycle {
    /// Called once, after every declared dependency has run its own
    /// `initialise_event`. Only services published by dependencies may be
    /// assumed present.
    fn initialise_event(&mut self, registry: &ObjectRegistry);

    /// Called once, in reverse load order, after every component has been
    /// initialised. Foundational components run this last and can assemble
    /// whatever their dependents published.
    fn initialisation_finished_event(&mut self, _registry: &ObjectRegistry) {}

    /// Called once before the artifact is closed. Must remove everything this
    /// component added to the registry.
    fn finalise_event(&mut self, registry: &ObjectRegistry);
}

/// Phase of the lifecycle protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Initialise,
    InitialisationFinished,
    Finalise,
}

impl LifecyclePhase {
    /// Invoke the hook for this phase
    pub fn dispatch(self, component: &mut dyn ComponentLifecycle, registry: &ObjectRegistry) {
        match self {
            LifecyclePhase::Initialise => component.initialise_event(registry),
            LifecyclePhase::InitialisationFinished => component.initialisation_finished_event(registry),
            LifecyclePhase::Finalise => component.finalise_event(registry),
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecyclePhase::Initialise => "InitialiseEvent",
            LifecyclePhase::InitialisationFinished => "InitialisationFinishedEvent",
            LifecyclePhase::Finalise => "FinaliseEvent",
        };
        f.write_str(name)
    }
}
