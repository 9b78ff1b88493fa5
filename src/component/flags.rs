//! Load Flags
//!
//! Bitflag vocabulary describing why a component did or did not load.

use bitflags::bitflags;
use serde::{Serialize, Deserialize};
use std::fmt;

bitflags! {
    /// Accumulated load state of a component
    ///
    /// An empty set (`UNLOADED`) is the only state from which loading may
    /// proceed. Flags are only ever added.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct LoadFlags: u32 {
        /// Not yet loaded and nothing known to be wrong
        const UNLOADED = 0x0;
        /// Artifact opened and lifecycle interface obtained
        const LOADED = 0x001;
        /// Built against a different host runtime major version
        const INCOMPATIBLE_RUNTIME_VERSION = 0x002;
        /// Another component with the same name was discovered first
        const NAME_CLASH = 0x004;
        /// A dependency was not discovered, or was discovered but did not load
        const MISSING_DEPENDENCY = 0x008;
        /// Rejected by the caller's filter
        const DISABLED = 0x010;
        /// A dependency loaded with a version below the declared minimum
        const INCOMPATIBLE_VERSION = 0x020;
        /// The artifact could not be opened
        const UNABLE_TO_LOAD = 0x040;
        /// The artifact does not expose the lifecycle interface
        const MISSING_INTERFACE = 0x080;
        /// Part of a dependency cycle
        const CIRCULAR_DEPENDENCY = 0x100;
    }
}

/// Display names in flag order
const FLAG_NAMES: &[(LoadFlags, &str)] = &[
    (LoadFlags::LOADED, "Loaded"),
    (LoadFlags::INCOMPATIBLE_RUNTIME_VERSION, "IncompatibleRuntimeVersion"),
    (LoadFlags::NAME_CLASH, "NameClash"),
    (LoadFlags::MISSING_DEPENDENCY, "MissingDependency"),
    (LoadFlags::DISABLED, "Disabled"),
    (LoadFlags::INCOMPATIBLE_VERSION, "IncompatibleVersion"),
    (LoadFlags::UNABLE_TO_LOAD, "UnableToLoad"),
    (LoadFlags::MISSING_INTERFACE, "MissingInterface"),
    (LoadFlags::CIRCULAR_DEPENDENCY, "CircularDependency"),
];

impl LoadFlags {
    /// Flags that explain a failure, i.e. everything except `LOADED`
    pub fn failures(self) -> LoadFlags {
        self.difference(LoadFlags::LOADED)
    }

    /// Whether a load attempt may still be made
    pub fn permits_loading(self) -> bool {
        self.is_empty()
    }

    /// Individual flag names that are set, in flag order
    pub fn names(self) -> Vec<&'static str> {
        FLAG_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl Default for LoadFlags {
    fn default() -> Self {
        LoadFlags::UNLOADED
    }
}

impl fmt::Display for LoadFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("Unloaded");
        }
        f.write_str(&self.names().join(" | "))
    }
}
