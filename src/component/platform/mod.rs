//! Component Platform
//!
//! The narrow primitive the loader uses to touch artifacts: recognise a
//! candidate file, read its embedded metadata, open it, ask it for the
//! lifecycle interface and close it again.

pub mod in_process;
pub mod native;

pub use in_process::{InProcessPlatform, LifecycleFactory};
pub use native::NativePlatform;

use std::path::Path;
use serde_json::Value;

use super::error::ComponentResult;
use super::lifecycle::ComponentLifecycle;
use super::version::RuntimeVersion;

/// Access to component artifacts for one kind of packaging
pub trait ComponentPlatform {
    /// Whether `path` looks like an artifact of this platform
    fn is_component_file(&self, path: &Path) -> bool;

    /// Read the metadata document without keeping the artifact open
    ///
    /// `Ok(None)` means the file carries no metadata and is not a component.
    fn read_metadata(&self, path: &Path) -> ComponentResult<Option<Value>>;

    /// Open the artifact at `path`
    fn open(&self, path: &Path) -> ComponentResult<Box<dyn ComponentArtifact>>;

    /// Runtime version of the host process
    fn host_runtime_version(&self) -> RuntimeVersion {
        RuntimeVersion::host()
    }

    /// Whether the host was built in debug mode
    fn host_debug_build(&self) -> bool {
        cfg!(debug_assertions)
    }
}

/// An open artifact
pub trait ComponentArtifact {
    /// The lifecycle interface, when the artifact exposes one
    fn lifecycle(&mut self) -> Option<&mut (dyn ComponentLifecycle + 'static)>;

    /// Release the component instance, then the artifact itself
    fn close(self: Box<Self>);
}
