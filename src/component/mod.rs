//! Component System
//!
//! Discovery, dependency resolution and lifecycle management for loadable
//! components.

pub mod descriptor;
pub mod error;
pub mod flags;
pub mod lifecycle;
pub mod loader;
pub mod metadata;
pub mod platform;
pub mod registry;
pub mod resolver;
pub mod version;

#[cfg(test)]
mod tests;

pub use descriptor::{ComponentDescriptor, ComponentId, DependencyEdge};
pub use error::{ComponentError, ComponentResult};
pub use flags::LoadFlags;
pub use lifecycle::{ComponentLifecycle, LifecyclePhase};
pub use loader::ComponentLoader;
pub use metadata::{ComponentMetadata, DependencySpec};
pub use platform::{ComponentArtifact, ComponentPlatform, InProcessPlatform, NativePlatform};
pub use registry::{ObjectRegistry, PublishedObject};
pub use resolver::DependencyResolver;
pub use version::{RuntimeVersion, VersionNumber};
