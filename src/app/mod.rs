//! Application orchestration module

pub mod initialization;
pub mod execution;

pub use initialization::{load_configuration, configure_logging};
pub use execution::{component_search_paths, disabled_filter, run_components};
