//! extsys: discovery, dependency resolution and lifecycle management for
//! extension components.
//!
//! The [`component`] module is the library proper. The remaining modules
//! make up the `extsys` host binary.

pub mod app;
pub mod cli;
pub mod component;
pub mod config;
pub mod logging;
pub mod output;
