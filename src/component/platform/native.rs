//! Native shared-library platform
//!
//! Components are `cdylib` crates that export two symbols, normally through
//! [`export_component!`](crate::export_component):
//!
//! - `extsys_component_metadata`: returns a NUL-terminated JSON metadata
//!   document with static lifetime
//! - `extsys_component_create`: returns a heap-allocated lifecycle object
//!
//! A library without the metadata symbol is not a component. A library
//! without the create symbol opens successfully but exposes no lifecycle
//! interface.

use std::ffi::{c_char, CStr};
use std::path::Path;
use libloading::{Library, Symbol};
use log::{debug, warn};
use serde_json::Value;

use super::{ComponentArtifact, ComponentPlatform};
use crate::component::error::{ComponentError, ComponentResult};
use crate::component::lifecycle::ComponentLifecycle;

/// Exported symbol returning the metadata document
pub const METADATA_SYMBOL: &str = "extsys_component_metadata";
/// Exported symbol creating the lifecycle object
pub const CREATE_SYMBOL: &str = "extsys_component_create";

type MetadataFn = unsafe extern "C" fn() -> *const c_char;
#[allow(improper_ctypes_definitions)]
type CreateFn = unsafe extern "C" fn() -> *mut dyn ComponentLifecycle;

/// Loads components from shared libraries
#[derive(Debug, Default, Clone, Copy)]
pub struct NativePlatform;

impl NativePlatform {
    pub fn new() -> Self {
        Self
    }

    fn open_library(path: &Path) -> ComponentResult<Library> {
        // Running library initialisers is inherent to loading a component.
        unsafe { Library::new(path) }.map_err(|e| ComponentError::load_failed(path, e.to_string()))
    }
}

impl ComponentPlatform for NativePlatform {
    fn is_component_file(&self, path: &Path) -> bool {
        if !path.is_file() {
            return false;
        }

        let file_name = match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => name,
            None => return false,
        };

        match std::env::consts::OS {
            "macos" | "ios" => file_name.ends_with(".dylib"),
            "windows" => file_name.to_ascii_lowercase().ends_with(".dll"),
            _ => is_shared_object_name(file_name),
        }
    }

    fn read_metadata(&self, path: &Path) -> ComponentResult<Option<Value>> {
        let library = Self::open_library(path)?;

        let document = {
            let symbol: Symbol<MetadataFn> = match unsafe { library.get(METADATA_SYMBOL.as_bytes()) } {
                Ok(symbol) => symbol,
                Err(_) => return Err(ComponentError::missing_symbol(path, METADATA_SYMBOL)),
            };

            let raw = unsafe { symbol() };
            if raw.is_null() {
                return Ok(None);
            }

            // The pointer refers to static data inside the still-open library.
            let text = unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned();
            serde_json::from_str::<Value>(&text)?
        };

        drop(library);
        Ok(Some(document))
    }

    fn open(&self, path: &Path) -> ComponentResult<Box<dyn ComponentArtifact>> {
        let library = Self::open_library(path)?;

        let instance = match unsafe { library.get::<CreateFn>(CREATE_SYMBOL.as_bytes()) } {
            Ok(create) => {
                let raw = unsafe { create() };
                if raw.is_null() {
                    None
                } else {
                    // Ownership was handed over by export_component!
                    Some(unsafe { Box::from_raw(raw) })
                }
            }
            Err(_) => {
                debug!("Library {} does not export {}", path.display(), CREATE_SYMBOL);
                None
            }
        };

        Ok(Box::new(NativeArtifact {
            instance,
            library: Some(library),
        }))
    }
}

/// `libfoo.so` or a versioned `libfoo.so.1.2`
fn is_shared_object_name(file_name: &str) -> bool {
    if file_name.ends_with(".so") {
        return true;
    }

    match file_name.find(".so.") {
        Some(position) => file_name[position + 4..]
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit())),
        None => false,
    }
}

/// An open shared library and the instance it created
///
/// Fields drop in declaration order, so the instance is always released
/// before the code that implements it is unmapped.
struct NativeArtifact {
    instance: Option<Box<dyn ComponentLifecycle>>,
    library: Option<Library>,
}

impl ComponentArtifact for NativeArtifact {
    fn lifecycle(&mut self) -> Option<&mut (dyn ComponentLifecycle + 'static)> {
        self.instance.as_deref_mut()
    }

    fn close(mut self: Box<Self>) {
        drop(self.instance.take());

        if let Some(library) = self.library.take() {
            if cfg!(target_os = "macos") {
                // Unloading images with registered Objective-C or TLS data is unsafe here.
                std::mem::forget(library);
            } else if let Err(e) = library.close() {
                warn!("Failed to close component library: {}", e);
            }
        }
    }
}

/// Export the symbols a native component library must provide
///
/// ```ignore
/// extsys::export_component!(
///     r#"{ "debug": false, "version": 65536, "MetaData": { "Name": "Core", "Version": "1.0" } }"#,
///     CoreComponent::default()
/// );
/// ```
#[macro_export]
macro_rules! export_component {
    ($metadata:literal, $constructor:expr) => {
        #[no_mangle]
        pub extern "C" fn extsys_component_metadata() -> *const ::std::ffi::c_char {
            static METADATA: &str = concat!($metadata, "\0");
            METADATA.as_ptr() as *const ::std::ffi::c_char
        }

        #[no_mangle]
        #[allow(improper_ctypes_definitions)]
        pub extern "C" fn extsys_component_create() -> *mut dyn $crate::component::ComponentLifecycle {
            let instance: ::std::boxed::Box<dyn $crate::component::ComponentLifecycle> =
                ::std::boxed::Box::new($constructor);
            ::std::boxed::Box::into_raw(instance)
        }
    };
}
