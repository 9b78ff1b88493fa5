//! Component Metadata
//!
//! Typed, read-only view over the metadata document embedded in a component
//! artifact. The document is a JSON object of the form:
//!
//! ```json
//! {
//!   "debug": false,
//!   "version": 65536,
//!   "className": "CoreComponent",
//!   "MetaData": {
//!     "Name": "Core",
//!     "Vendor": "Acme",
//!     "Version": "1.0.0",
//!     "Dependencies": [ { "Name": "Base", "Version": "1.0" } ],
//!     "CanBeDisabled": false
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{ComponentError, ComponentResult};
use super::version::{RuntimeVersion, VersionNumber};

/// Key of the debug-build marker
pub const DEBUG_KEY: &str = "debug";
/// Key of the packed runtime version
pub const RUNTIME_VERSION_KEY: &str = "version";
/// Key of the nested component description object
pub const METADATA_KEY: &str = "MetaData";
/// Key of the implementation class name
pub const CLASS_NAME_KEY: &str = "className";

/// A dependency declared in metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    /// Name of the required component
    #[serde(rename = "Name")]
    pub name: String,

    /// Minimum version, as written in metadata
    #[serde(rename = "Version", default)]
    pub version: String,
}

impl DependencySpec {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, version: V) -> Self {
        Self { name: name.into(), version: version.into() }
    }

    /// Minimum version as a comparable number
    pub fn minimum_version(&self) -> VersionNumber {
        VersionNumber::parse(&self.version)
    }
}

/// Validated metadata of one component artifact
#[derive(Debug, Clone)]
pub struct ComponentMetadata {
    document: Value,
    name: String,
}

impl ComponentMetadata {
    /// Validate a raw metadata document
    ///
    /// Fails when the document is not a non-empty object, lacks the debug or
    /// runtime version markers, lacks a `MetaData` object, or has no
    /// resolvable name.
    pub fn from_document(document: Value) -> ComponentResult<Self> {
        let root = match document.as_object() {
            Some(root) if !root.is_empty() => root,
            _ => return Err(ComponentError::invalid_metadata("metadata is empty")),
        };

        if root.get(DEBUG_KEY).map_or(true, Value::is_null) {
            return Err(ComponentError::invalid_metadata("missing debug marker"));
        }

        if root.get(RUNTIME_VERSION_KEY).map_or(true, Value::is_null) {
            return Err(ComponentError::invalid_metadata("missing runtime version"));
        }

        let details = match root.get(METADATA_KEY) {
            Some(Value::Object(details)) => details,
            _ => return Err(ComponentError::invalid_metadata("missing MetaData object")),
        };

        let name = resolve_name(root, details)
            .ok_or_else(|| ComponentError::invalid_metadata("missing component name"))?;

        Ok(Self { document, name })
    }

    /// Resolved component name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the artifact was built in debug mode
    pub fn debug_build(&self) -> bool {
        self.document.get(DEBUG_KEY).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Runtime version the artifact was built against
    pub fn runtime_version(&self) -> RuntimeVersion {
        let packed = self.document
            .get(RUNTIME_VERSION_KEY)
            .and_then(Value::as_u64)
            .unwrap_or(0);
        RuntimeVersion::from_packed(u32::try_from(packed).unwrap_or(u32::MAX))
    }

    /// The nested `MetaData` object
    pub fn details(&self) -> &Map<String, Value> {
        static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
        self.document
            .get(METADATA_KEY)
            .and_then(Value::as_object)
            .unwrap_or_else(|| EMPTY.get_or_init(Map::new))
    }

    pub fn version(&self) -> VersionNumber {
        VersionNumber::parse(&self.string_field("Version"))
    }

    pub fn vendor(&self) -> String {
        self.string_field("Vendor")
    }

    pub fn category(&self) -> String {
        self.string_field("Category")
    }

    pub fn copyright(&self) -> String {
        self.string_field("Copyright")
    }

    pub fn url(&self) -> String {
        self.string_field("Url")
    }

    pub fn branch(&self) -> String {
        self.string_field("Branch")
    }

    pub fn revision(&self) -> String {
        self.string_field("Revision")
    }

    /// License text; array entries are concatenated
    pub fn license(&self) -> String {
        match self.details().get("License") {
            Some(Value::Array(lines)) => lines.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(text)) => text.clone(),
            _ => String::new(),
        }
    }

    /// Description text; array entries become lines
    pub fn description(&self) -> String {
        match self.details().get("Description") {
            Some(Value::Array(lines)) => lines
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("\n"),
            Some(Value::String(text)) => text.clone(),
            _ => String::new(),
        }
    }

    /// Declared dependencies, in declaration order
    ///
    /// An entry without a string `Name` yields an empty name, which no
    /// component can satisfy.
    pub fn dependencies(&self) -> Vec<DependencySpec> {
        let text = |entry: &Value, key: &str| {
            entry.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
        };

        match self.details().get("Dependencies") {
            Some(Value::Array(entries)) => entries
                .iter()
                .map(|entry| DependencySpec::new(text(entry, "Name"), text(entry, "Version")))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Whether the user may disable this component (default true)
    pub fn can_be_disabled(&self) -> bool {
        self.details()
            .get("CanBeDisabled")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    fn string_field(&self, key: &str) -> String {
        self.details()
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

/// Name lookup order: `Name`, `name`, then the implementation class name
fn resolve_name(root: &Map<String, Value>, details: &Map<String, Value>) -> Option<String> {
    ["Name", "name", CLASS_NAME_KEY]
        .iter()
        .filter_map(|key| details.get(*key))
        .chain(root.get(CLASS_NAME_KEY))
        .filter_map(Value::as_str)
        .find(|name| !name.is_empty())
        .map(str::to_string)
}
