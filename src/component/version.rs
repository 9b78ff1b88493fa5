//! Version Numbers
//!
//! Dotted component versions and the packed host runtime version.
//!
//! The host runtime version is defined in Cargo.toml under
//! `package.metadata.extsys.runtime_version` and compiled in by `build.rs`,
//! so the same source always produces the same runtime version.

use std::cmp::Ordering;
use std::fmt;
use serde::{Serialize, Deserialize};

// Include the build-generated runtime version constant
include!(concat!(env!("OUT_DIR"), "/runtime_version.rs"));

const MAJOR_BIT_MASK: u32 = 0xFFFF_0000;
const MAJOR_BIT_SHIFT: u32 = 16;
const MINOR_BIT_MASK: u32 = 0x0000_FF00;
const MINOR_BIT_SHIFT: u32 = 8;
const PATCH_BIT_MASK: u32 = 0x0000_00FF;

/// A dotted version number such as `1.4.2`
///
/// Parsing is lenient: only the leading numeric segments are kept, so
/// `"2.1-beta"` parses as `2.1` and an empty string gives a null version.
/// Missing segments compare as zero, so `1.0 == 1.0.0`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionNumber {
    segments: Vec<u32>,
}

impl VersionNumber {
    /// Create a version from explicit segments
    pub fn new(segments: Vec<u32>) -> Self {
        Self { segments }
    }

    /// Parse a dotted version string
    pub fn parse(version: &str) -> Self {
        let mut segments = Vec::new();

        for part in version.trim().split('.') {
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            match digits.parse::<u32>() {
                Ok(segment) => segments.push(segment),
                Err(_) => break,
            }
            // a suffix such as "1-beta" ends the numeric part
            if digits.len() != part.len() {
                break;
            }
        }

        Self { segments }
    }

    /// Segments of this version
    pub fn segments(&self) -> &[u32] {
        &self.segments
    }

    /// Whether no segments were parsed
    pub fn is_null(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn major(&self) -> u32 {
        self.segment(0)
    }

    pub fn minor(&self) -> u32 {
        self.segment(1)
    }

    pub fn patch(&self) -> u32 {
        self.segment(2)
    }

    fn segment(&self, index: usize) -> u32 {
        self.segments.get(index).copied().unwrap_or(0)
    }
}

impl Ord for VersionNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            match self.segment(i).cmp(&other.segment(i)) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for VersionNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionNumber {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionNumber {}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.segments.iter().map(|s| s.to_string()).collect();
        f.write_str(&parts.join("."))
    }
}

impl From<&str> for VersionNumber {
    fn from(version: &str) -> Self {
        VersionNumber::parse(version)
    }
}

/// Host runtime version packed as `major << 16 | minor << 8 | patch`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuntimeVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl RuntimeVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    /// Unpack a packed runtime version
    pub fn from_packed(packed: u32) -> Self {
        Self {
            major: (packed & MAJOR_BIT_MASK) >> MAJOR_BIT_SHIFT,
            minor: (packed & MINOR_BIT_MASK) >> MINOR_BIT_SHIFT,
            patch: packed & PATCH_BIT_MASK,
        }
    }

    /// Pack into the metadata representation
    pub fn packed(&self) -> u32 {
        (self.major << MAJOR_BIT_SHIFT)
            | ((self.minor << MINOR_BIT_SHIFT) & MINOR_BIT_MASK)
            | (self.patch & PATCH_BIT_MASK)
    }

    /// The runtime version this host was built with
    pub fn host() -> Self {
        Self::from_packed(HOST_RUNTIME_VERSION)
    }

    /// Same major version is compatible
    pub fn is_compatible_with(&self, host: &RuntimeVersion) -> bool {
        self.major == host.major
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        assert_eq!(VersionNumber::parse("1.2.3").segments(), &[1, 2, 3]);
        assert_eq!(VersionNumber::parse("2.1-beta").segments(), &[2, 1]);
        assert_eq!(VersionNumber::parse("4.0.0.12").segments(), &[4, 0, 0, 12]);
        assert_eq!(VersionNumber::parse("3.x.1").segments(), &[3]);
        assert!(VersionNumber::parse("").is_null());
        assert!(VersionNumber::parse("abc").is_null());
    }

    #[test]
    fn test_version_ordering() {
        assert!(VersionNumber::parse("1.0") < VersionNumber::parse("2.0"));
        assert!(VersionNumber::parse("1.10") > VersionNumber::parse("1.9"));
        assert!(VersionNumber::parse("1.0.1") > VersionNumber::parse("1.0"));
        assert_eq!(VersionNumber::parse("1.0"), VersionNumber::parse("1.0.0"));
        // an unversioned component satisfies only an unversioned requirement
        assert!(VersionNumber::parse("") < VersionNumber::parse("0.1"));
        assert_eq!(VersionNumber::parse(""), VersionNumber::parse("0"));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(VersionNumber::parse("1.2.3").to_string(), "1.2.3");
        assert_eq!(VersionNumber::new(vec![5, 0]).to_string(), "5.0");
    }

    #[test]
    fn test_runtime_version_packing() {
        let version = RuntimeVersion::from_packed(0x0006_0502);
        assert_eq!(version, RuntimeVersion::new(6, 5, 2));
        assert_eq!(version.packed(), 0x0006_0502);
        assert_eq!(version.to_string(), "6.5.2");
    }

    #[test]
    fn test_runtime_compatibility() {
        let host = RuntimeVersion::new(1, 2, 0);
        assert!(RuntimeVersion::new(1, 0, 0).is_compatible_with(&host));
        assert!(RuntimeVersion::new(1, 9, 9).is_compatible_with(&host));
        assert!(!RuntimeVersion::new(2, 0, 0).is_compatible_with(&host));
        assert!(!RuntimeVersion::new(0, 9, 0).is_compatible_with(&host));
    }

    #[test]
    fn test_host_runtime_version_matches_manifest() {
        // Cargo.toml declares runtime_version = "1.0.0"
        assert_eq!(RuntimeVersion::host(), RuntimeVersion::new(1, 0, 0));
    }
}
