//! Component Discovery Tests

use std::fs;
use std::sync::Arc;
use serde_json::json;
use tempfile::tempdir;

use super::mock_components::*;
use crate::component::flags::LoadFlags;
use crate::component::loader::ComponentLoader;
use crate::component::registry::ObjectRegistry;
use crate::component::version::RuntimeVersion;

#[test]
fn test_empty_folder() {
    let harness = TestBed::new().build();
    assert_eq!(harness.discovered, 0);
    assert!(harness.loader.components().is_empty());
}

#[test]
fn test_nonexistent_folder() {
    let dir = tempdir().unwrap();
    let mut loader = ComponentLoader::native(Arc::new(ObjectRegistry::new()));

    assert_eq!(loader.add_components(dir.path().join("missing")), 0);
    assert!(loader.components().is_empty());
}

#[test]
fn test_unrecognised_files_are_skipped() {
    let harness = TestBed::new()
        .component("Core", "1.0", &[])
        .stray_file("notes.txt")
        .stray_file("another.log")
        .build();

    assert_eq!(harness.discovered, 1);
    assert_eq!(harness.loader.components()[0].name(), "Core");
}

#[test]
fn test_directories_are_skipped() {
    let bed = TestBed::new()
        .component("Core", "1.0", &[])
        .component("Nested", "1.0", &[]);

    // an entry the platform knows, but present as a directory
    fs::remove_file(bed.path().join("nested.component")).unwrap();
    fs::create_dir(bed.path().join("nested.component")).unwrap();

    let harness = bed.build();
    assert_eq!(harness.discovered, 1);
}

#[test]
fn test_invalid_metadata_is_skipped() {
    let harness = TestBed::new()
        .document_at("nameless.component", "Nameless", json!({
            "debug": false,
            "version": RuntimeVersion::host().packed(),
            "MetaData": { "Vendor": "Acme" }
        }))
        .document_at("bare.component", "Bare", json!({ "debug": false, "version": 65536 }))
        .document_at("empty.component", "Empty", json!({}))
        .component("Core", "1.0", &[])
        .build();

    assert_eq!(harness.discovered, 1);
    assert_eq!(harness.loader.components()[0].name(), "Core");
}

#[test]
fn test_name_fallbacks() {
    let harness = TestBed::new()
        .document_at("lower.component", "lower", json!({
            "debug": false,
            "version": RuntimeVersion::host().packed(),
            "MetaData": { "name": "lower", "Version": "1.0" }
        }))
        .document_at("classy.component", "ClassOnly", json!({
            "debug": false,
            "version": RuntimeVersion::host().packed(),
            "className": "ClassOnly",
            "MetaData": { "Version": "1.0" }
        }))
        .build();

    assert_eq!(harness.discovered, 2);
    assert!(harness.loader.component("lower").is_some());
    assert!(harness.loader.component("ClassOnly").is_some());
}

#[test]
fn test_discovery_is_sorted_by_file_name() {
    let harness = TestBed::new()
        .component("Zulu", "1.0", &[])
        .component("Alpha", "1.0", &[])
        .component("Mike", "1.0", &[])
        .build();

    let names: Vec<&str> = harness.loader.components().iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["Alpha", "Mike", "Zulu"]);

    let ids: Vec<usize> = harness.loader.components().iter().map(|c| c.id().index()).collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[test]
fn test_discovery_accumulates_across_folders() {
    let bed = TestBed::new()
        .component("Core", "1.0", &[])
        .component("Plugin", "1.0", &[("Core", "1.0")]);

    let second = tempdir().unwrap();
    fs::rename(bed.path().join("plugin.component"), second.path().join("plugin.component")).unwrap();

    let mut harness = bed.build();
    assert_eq!(harness.discovered, 1);
    assert_eq!(harness.loader.add_components(second.path()), 1);

    harness.loader.load_components();
    assert_eq!(harness.load_order(), vec!["Core", "Plugin"]);
    assert_eq!(
        harness.loader.component("Plugin").unwrap().location(),
        second.path().join("plugin.component")
    );
}

#[test]
fn test_same_folder_twice_clashes() {
    let mut harness = TestBed::new()
        .component("Core", "1.0", &[])
        .build();

    let folder = harness.dir.path().to_path_buf();
    assert_eq!(harness.loader.add_components(&folder), 1);

    harness.loader.load_components();

    assert_eq!(harness.loader.components().len(), 2);
    assert_eq!(harness.loader.components()[1].load_status(), LoadFlags::NAME_CLASH);
    assert_eq!(harness.loader.loaded_count(), 1);
}

#[test]
fn test_descriptor_identity_from_metadata() {
    let harness = TestBed::new()
        .component("Editor", "2.3.1", &[("Core", "1.0"), ("Text", "2")])
        .build();

    let editor = harness.loader.component("Editor").unwrap();
    assert_eq!(editor.identifier(), "editor.acme");
    assert_eq!(editor.dependency_summary(), "Core (1.0)\nText (2)");
    assert_eq!(editor.location(), harness.location("editor.component"));
    assert_eq!(editor.metadata().runtime_version(), RuntimeVersion::host());
    assert_eq!(editor.metadata().vendor(), "Acme");
}

#[cfg(target_os = "linux")]
#[test]
fn test_native_loader_skips_fake_libraries() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("dummy_component.so"), b"This is not a real component.").unwrap();
    fs::write(dir.path().join("readme.txt"), b"hello").unwrap();

    let mut loader = ComponentLoader::native(Arc::new(ObjectRegistry::new()));
    assert_eq!(loader.add_components(dir.path()), 0);
    assert!(loader.components().is_empty());
}
