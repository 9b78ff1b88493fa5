use std::env;
use std::fs;
use std::path::Path;

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let runtime_version_path = Path::new(&out_dir).join("runtime_version.rs");

    // Read runtime version from Cargo.toml metadata
    let cargo_manifest = env::var("CARGO_MANIFEST_DIR").unwrap();
    let cargo_toml_path = Path::new(&cargo_manifest).join("Cargo.toml");
    let cargo_toml_content = fs::read_to_string(&cargo_toml_path)
        .expect("Failed to read Cargo.toml");

    let cargo_toml: toml::Value = cargo_toml_content.parse()
        .expect("Failed to parse Cargo.toml");

    let runtime_version = cargo_toml
        .get("package")
        .and_then(|p| p.get("metadata"))
        .and_then(|m| m.get("extsys"))
        .and_then(|e| e.get("runtime_version"))
        .and_then(|v| v.as_str())
        .expect("Failed to find package.metadata.extsys.runtime_version in Cargo.toml");

    let segments: Vec<u32> = runtime_version
        .split('.')
        .map(|s| s.parse().expect("runtime_version segments must be numeric"))
        .collect();

    let major = segments.first().copied().unwrap_or(0);
    let minor = segments.get(1).copied().unwrap_or(0);
    let patch = segments.get(2).copied().unwrap_or(0);

    assert!(major <= 0xFFFF, "runtime_version major must fit in 16 bits");
    assert!(minor <= 0xFF && patch <= 0xFF, "runtime_version minor/patch must fit in 8 bits");

    let packed = (major << 16) | (minor << 8) | patch;

    let version_content = format!(
        "// Auto-generated runtime version from Cargo.toml metadata\n\
         // Source: package.metadata.extsys.runtime_version = \"{}\"\n\
         pub const HOST_RUNTIME_VERSION: u32 = {:#010x};\n",
        runtime_version, packed
    );

    fs::write(&runtime_version_path, version_content)
        .expect("Failed to write runtime_version.rs");

    println!("cargo:rerun-if-changed=Cargo.toml");
}
