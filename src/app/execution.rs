//! Component discovery, loading and reporting for the host binary

use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use log::{debug, info, warn};
use crate::cli::{self, OutputFormat};
use crate::component::{ComponentDescriptor, ComponentLoader, ObjectRegistry};
use crate::config::{self, ComponentSettings};
use crate::output;

/// Application directory; its `components` folder is searched
pub const APPDIR_ENV_VAR: &str = "EXTSYS_APPDIR";

/// Extra component root; its `components` folder is searched
pub const COMPONENT_DIR_ENV_VAR: &str = "EXTSYS_COMPONENT_DIR";

/// Folders to scan, in precedence order
///
/// Command line folders come first, then `[components] paths`, then the
/// `components` folders under `$EXTSYS_APPDIR` and `$EXTSYS_COMPONENT_DIR`,
/// then `components` next to the executable when it exists.
pub fn component_search_paths(args: &cli::Args, settings: &ComponentSettings) -> Vec<PathBuf> {
    let exe_components = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("components")))
        .filter(|dir| dir.is_dir());

    collect_search_paths(
        args.component_paths(),
        &settings.paths,
        env::var_os(APPDIR_ENV_VAR).map(PathBuf::from),
        env::var_os(COMPONENT_DIR_ENV_VAR).map(PathBuf::from),
        exe_components,
    )
}

fn collect_search_paths(
    cli_paths: Vec<PathBuf>,
    config_paths: &[PathBuf],
    appdir: Option<PathBuf>,
    component_dir: Option<PathBuf>,
    exe_components: Option<PathBuf>,
) -> Vec<PathBuf> {
    let candidates = cli_paths
        .into_iter()
        .chain(config_paths.iter().cloned())
        .chain(appdir.map(|dir| dir.join("components")))
        .chain(component_dir.map(|dir| dir.join("components")))
        .chain(exe_components);

    // scanning a folder twice would register every component in it twice
    let mut paths: Vec<PathBuf> = Vec::new();
    for path in candidates {
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}

/// Load filter rejecting components whose identifier is listed as disabled
///
/// Components that declare `CanBeDisabled = false` are accepted regardless.
pub fn disabled_filter(disabled: Vec<String>) -> impl FnMut(&ComponentDescriptor) -> bool {
    move |component| {
        let identifier = component.identifier();
        if !disabled.contains(&identifier) {
            return true;
        }

        if component.can_be_disabled() {
            info!("Component {} is disabled by configuration", component.name());
            false
        } else {
            warn!("Component {} cannot be disabled, loading it anyway", component.name());
            true
        }
    }
}

/// Discover and load components, print the report, then unload
pub fn run_components(args: &cli::Args, config: &config::ConfigManager) -> Result<()> {
    let settings = config.get_component_settings()?;
    let paths = component_search_paths(args, &settings);

    if paths.is_empty() {
        warn!("No component folders to search");
    }

    let registry = Arc::new(ObjectRegistry::new());
    let mut loader = ComponentLoader::native(Arc::clone(&registry));

    for path in &paths {
        let found = loader.add_components(path);
        debug!("Found {} components in {}", found, path.display());
    }

    loader.load_components_filtered(disabled_filter(settings.disabled));
    info!("{} of {} components loaded, {} objects published",
        loader.loaded_count(), loader.components().len(), registry.len());

    let reports = output::build_reports(loader.components());
    match args.format {
        OutputFormat::Table => output::display_component_table(&reports, !args.no_color),
        OutputFormat::Json => output::display_component_json(&reports)?,
    }

    loader.unload_components();
    Ok(())
}
