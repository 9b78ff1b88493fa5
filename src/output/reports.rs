//! Component status reports

use anyhow::{Context, Result};
use colored::Colorize;
use prettytable::{Table, Row, Cell, format};
use serde::Serialize;
use crate::component::{ComponentDescriptor, LoadFlags};

/// Overall outcome shown in the status column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComponentStatus {
    Loaded,
    Disabled,
    Failed,
    /// Discovered but no load pass has run yet
    Pending,
}

impl ComponentStatus {
    pub fn of(flags: LoadFlags) -> Self {
        if flags.contains(LoadFlags::LOADED) {
            ComponentStatus::Loaded
        } else if flags == LoadFlags::DISABLED {
            ComponentStatus::Disabled
        } else if flags.is_empty() {
            ComponentStatus::Pending
        } else {
            ComponentStatus::Failed
        }
    }

    fn label(self) -> &'static str {
        match self {
            ComponentStatus::Loaded => "Loaded",
            ComponentStatus::Disabled => "Disabled",
            ComponentStatus::Failed => "Failed",
            ComponentStatus::Pending => "Pending",
        }
    }

    fn coloured(self) -> String {
        match self {
            ComponentStatus::Loaded => self.label().green().to_string(),
            ComponentStatus::Disabled => self.label().yellow().to_string(),
            ComponentStatus::Failed => self.label().red().bold().to_string(),
            ComponentStatus::Pending => self.label().dimmed().to_string(),
        }
    }
}

/// One row of the status report
#[derive(Debug, Clone, Serialize)]
pub struct ComponentReport {
    pub name: String,
    pub version: String,
    /// Version with branch and revision
    pub release: String,
    pub vendor: String,
    pub identifier: String,
    pub location: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub license: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub copyright: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    /// Declared dependencies, one `Name (Version)` per line
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dependencies: String,
    pub status: ComponentStatus,
    pub flags: Vec<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
}

impl From<&ComponentDescriptor> for ComponentReport {
    fn from(component: &ComponentDescriptor) -> Self {
        let flags = component.load_status();
        let metadata = component.metadata();
        Self {
            name: component.name().to_string(),
            version: component.version().to_string(),
            release: component.version_string(),
            vendor: component.vendor(),
            identifier: component.identifier(),
            location: component.location().display().to_string(),
            category: metadata.category(),
            description: metadata.description(),
            license: metadata.license(),
            copyright: metadata.copyright(),
            url: metadata.url(),
            dependencies: component.dependency_summary(),
            status: ComponentStatus::of(flags),
            flags: flags.names(),
            missing_dependencies: component.missing_dependencies().to_vec(),
            load_error: component.load_error().map(str::to_string),
        }
    }
}

/// Build report rows for every discovered component, in discovery order
pub fn build_reports<'a, I>(components: I) -> Vec<ComponentReport>
where
    I: IntoIterator<Item = &'a ComponentDescriptor>,
{
    components.into_iter().map(ComponentReport::from).collect()
}

/// Format a compact table with headers and rows using prettytable-rs clean format
pub fn format_compact_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);

    table.add_row(Row::new(headers.iter().map(|header| Cell::new(header)).collect()));
    for row in rows {
        table.add_row(Row::new(row.iter().map(|cell| Cell::new(cell)).collect()));
    }

    table
        .to_string()
        .lines()
        .map(|line| format!("  {}\n", line))
        .collect()
}

/// Render the status table; `colour` selects coloured status labels
pub fn format_component_table(reports: &[ComponentReport], colour: bool) -> String {
    let rows: Vec<Vec<String>> = reports
        .iter()
        .map(|report| {
            let status = if colour { report.status.coloured() } else { report.status.label().to_string() };

            let mut detail = report.flags
                .iter()
                .filter(|name| **name != "Loaded")
                .copied()
                .collect::<Vec<_>>()
                .join(", ");
            if !report.missing_dependencies.is_empty() {
                detail.push_str(&format!(" [{}]", report.missing_dependencies.join(", ")));
            }

            vec![
                report.name.clone(),
                report.version.clone(),
                report.vendor.clone(),
                status,
                detail.trim().to_string(),
            ]
        })
        .collect();

    format_compact_table(&["Name", "Version", "Vendor", "Status", "Detail"], &rows)
}

/// Render the report as pretty-printed JSON
pub fn format_component_json(reports: &[ComponentReport]) -> Result<String> {
    serde_json::to_string_pretty(reports).context("Failed to serialize component report")
}

/// Print the status table, followed by a summary line
pub fn display_component_table(reports: &[ComponentReport], colour: bool) {
    if reports.is_empty() {
        println!("No components found.");
        return;
    }

    print!("{}", format_component_table(reports, colour));

    let loaded = reports.iter().filter(|r| r.status == ComponentStatus::Loaded).count();
    let summary = format!("{} of {} components loaded", loaded, reports.len());
    if colour {
        println!("\n{}", summary.bold());
    } else {
        println!("\n{}", summary);
    }
}

/// Print the JSON report
pub fn display_component_json(reports: &[ComponentReport]) -> Result<()> {
    println!("{}", format_component_json(reports)?);
    Ok(())
}
