//! Output formatting and display module

pub mod reports;

pub use reports::{
    build_reports,
    display_component_json,
    display_component_table,
    format_compact_table,
    ComponentReport,
    ComponentStatus,
};
