//! Output formatting module
//!
//! Handles:
//! - Human-readable rendering of a configuration snapshot
//! - JSON rendering of a snapshot
//! - Summary of a commit plan for the confirmation prompt
//! - The property reference table

use anyhow::Result;

use crate::limits::EditLimits;
use crate::models::{ConfigProperty, ConfigSnapshot};
use crate::planner::CommitPlan;

pub mod terminal;

/// Width of the property-name column
const NAME_WIDTH: usize = 18;

/// Render a snapshot the way the preferences pane lays it out
pub fn format_snapshot_human(snapshot: &ConfigSnapshot) -> String {
    let mut out = String::from("Properties:\n");
    for property in &ConfigProperty::ALL[..3] {
        push_row(&mut out, *property, snapshot);
    }
    push_row(&mut out, ConfigProperty::PullSecretFile, snapshot);
    push_row(&mut out, ConfigProperty::Nameserver, snapshot);
    push_row(&mut out, ConfigProperty::ConsentTelemetry, snapshot);

    out.push_str("\nProxy:\n");
    for property in [
        ConfigProperty::HttpProxy,
        ConfigProperty::HttpsProxy,
        ConfigProperty::NoProxy,
        ConfigProperty::ProxyCaFile,
    ] {
        push_row(&mut out, property, snapshot);
    }

    out.push_str("\nStartup:\n");
    push_row(&mut out, ConfigProperty::AutostartTray, snapshot);
    out
}

pub fn format_snapshot_json(snapshot: &ConfigSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Summary of what an apply will change
pub fn format_plan(plan: &CommitPlan) -> String {
    let mut out = String::new();
    for (property, value) in &plan.to_set {
        out.push_str(&format!("  set   {:<width$} {}\n", property.name(), value, width = NAME_WIDTH));
    }
    for property in &plan.to_unset {
        out.push_str(&format!("  unset {}\n", property.name()));
    }
    out
}

/// Table of every property with its kind and, for numbers, the allowed range
pub fn format_property_table(limits: &EditLimits) -> String {
    let mut out = String::new();
    for property in ConfigProperty::ALL {
        let range = limits
            .bounds(property)
            .map(|bounds| bounds.to_string())
            .unwrap_or_default();
        out.push_str(&format!(
            "{:<width$} {:<8} {}\n",
            property.name(),
            property.kind().as_str(),
            range,
            width = NAME_WIDTH
        ));
    }
    out
}

fn push_row(out: &mut String, property: ConfigProperty, snapshot: &ConfigSnapshot) {
    out.push_str(&format!(
        "  {:<width$} {}\n",
        property.name(),
        snapshot.display_value(property),
        width = NAME_WIDTH
    ));
}
