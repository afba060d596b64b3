//! Commit planning
//!
//! Turns the pending edits into the two daemon payloads: properties to set
//! and properties to unset (revert to the daemon default).

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{ConfigProperty, ConfigValue, ValueKind};
use crate::tracker::ChangeTracker;

/// Disjoint set/unset partition of the touched properties
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommitPlan {
    pub to_set: BTreeMap<ConfigProperty, ConfigValue>,
    pub to_unset: Vec<ConfigProperty>,
}

impl CommitPlan {
    pub fn is_empty(&self) -> bool {
        self.to_set.is_empty() && self.to_unset.is_empty()
    }

    /// Number of properties the plan touches
    pub fn len(&self) -> usize {
        self.to_set.len() + self.to_unset.len()
    }
}

/// Build the commit plan for the current tracker state.
///
/// Only string properties edited to `""` are unset; numbers and booleans
/// are always set, zero and false included.
pub fn build_plan(tracker: &ChangeTracker) -> CommitPlan {
    let mut plan = CommitPlan::default();

    for (property, value) in tracker.edits() {
        if property.kind() == ValueKind::Text && value.is_empty_text() {
            plan.to_unset.push(property);
        } else {
            plan.to_set.insert(property, value.clone());
        }
    }

    if let Some(consent) = tracker.consent() {
        let answer = if consent { "yes" } else { "no" };
        plan.to_set.insert(ConfigProperty::ConsentTelemetry, ConfigValue::from(answer));
    }

    if let Some(autostart) = tracker.autostart() {
        plan.to_set.insert(ConfigProperty::AutostartTray, ConfigValue::Bool(autostart));
    }

    plan
}
