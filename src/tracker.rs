//! Change tracking for the preferences pane
//!
//! Records which properties the user edited since the last load/apply
//! cycle. Only the latest value per property is kept.

use std::collections::BTreeMap;

use crate::models::{ConfigProperty, ConfigValue};

/// Pending edits of the current session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeTracker {
    edits: BTreeMap<ConfigProperty, ConfigValue>,
    /// Telemetry consent switch, `None` until toggled this session
    consent: Option<bool>,
    /// Autostart-at-login switch, `None` until toggled this session
    autostart: Option<bool>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one edit event, replacing any earlier edit of `property`.
    ///
    /// The two switch properties land in their own slots so a property
    /// is never tracked twice.
    pub fn record_edit(&mut self, property: ConfigProperty, value: impl Into<ConfigValue>) {
        let value = value.into();
        match (property, &value) {
            (ConfigProperty::ConsentTelemetry, ConfigValue::Text(text))
                if text.eq_ignore_ascii_case("yes") || text.eq_ignore_ascii_case("no") =>
            {
                self.record_consent(text.eq_ignore_ascii_case("yes"));
            }
            (ConfigProperty::ConsentTelemetry, ConfigValue::Bool(on)) => self.record_consent(*on),
            (ConfigProperty::AutostartTray, ConfigValue::Bool(on)) => self.record_autostart(*on),
            _ => {
                match property {
                    ConfigProperty::ConsentTelemetry => self.consent = None,
                    ConfigProperty::AutostartTray => self.autostart = None,
                    _ => {}
                }
                self.edits.insert(property, value);
            }
        }
    }

    pub fn record_consent(&mut self, consent: bool) {
        self.edits.remove(&ConfigProperty::ConsentTelemetry);
        self.consent = Some(consent);
    }

    pub fn record_autostart(&mut self, autostart: bool) {
        self.edits.remove(&ConfigProperty::AutostartTray);
        self.autostart = Some(autostart);
    }

    /// Drop every pending edit, including both switches
    pub fn clear(&mut self) {
        self.edits.clear();
        self.consent = None;
        self.autostart = None;
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct properties touched this session
    pub fn len(&self) -> usize {
        self.edits.len() + usize::from(self.consent.is_some()) + usize::from(self.autostart.is_some())
    }

    pub fn get(&self, property: ConfigProperty) -> Option<&ConfigValue> {
        self.edits.get(&property)
    }

    pub fn edits(&self) -> impl Iterator<Item = (ConfigProperty, &ConfigValue)> {
        self.edits.iter().map(|(property, value)| (*property, value))
    }

    pub fn consent(&self) -> Option<bool> {
        self.consent
    }

    pub fn autostart(&self) -> Option<bool> {
        self.autostart
    }
}
