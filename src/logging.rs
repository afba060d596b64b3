//! Unified Logging System integration for the preferences pane
//!
//! Structured events go through the `log` facade; on macOS the backend is
//! the ULS via `oslog`, elsewhere no backend is installed.

use anyhow::Result;
use log::{debug, error, info};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::planner::CommitPlan;

/// Log levels accepted in the settings file and on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    fn filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
        }
    }
}

/// Install the process-wide log backend
#[cfg(target_os = "macos")]
pub fn init(subsystem: &str, level: LogLevel) -> Result<()> {
    // Validate subsystem format (should be reverse DNS)
    if !subsystem.contains('.') {
        anyhow::bail!("Subsystem must be in reverse DNS format (e.g., 'com.example.app')");
    }

    let logger = oslog::OsLogger::new(subsystem);
    log::set_boxed_logger(Box::new(logger))
        .map_err(|e| anyhow::anyhow!("Failed to set logger: {}", e))?;
    log::set_max_level(level.filter());
    debug!("logging initialized at {} level", level.as_str());
    Ok(())
}

/// Install the process-wide log backend
#[cfg(not(target_os = "macos"))]
pub fn init(subsystem: &str, level: LogLevel) -> Result<()> {
    if !subsystem.contains('.') {
        anyhow::bail!("Subsystem must be in reverse DNS format (e.g., 'com.example.app')");
    }

    log::set_max_level(level.filter());
    debug!("logging initialized at {} level", level.as_str());
    Ok(())
}

/// Structured event logger for fetch and commit activity
#[derive(Debug, Clone)]
pub struct EventLogger {
    category: String,
}

impl EventLogger {
    pub fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
        }
    }

    pub fn log_snapshot_fetched(&self, property_count: usize) {
        let message = json!({
            "event": "snapshot_fetched",
            "property_count": property_count,
        });
        self.emit(log::Level::Info, "Configuration loaded", message);
    }

    pub fn log_fetch_failed(&self, reason: &str) {
        let message = json!({
            "event": "fetch_failed",
            "reason": reason,
        });
        self.emit(log::Level::Error, "Failed to load configuration", message);
    }

    pub fn log_commit_planned(&self, commit_id: Uuid, plan: &CommitPlan) {
        let message = json!({
            "event": "commit_planned",
            "commit_id": commit_id.to_string(),
            "set": plan.to_set.keys().map(|p| p.name()).collect::<Vec<_>>(),
            "unset": plan.to_unset.iter().map(|p| p.name()).collect::<Vec<_>>(),
        });
        self.emit(log::Level::Info, "Applying configuration changes", message);
    }

    pub fn log_request(&self, commit_id: Uuid, command: &str, property_count: usize) {
        let message = json!({
            "event": "request_sent",
            "commit_id": commit_id.to_string(),
            "command": command,
            "property_count": property_count,
        });
        self.emit(log::Level::Debug, command, message);
    }

    pub fn log_daemon_error(&self, commit_id: Uuid, command: &str, error_message: &str) {
        let message = json!({
            "event": "daemon_error",
            "commit_id": commit_id.to_string(),
            "command": command,
            "message": error_message,
        });
        self.emit(log::Level::Error, error_message, message);
    }

    pub fn log_commit_finished(&self, commit_id: Uuid, applied: bool, detail: Option<&str>) {
        let message = json!({
            "event": if applied { "commit_applied" } else { "commit_failed" },
            "commit_id": commit_id.to_string(),
            "detail": detail,
        });
        let level = if applied { log::Level::Info } else { log::Level::Error };
        self.emit(level, "Configuration commit finished", message);
    }

    fn emit(&self, level: log::Level, summary: &str, mut data: serde_json::Value) {
        if let Some(fields) = data.as_object_mut() {
            fields.insert("category".to_string(), json!(self.category));
            fields.insert("timestamp".to_string(), json!(chrono::Utc::now().to_rfc3339()));
        }

        let full_message = format!("{} | {}", summary, data);
        match level {
            log::Level::Error | log::Level::Warn => error!("{}", full_message),
            log::Level::Info => info!("{}", full_message),
            _ => debug!("{}", full_message),
        }
    }
}
