//! Commit execution
//!
//! Sends a commit plan to the daemon: one `setconfig` request for the
//! properties to set, then one `unsetconfig` request for the properties to
//! revert. The apply is best effort. An error reported by the daemon for the
//! first request does not stop the second; only a transport failure aborts.

use thiserror::Error;
use uuid::Uuid;

use crate::daemon::ipc::{DaemonTransport, TransportError};
use crate::daemon::{ClientError, DaemonClient, SET_CONFIG_COMMAND, UNSET_CONFIG_COMMAND};
use crate::logging::EventLogger;
use crate::planner::CommitPlan;

/// The daemon could not be reached while committing; nothing after the
/// failing request was attempted
#[derive(Debug, Error)]
#[error("{command} failed: {source}")]
pub struct CommitError {
    pub commit_id: Uuid,
    pub command: &'static str,
    #[source]
    pub source: TransportError,
}

/// Non-fatal problem reported while applying a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitProblem {
    /// The daemon rejected the request with a message
    Rejected { command: &'static str, message: String },
    /// The daemon's reply could not be decoded
    BadResponse { command: &'static str, detail: String },
}

impl CommitProblem {
    /// Title and message pair for the error dialog
    pub fn dialog(&self) -> (String, String) {
        match self {
            CommitProblem::Rejected { message, .. } => ("Error".to_string(), message.clone()),
            CommitProblem::BadResponse { .. } => ("Bad response".to_string(), "Undefined error".to_string()),
        }
    }
}

/// What happened while applying a plan that reached the daemon
#[derive(Debug, Clone)]
pub struct CommitReport {
    pub commit_id: Uuid,
    /// Number of requests issued (0, 1 or 2)
    pub requests_sent: usize,
    /// Properties the daemon reported back as changed
    pub applied_properties: Vec<String>,
    pub problems: Vec<CommitProblem>,
}

impl CommitReport {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Apply `plan` through `client`.
///
/// An empty plan issues no request at all.
pub fn execute_plan<T: DaemonTransport>(
    client: &DaemonClient<T>,
    plan: &CommitPlan,
    commit_id: Uuid,
    logger: &EventLogger,
) -> Result<CommitReport, CommitError> {
    let mut report = CommitReport {
        commit_id,
        requests_sent: 0,
        applied_properties: Vec::new(),
        problems: Vec::new(),
    };

    if !plan.to_set.is_empty() {
        logger.log_request(commit_id, SET_CONFIG_COMMAND, plan.to_set.len());
        report.requests_sent += 1;
        let result = client.set_config(&plan.to_set);
        record_result(&mut report, SET_CONFIG_COMMAND, result, logger)?;
    }

    if !plan.to_unset.is_empty() {
        logger.log_request(commit_id, UNSET_CONFIG_COMMAND, plan.to_unset.len());
        report.requests_sent += 1;
        let result = client.unset_config(&plan.to_unset);
        record_result(&mut report, UNSET_CONFIG_COMMAND, result, logger)?;
    }

    Ok(report)
}

fn record_result(
    report: &mut CommitReport,
    command: &'static str,
    result: Result<crate::daemon::ipc::ConfigResult, ClientError>,
    logger: &EventLogger,
) -> Result<(), CommitError> {
    match result {
        Ok(result) if result.is_error() => {
            logger.log_daemon_error(report.commit_id, command, &result.error);
            report.problems.push(CommitProblem::Rejected {
                command,
                message: result.error,
            });
        }
        Ok(result) => {
            report.applied_properties.extend(result.properties.unwrap_or_default());
        }
        Err(ClientError::Transport(source)) => {
            return Err(CommitError {
                commit_id: report.commit_id,
                command,
                source,
            })
        }
        Err(ClientError::Daemon(message)) => {
            logger.log_daemon_error(report.commit_id, command, &message);
            report.problems.push(CommitProblem::Rejected { command, message });
        }
        Err(err @ (ClientError::Encode { .. } | ClientError::Decode { .. })) => {
            logger.log_daemon_error(report.commit_id, command, &err.to_string());
            report.problems.push(CommitProblem::BadResponse {
                command,
                detail: err.to_string(),
            });
        }
    }
    Ok(())
}
