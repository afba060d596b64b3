//! Preferences pane state machine
//!
//! Owns the pending edits and the last snapshot, and walks the commit
//! protocol: Idle -> PlanBuilt -> Committing -> Applied | Failed.
//! All mutation happens on the pane's own execution context; daemon I/O
//! is done elsewhere and reported back through `finish_commit`.

use thiserror::Error;

use crate::commit::{CommitError, CommitReport};
use crate::models::{ConfigProperty, ConfigSnapshot, ConfigValue, ValueKind};
use crate::planner::{build_plan, CommitPlan};
use crate::tracker::ChangeTracker;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaneError {
    #[error("an apply is already in progress")]
    Busy,

    #[error("no plan is waiting for confirmation")]
    NothingToConfirm,

    #[error("no commit is in progress")]
    NotCommitting,

    #[error("{property} expects {expected} values")]
    WrongKind {
        property: ConfigProperty,
        expected: &'static str,
    },
}

/// Where the pane is in the commit protocol
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CommitState {
    #[default]
    Idle,
    /// Plan built, waiting for the user's yes/no
    PlanBuilt(CommitPlan),
    Committing,
    Applied,
    Failed,
}

#[derive(Debug, Default)]
pub struct ConfigPane {
    tracker: ChangeTracker,
    snapshot: Option<ConfigSnapshot>,
    state: CommitState,
}

impl ConfigPane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CommitState {
        &self.state
    }

    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    pub fn snapshot(&self) -> Option<&ConfigSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn is_committing(&self) -> bool {
        self.state == CommitState::Committing
    }

    /// Record an edit whose value has the property's declared kind.
    ///
    /// The consent switch may also be edited with a boolean.
    pub fn record_edit(&mut self, property: ConfigProperty, value: ConfigValue) -> Result<(), PaneError> {
        self.ensure_editable()?;
        let switch_edit = property == ConfigProperty::ConsentTelemetry && value.kind() == ValueKind::Bool;
        if value.kind() != property.kind() && !switch_edit {
            return Err(PaneError::WrongKind {
                property,
                expected: property.kind().as_str(),
            });
        }
        self.tracker.record_edit(property, value);
        Ok(())
    }

    pub fn record_consent(&mut self, consent: bool) -> Result<(), PaneError> {
        self.ensure_editable()?;
        self.tracker.record_consent(consent);
        Ok(())
    }

    pub fn record_autostart(&mut self, autostart: bool) -> Result<(), PaneError> {
        self.ensure_editable()?;
        self.tracker.record_autostart(autostart);
        Ok(())
    }

    /// Replace the snapshot with a freshly fetched one
    pub fn load_snapshot(&mut self, snapshot: ConfigSnapshot) {
        self.snapshot = Some(snapshot);
    }

    /// User-requested reload: pending edits are dropped, the caller fetches
    pub fn reload(&mut self) -> Result<(), PaneError> {
        self.discard_edits()
    }

    /// User cancelled: pending edits are dropped
    pub fn cancel(&mut self) -> Result<(), PaneError> {
        self.discard_edits()
    }

    /// Build the plan for an apply request.
    ///
    /// Returns `None` and stays idle when there is nothing to apply.
    pub fn request_apply(&mut self) -> Result<Option<CommitPlan>, PaneError> {
        if self.is_committing() {
            return Err(PaneError::Busy);
        }

        let plan = build_plan(&self.tracker);
        if plan.is_empty() {
            self.state = CommitState::Idle;
            return Ok(None);
        }

        self.state = CommitState::PlanBuilt(plan.clone());
        Ok(Some(plan))
    }

    /// Record the user's answer to the confirmation prompt.
    ///
    /// On yes the pane enters `Committing` and hands back the plan to send.
    pub fn confirm(&mut self, accepted: bool) -> Result<Option<CommitPlan>, PaneError> {
        let plan = match &self.state {
            CommitState::PlanBuilt(plan) => plan.clone(),
            CommitState::Committing => return Err(PaneError::Busy),
            _ => return Err(PaneError::NothingToConfirm),
        };

        if !accepted {
            self.state = CommitState::Idle;
            return Ok(None);
        }

        self.state = CommitState::Committing;
        Ok(Some(plan))
    }

    /// Settle an in-flight commit.
    ///
    /// Returns true when the snapshot must be refetched. Pending edits are
    /// cleared once the daemon was reached, even if it rejected a request;
    /// a transport failure keeps them.
    pub fn finish_commit(&mut self, outcome: &Result<CommitReport, CommitError>) -> Result<bool, PaneError> {
        if !self.is_committing() {
            return Err(PaneError::NotCommitting);
        }

        match outcome {
            Ok(_) => {
                self.tracker.clear();
                self.state = CommitState::Applied;
                Ok(true)
            }
            Err(_) => {
                self.state = CommitState::Failed;
                Ok(false)
            }
        }
    }

    /// The commit worker vanished without a result.
    ///
    /// Settles like a transport failure: pending edits are kept.
    pub fn abort_commit(&mut self) -> Result<(), PaneError> {
        if !self.is_committing() {
            return Err(PaneError::NotCommitting);
        }
        self.state = CommitState::Failed;
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), PaneError> {
        if self.is_committing() {
            return Err(PaneError::Busy);
        }
        Ok(())
    }

    fn discard_edits(&mut self) -> Result<(), PaneError> {
        self.ensure_editable()?;
        self.tracker.clear();
        self.state = CommitState::Idle;
        Ok(())
    }
}
