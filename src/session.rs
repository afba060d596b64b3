//! Pane session task
//!
//! Runs the preferences pane as a single task that owns all pane state.
//! Edit events arrive on a channel; daemon round trips run on blocking
//! workers and post their results back to the task before any state is
//! touched, so the tracker and snapshot are never shared between threads.
//! Every fetch carries a generation number and only the newest one may
//! replace the snapshot.

use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::commit::{execute_plan, CommitError, CommitReport};
use crate::daemon::ipc::DaemonTransport;
use crate::daemon::{ClientError, DaemonClient};
use crate::logging::EventLogger;
use crate::models::{ConfigProperty, ConfigSnapshot, ConfigValue};
use crate::pane::{ConfigPane, PaneError};
use crate::planner::CommitPlan;

/// Rendering and dialog side of the pane
pub trait PaneView: Send {
    /// Paint a freshly fetched snapshot into the controls
    fn render(&mut self, snapshot: &ConfigSnapshot);

    /// Ask "Are you sure you want to apply these changes?"
    fn confirm_apply(&mut self, plan: &CommitPlan) -> bool;

    fn show_error(&mut self, title: &str, message: &str);
}

/// Events produced by the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum PaneEvent {
    Edit { property: ConfigProperty, value: ConfigValue },
    Consent(bool),
    Autostart(bool),
    Apply,
    Cancel,
    Reload,
    /// Stop accepting events; in-flight work is finished first
    Close,
}

enum Completion {
    Fetched {
        generation: u64,
        result: Result<ConfigSnapshot, ClientError>,
    },
    Committed(Result<CommitReport, CommitError>),
    /// The blocking worker died before reporting
    Lost { job: Job, reason: String },
}

#[derive(Debug, Clone, Copy)]
enum Job {
    Fetch(u64),
    Commit(Uuid),
}

/// Final state handed back when the session ends
pub struct ClosedSession<V> {
    pub view: V,
    pub pane: ConfigPane,
}

pub struct PaneSession<T, V> {
    client: Arc<DaemonClient<T>>,
    view: V,
    pane: ConfigPane,
    logger: EventLogger,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
    fetch_generation: u64,
}

impl<T, V> PaneSession<T, V>
where
    T: DaemonTransport + 'static,
    V: PaneView,
{
    pub fn new(client: DaemonClient<T>, view: V, logger: EventLogger) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            client: Arc::new(client),
            view,
            pane: ConfigPane::new(),
            logger,
            completions_tx,
            completions_rx,
            in_flight: 0,
            fetch_generation: 0,
        }
    }

    /// Load the configuration, then process events until `Close` or until
    /// every sender is dropped.
    pub async fn run(mut self, mut events: mpsc::Receiver<PaneEvent>) -> ClosedSession<V> {
        self.start_fetch();
        let mut closing = false;

        loop {
            if closing && self.in_flight == 0 {
                break;
            }

            tokio::select! {
                Some(done) = self.completions_rx.recv() => {
                    self.in_flight -= 1;
                    self.handle_completion(done);
                }
                event = events.recv(), if !closing => match event {
                    None | Some(PaneEvent::Close) => closing = true,
                    Some(event) => self.handle_event(event),
                },
            }
        }

        ClosedSession {
            view: self.view,
            pane: self.pane,
        }
    }

    fn handle_event(&mut self, event: PaneEvent) {
        let result = match event {
            PaneEvent::Edit { property, value } => self.pane.record_edit(property, value),
            PaneEvent::Consent(consent) => self.pane.record_consent(consent),
            PaneEvent::Autostart(autostart) => self.pane.record_autostart(autostart),
            PaneEvent::Apply => self.apply(),
            PaneEvent::Cancel => self.pane.cancel().map(|_| {
                if let Some(snapshot) = self.pane.snapshot() {
                    self.view.render(snapshot);
                }
            }),
            PaneEvent::Reload => self.pane.reload().map(|_| self.start_fetch()),
            PaneEvent::Close => Ok(()),
        };

        if let Err(err) = result {
            self.view.show_error("Cannot change configuration", &err.to_string());
        }
    }

    fn apply(&mut self) -> Result<(), PaneError> {
        let Some(plan) = self.pane.request_apply()? else {
            log::debug!("apply requested with no pending edits");
            return Ok(());
        };

        let accepted = self.view.confirm_apply(&plan);
        if let Some(plan) = self.pane.confirm(accepted)? {
            self.start_commit(plan);
        }
        Ok(())
    }

    fn handle_completion(&mut self, done: Completion) {
        match done {
            Completion::Fetched { generation, .. } if generation < self.fetch_generation => {
                log::debug!(
                    "dropping result of fetch #{}, fetch #{} is newer",
                    generation,
                    self.fetch_generation
                );
            }
            Completion::Fetched { result: Ok(snapshot), .. } => {
                self.logger.log_snapshot_fetched(snapshot.len());
                self.pane.load_snapshot(snapshot);
                if let Some(snapshot) = self.pane.snapshot() {
                    self.view.render(snapshot);
                }
            }
            Completion::Fetched { result: Err(err), .. } => {
                self.logger.log_fetch_failed(&err.to_string());
                let (title, message) = fetch_error_dialog(&err);
                self.view.show_error(&title, &message);
            }
            Completion::Committed(outcome) => self.settle_commit(outcome),
            Completion::Lost { job, reason } => self.settle_lost(job, &reason),
        }
    }

    fn settle_lost(&mut self, job: Job, reason: &str) {
        match job {
            Job::Fetch(generation) => {
                self.logger.log_fetch_failed(reason);
                if generation == self.fetch_generation {
                    self.view.show_error(
                        "Did not receive any response from the daemon",
                        "Ensure the CRC daemon is running, for more information please check the logs",
                    );
                }
            }
            Job::Commit(commit_id) => {
                self.logger.log_commit_finished(commit_id, false, Some(reason));
                self.view.show_error(
                    "Failed to apply configuration",
                    &format!(
                        "{}. Ensure the CRC daemon is running, for more information please check the logs",
                        reason
                    ),
                );
                if let Err(err) = self.pane.abort_commit() {
                    log::error!("lost commit {} was not in progress: {}", commit_id, err);
                }
            }
        }
    }

    fn settle_commit(&mut self, outcome: Result<CommitReport, CommitError>) {
        match &outcome {
            Ok(report) => {
                for problem in &report.problems {
                    let (title, message) = problem.dialog();
                    self.view.show_error(&title, &message);
                }
                self.logger.log_commit_finished(report.commit_id, true, None);
            }
            Err(err) => {
                self.logger.log_commit_finished(err.commit_id, false, Some(&err.to_string()));
                self.view.show_error(
                    "Failed to apply configuration",
                    &format!(
                        "{}. Ensure the CRC daemon is running, for more information please check the logs",
                        err
                    ),
                );
            }
        }

        match self.pane.finish_commit(&outcome) {
            Ok(true) => self.start_fetch(),
            Ok(false) => {}
            Err(err) => log::error!("commit result arrived out of order: {}", err),
        }
    }

    fn start_fetch(&mut self) {
        let client = Arc::clone(&self.client);
        self.fetch_generation += 1;
        let generation = self.fetch_generation;

        self.run_blocking(
            Job::Fetch(generation),
            move || client.get_config(),
            move |result| Completion::Fetched { generation, result },
        );
    }

    fn start_commit(&mut self, plan: CommitPlan) {
        let client = Arc::clone(&self.client);
        let logger = self.logger.clone();
        let commit_id = Uuid::new_v4();
        self.logger.log_commit_planned(commit_id, &plan);

        self.run_blocking(
            Job::Commit(commit_id),
            move || execute_plan(&client, &plan, commit_id, &logger),
            Completion::Committed,
        );
    }

    /// Run `work` on the blocking pool and post its result back to the
    /// session. A worker that panics is reported as `Completion::Lost` so
    /// `in_flight` always drains.
    fn run_blocking<R, W, C>(&mut self, job: Job, work: W, complete: C)
    where
        R: Send + 'static,
        W: FnOnce() -> R + Send + 'static,
        C: FnOnce(R) -> Completion + Send + 'static,
    {
        let done = self.completions_tx.clone();
        self.in_flight += 1;

        let worker = tokio::task::spawn_blocking(work);
        tokio::spawn(async move {
            let completion = match worker.await {
                Ok(result) => complete(result),
                Err(err) => Completion::Lost {
                    job,
                    reason: err.to_string(),
                },
            };
            let _ = done.send(completion);
        });
    }
}

/// Dialog text for a failed snapshot fetch
pub fn fetch_error_dialog(err: &ClientError) -> (String, String) {
    match err {
        ClientError::Transport(_) => (
            "Did not receive any response from the daemon".to_string(),
            "Ensure the CRC daemon is running, for more information please check the logs".to_string(),
        ),
        ClientError::Daemon(message) => ("Error".to_string(), message.clone()),
        ClientError::Encode { .. } | ClientError::Decode { .. } => {
            ("Bad response".to_string(), "Undefined error".to_string())
        }
    }
}
