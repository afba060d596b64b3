#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crc_settings::cli::{self, PaneCommand};
use crc_settings::config::PaneSettings;
use crc_settings::constants::{APP_SUBSYSTEM, PANE_CATEGORY};
use crc_settings::daemon::ipc::UnixSocketTransport;
use crc_settings::daemon::DaemonClient;
use crc_settings::limits::EditLimits;
use crc_settings::logging::{self, EventLogger, LogLevel};
use crc_settings::output::format_property_table;
use crc_settings::output::terminal::TerminalView;
use crc_settings::session::{PaneEvent, PaneSession};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::parse_args()?;

    let settings_path = args.config_path.clone().unwrap_or_else(PaneSettings::default_path);
    let settings = PaneSettings::load_or_default(&settings_path)?;

    let level = if args.verbose { LogLevel::Debug } else { settings.logging.level };
    logging::init(APP_SUBSYSTEM, level)?;

    let limits = EditLimits::detect();
    if args.command == PaneCommand::Properties {
        print!("{}", format_property_table(&limits));
        return Ok(());
    }

    let events = cli::edit_events(&args.command, &limits)?;
    let json_output = matches!(args.command, PaneCommand::Show { json_output: true });
    let assume_yes = args.assume_yes || settings.apply.assume_yes;

    // set/unset print the configuration once, after the change has landed
    let editing = !events.is_empty();
    let view = TerminalView::new(json_output, assume_yes).silent(editing);

    let socket_path = args.socket_path.clone().unwrap_or(settings.daemon.socket_path);
    let client = DaemonClient::new(UnixSocketTransport::new(socket_path));
    log::debug!("using daemon socket {}", client.transport().socket_path().display());

    let (tx, rx) = mpsc::channel(events.len() + 1);
    let session = PaneSession::new(client, view, EventLogger::new(PANE_CATEGORY));
    let handle = tokio::spawn(session.run(rx));

    for event in events.into_iter().chain(std::iter::once(PaneEvent::Close)) {
        tx.send(event).await.context("Pane session ended early")?;
    }
    drop(tx);

    let mut closed = handle.await.context("Pane session task failed")?;
    if editing && closed.pane.tracker().is_empty() {
        if let Some(snapshot) = closed.pane.snapshot() {
            closed.view.print_snapshot(snapshot);
        }
    }

    let errors = closed.view.errors().len();
    if errors > 0 {
        anyhow::bail!("{} error(s) reported", errors);
    }
    if !closed.pane.tracker().is_empty() {
        anyhow::bail!("Changes were not applied");
    }

    Ok(())
}
