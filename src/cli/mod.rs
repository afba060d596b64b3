//! CLI argument parsing and validation module
//!
//! Handles command-line interface using clap, including:
//! - Settings file and socket overrides
//! - show / set / unset / properties subcommands
//! - Turning `name=value` arguments into pane edit events

use anyhow::{anyhow, bail, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

use crate::limits::EditLimits;
use crate::models::{ConfigProperty, ConfigValue, ValueKind};
use crate::session::PaneEvent;

/// What the user asked the binary to do
#[derive(Debug, Clone, PartialEq)]
pub enum PaneCommand {
    Show { json_output: bool },
    Set { assignments: Vec<String> },
    Unset { names: Vec<String> },
    Properties,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub socket_path: Option<PathBuf>,
    pub assume_yes: bool,
    pub verbose: bool,
    pub command: PaneCommand,
}

fn build_command() -> Command {
    Command::new("crc-settings")
        .version(env!("CRC_SETTINGS_VERSION"))
        .long_version(concat!(env!("CRC_SETTINGS_VERSION"), " (", env!("GIT_HASH"), ")"))
        .about("View and change CodeReady Containers settings")
        .long_about("Reads the configuration held by the CRC daemon and applies edits to it over the daemon's command socket.")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Settings file (default: ~/.crc/crc-settings.toml)")
                .global(true),
        )
        .arg(
            Arg::new("socket")
                .short('s')
                .long("socket")
                .value_name("PATH")
                .help("Daemon socket path (default: ~/.crc/crc.sock)")
                .global(true),
        )
        .arg(
            Arg::new("yes")
                .short('y')
                .long("yes")
                .help("Apply without asking for confirmation")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("show")
                .about("Show the daemon's current configuration")
                .arg(
                    Arg::new("json")
                        .short('j')
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("set")
                .about("Change one or more properties")
                .arg(
                    Arg::new("assignment")
                        .value_name("NAME=VALUE")
                        .help("Property assignment; an empty value unsets a string property")
                        .required(true)
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            Command::new("unset")
                .about("Reset string properties to the daemon default")
                .arg(
                    Arg::new("name")
                        .value_name("NAME")
                        .required(true)
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(Command::new("properties").about("List the editable properties and their ranges"))
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    from_matches(&build_command().get_matches())
}

/// Parse an explicit argument list (first item is the program name)
pub fn parse_from<I, S>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = S>,
    S: Into<std::ffi::OsString> + Clone,
{
    let matches = build_command().try_get_matches_from(args)?;
    from_matches(&matches)
}

fn from_matches(matches: &ArgMatches) -> Result<CliArgs> {
    let command = match matches.subcommand() {
        Some(("show", sub)) => PaneCommand::Show {
            json_output: sub.get_flag("json"),
        },
        Some(("set", sub)) => PaneCommand::Set {
            assignments: collect(sub, "assignment"),
        },
        Some(("unset", sub)) => PaneCommand::Unset {
            names: collect(sub, "name"),
        },
        Some(("properties", _)) => PaneCommand::Properties,
        _ => return Err(anyhow!("No subcommand given")),
    };

    Ok(CliArgs {
        config_path: matches.get_one::<String>("config").map(PathBuf::from),
        socket_path: matches.get_one::<String>("socket").map(PathBuf::from),
        assume_yes: matches.get_flag("yes"),
        verbose: matches.get_flag("verbose"),
        command,
    })
}

fn collect(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// Translate a set/unset command into the events a user would produce by
/// editing the pane and pressing Apply.
///
/// Show and properties produce no events.
pub fn edit_events(command: &PaneCommand, limits: &EditLimits) -> Result<Vec<PaneEvent>> {
    let mut events = Vec::new();

    match command {
        PaneCommand::Set { assignments } => {
            for assignment in assignments {
                let (name, raw) = assignment
                    .split_once('=')
                    .ok_or_else(|| anyhow!("Expected NAME=VALUE, got '{}'", assignment))?;
                let property = ConfigProperty::from_name(name.trim())?;
                let value = property.parse_value(raw)?;
                limits.check(property, &value)?;
                events.push(edit_event(property, value));
            }
        }
        PaneCommand::Unset { names } => {
            for name in names {
                let property = ConfigProperty::from_name(name.trim())?;
                if property.kind() != ValueKind::Text {
                    bail!("{} cannot be unset, it holds a {}", property, property.kind().as_str());
                }
                events.push(PaneEvent::Edit {
                    property,
                    value: ConfigValue::Text(String::new()),
                });
            }
        }
        PaneCommand::Show { .. } | PaneCommand::Properties => return Ok(events),
    }

    events.push(PaneEvent::Apply);
    Ok(events)
}

fn edit_event(property: ConfigProperty, value: ConfigValue) -> PaneEvent {
    match (property, &value) {
        (ConfigProperty::AutostartTray, ConfigValue::Bool(on)) => PaneEvent::Autostart(*on),
        _ => PaneEvent::Edit { property, value },
    }
}
