//! Terminal implementation of the pane view
//!
//! Prints snapshots to stdout, errors to stderr and reads the apply
//! confirmation from an input stream (stdin in the binary).

use std::io::{self, BufRead, Write};

use crate::models::ConfigSnapshot;
use crate::output::{format_plan, format_snapshot_human, format_snapshot_json};
use crate::planner::CommitPlan;
use crate::session::PaneView;

pub struct TerminalView {
    json_output: bool,
    assume_yes: bool,
    /// Keep snapshots off the terminal (set/unset print the result themselves)
    silent: bool,
    errors: Vec<(String, String)>,
    input: Box<dyn BufRead + Send>,
}

impl TerminalView {
    pub fn new(json_output: bool, assume_yes: bool) -> Self {
        Self::with_input(json_output, assume_yes, Box::new(io::BufReader::new(io::stdin())))
    }

    pub fn with_input(json_output: bool, assume_yes: bool, input: Box<dyn BufRead + Send>) -> Self {
        Self {
            json_output,
            assume_yes,
            silent: false,
            errors: Vec::new(),
            input,
        }
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Print a snapshot regardless of the silent flag
    pub fn print_snapshot(&mut self, snapshot: &ConfigSnapshot) {
        if self.json_output {
            match format_snapshot_json(snapshot) {
                Ok(json) => println!("{}", json),
                Err(e) => self.show_error("Bad response", &e.to_string()),
            }
        } else {
            print!("{}", format_snapshot_human(snapshot));
        }
    }

    /// Every (title, message) pair shown so far
    pub fn errors(&self) -> &[(String, String)] {
        &self.errors
    }

    fn read_answer(&mut self) -> bool {
        print!("Are you sure you want to apply these changes? [y/N] ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => {
                println!();
                false
            }
            Ok(_) => matches!(line.trim().to_lowercase().as_str(), "y" | "yes"),
        }
    }
}

impl PaneView for TerminalView {
    fn render(&mut self, snapshot: &ConfigSnapshot) {
        if !self.silent {
            self.print_snapshot(snapshot);
        }
    }

    fn confirm_apply(&mut self, plan: &CommitPlan) -> bool {
        println!("Pending changes:");
        print!("{}", format_plan(plan));

        if self.assume_yes {
            return true;
        }
        self.read_answer()
    }

    fn show_error(&mut self, title: &str, message: &str) {
        eprintln!("❌ {}", title);
        eprintln!("   {}", message);
        self.errors.push((title.to_string(), message.to_string()));
    }
}
