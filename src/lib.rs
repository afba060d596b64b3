//! crc-settings - CodeReady Containers preferences library
//!
//! This library exposes the pane core: edit tracking, commit planning,
//! the commit state machine and the daemon client used to read and
//! write the CRC configuration.

pub mod cli;
pub mod commit;
pub mod config;
pub mod constants;
pub mod daemon;
pub mod limits;
pub mod logging;
pub mod models;
pub mod output;
pub mod pane;
pub mod planner;
pub mod session;
pub mod tracker;
