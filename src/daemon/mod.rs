//! Daemon client module
//!
//! Typed access to the CRC daemon's configuration commands:
//! - getconfig: fetch the current configuration snapshot
//! - setconfig: set several properties in one request
//! - unsetconfig: revert properties to their defaults

pub mod ipc;

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::daemon::ipc::{
    ConfigResult, DaemonRequest, DaemonTransport, GetConfigResult, PropertyListArgs, SetConfigArgs,
    TransportError,
};
use crate::models::{ConfigProperty, ConfigSnapshot, ConfigValue};

pub const GET_CONFIG_COMMAND: &str = "getconfig";
pub const SET_CONFIG_COMMAND: &str = "setconfig";
pub const UNSET_CONFIG_COMMAND: &str = "unsetconfig";

/// Errors returned by daemon client operations
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("could not encode {command} request: {source}")]
    Encode {
        command: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("bad response to {command}: {source}")]
    Decode {
        command: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("daemon reported an error: {0}")]
    Daemon(String),
}

impl ClientError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}

/// Configuration client over any daemon transport
pub struct DaemonClient<T> {
    transport: T,
}

impl<T: DaemonTransport> DaemonClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch the complete configuration.
    ///
    /// Properties the daemon omits are unset in the returned snapshot.
    pub fn get_config(&self) -> Result<ConfigSnapshot, ClientError> {
        let no_filter: [ConfigProperty; 0] = [];
        let result: GetConfigResult = self.call(GET_CONFIG_COMMAND, PropertyListArgs { properties: &no_filter })?;

        if !result.error.is_empty() {
            return Err(ClientError::Daemon(result.error));
        }

        let (snapshot, skipped) = ConfigSnapshot::from_daemon_map(&result.configs);
        if !skipped.is_empty() {
            log::debug!("getconfig: ignored properties {:?}", skipped);
        }
        Ok(snapshot)
    }

    /// Set every property of `properties` in a single request
    pub fn set_config(&self, properties: &BTreeMap<ConfigProperty, ConfigValue>) -> Result<ConfigResult, ClientError> {
        self.call(SET_CONFIG_COMMAND, SetConfigArgs { properties })
    }

    /// Revert `properties` to the daemon defaults
    pub fn unset_config(&self, properties: &[ConfigProperty]) -> Result<ConfigResult, ClientError> {
        self.call(UNSET_CONFIG_COMMAND, PropertyListArgs { properties })
    }

    fn call<A, R>(&self, command: &'static str, args: A) -> Result<R, ClientError>
    where
        A: Serialize,
        R: serde::de::DeserializeOwned,
    {
        let request = serde_json::to_vec(&DaemonRequest { command, args })
            .map_err(|source| ClientError::Encode { command, source })?;

        log::debug!("sending {} request ({} bytes)", command, request.len());
        let response = self.transport.send(&request)?;

        serde_json::from_slice(&response).map_err(|source| ClientError::Decode { command, source })
    }
}
