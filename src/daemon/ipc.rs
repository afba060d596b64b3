//! Inter-process communication with the CRC daemon
//!
//! Wire messages of the daemon's command socket and the blocking transport
//! that carries them. One connection carries exactly one request and one
//! response: the client writes the JSON request, closes its write half and
//! reads the reply until EOF.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{ConfigProperty, ConfigValue};

/// Failure to exchange bytes with the daemon at all
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("could not connect to daemon socket {path}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("daemon connection failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("did not receive any response from the daemon")]
    NoResponse,
}

/// Synchronous request/response channel to the daemon
pub trait DaemonTransport: Send + Sync {
    /// Send one serialized request and block until the full response arrives
    fn send(&self, request: &[u8]) -> Result<Vec<u8>, TransportError>;
}

/// Command envelope understood by the daemon
#[derive(Debug, Serialize)]
pub struct DaemonRequest<A> {
    pub command: &'static str,
    pub args: A,
}

/// Arguments of `setconfig`
#[derive(Debug, Serialize)]
pub struct SetConfigArgs<'a> {
    pub properties: &'a BTreeMap<ConfigProperty, ConfigValue>,
}

/// Arguments of `unsetconfig` and `getconfig`
#[derive(Debug, Serialize)]
pub struct PropertyListArgs<'a> {
    pub properties: &'a [ConfigProperty],
}

/// Reply to `setconfig` / `unsetconfig`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfigResult {
    #[serde(rename = "Error", default)]
    pub error: String,
    /// Properties the daemon reports as applied
    #[serde(rename = "Properties", default)]
    pub properties: Option<Vec<String>>,
}

impl ConfigResult {
    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }
}

/// Reply to `getconfig`
#[derive(Debug, Clone, Deserialize)]
pub struct GetConfigResult {
    #[serde(rename = "Error", default)]
    pub error: String,
    #[serde(rename = "Configs", default)]
    pub configs: serde_json::Map<String, serde_json::Value>,
}

/// Transport over the daemon's Unix domain socket
#[derive(Debug, Clone)]
pub struct UnixSocketTransport {
    socket_path: PathBuf,
}

impl UnixSocketTransport {
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl DaemonTransport for UnixSocketTransport {
    fn send(&self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        let mut stream = UnixStream::connect(&self.socket_path).map_err(|source| TransportError::Connect {
            path: self.socket_path.clone(),
            source,
        })?;

        stream.write_all(request)?;
        stream.shutdown(Shutdown::Write)?;

        let mut response = Vec::new();
        stream.read_to_end(&mut response)?;

        if response.iter().all(u8::is_ascii_whitespace) {
            return Err(TransportError::NoResponse);
        }

        Ok(response)
    }
}
