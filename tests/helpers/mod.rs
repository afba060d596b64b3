#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

use crc_settings::daemon::ipc::{DaemonTransport, TransportError};
use crc_settings::models::ConfigSnapshot;
use crc_settings::planner::CommitPlan;
use crc_settings::session::PaneView;

/// Reply a fake daemon gives to one request
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Raw(String),
    Drop,
    /// Answer with the inner reply after a pause
    Delayed(Duration, Box<Reply>),
    /// The transport itself panics
    Panic,
}

/// In-memory transport: answers from a script keyed by command and records
/// every request it sees.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    inner: Arc<Mutex<Script>>,
}

#[derive(Default)]
struct Script {
    configs: Value,
    replies: VecDeque<(String, Reply)>,
    requests: Vec<Value>,
}

impl ScriptedTransport {
    /// Transport whose getconfig always answers with `configs`
    pub fn with_configs(configs: Value) -> Self {
        let transport = Self::default();
        transport.inner.lock().unwrap().configs = configs;
        transport
    }

    /// Queue a reply for the next request carrying `command`
    pub fn reply_to(&self, command: &str, reply: Reply) {
        self.inner
            .lock()
            .unwrap()
            .replies
            .push_back((command.to_string(), reply));
    }

    pub fn requests(&self) -> Vec<Value> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r["command"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

impl DaemonTransport for ScriptedTransport {
    fn send(&self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        let request: Value = serde_json::from_slice(request).expect("client sent invalid JSON");
        let command = request["command"].as_str().unwrap_or_default().to_string();

        let mut reply = {
            let mut script = self.inner.lock().unwrap();
            script.requests.push(request);

            let queued = script
                .replies
                .iter()
                .position(|(c, _)| *c == command)
                .and_then(|i| script.replies.remove(i))
                .map(|(_, reply)| reply);

            match queued {
                Some(reply) => reply,
                None if command == "getconfig" => {
                    Reply::Json(json!({"Error": "", "Configs": script.configs.clone()}))
                }
                None => Reply::Json(json!({"Error": "", "Properties": null})),
            }
        };

        // lock released: slow replies must not block other requests
        loop {
            match reply {
                Reply::Json(value) => return Ok(value.to_string().into_bytes()),
                Reply::Raw(text) => return Ok(text.into_bytes()),
                Reply::Drop => return Err(TransportError::NoResponse),
                Reply::Delayed(pause, inner) => {
                    thread::sleep(pause);
                    reply = *inner;
                }
                Reply::Panic => panic!("transport failed while handling {}", command),
            }
        }
    }
}

/// View that answers confirmations from a preset and records everything
#[derive(Default)]
pub struct RecordingView {
    pub accept: bool,
    pub renders: Vec<ConfigSnapshot>,
    pub prompts: Vec<CommitPlan>,
    pub errors: Vec<(String, String)>,
}

impl RecordingView {
    pub fn accepting() -> Self {
        Self {
            accept: true,
            ..Self::default()
        }
    }

    pub fn declining() -> Self {
        Self::default()
    }
}

impl PaneView for RecordingView {
    fn render(&mut self, snapshot: &ConfigSnapshot) {
        self.renders.push(snapshot.clone());
    }

    fn confirm_apply(&mut self, plan: &CommitPlan) -> bool {
        self.prompts.push(plan.clone());
        self.accept
    }

    fn show_error(&mut self, title: &str, message: &str) {
        self.errors.push((title.to_string(), message.to_string()));
    }
}

/// A daemon listening on a real Unix socket inside a temp directory.
///
/// Each connection gets one reply from `respond`; the request it read is
/// recorded.
pub struct FakeDaemon {
    pub dir: TempDir,
    pub socket_path: PathBuf,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl FakeDaemon {
    pub fn start<F>(respond: F) -> anyhow::Result<Self>
    where
        F: Fn(&Value) -> Reply + Send + 'static,
    {
        let dir = tempfile::tempdir()?;
        let socket_path = dir.path().join("crc.sock");
        let listener = UnixListener::bind(&socket_path)?;
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let mut buf = Vec::new();
                if stream.read_to_end(&mut buf).is_err() {
                    continue;
                }
                let request: Value = serde_json::from_slice(&buf).unwrap_or(Value::Null);
                let reply = respond(&request);
                seen.lock().unwrap().push(request);

                match reply {
                    Reply::Json(value) => {
                        let _ = stream.write_all(value.to_string().as_bytes());
                    }
                    Reply::Raw(text) => {
                        let _ = stream.write_all(text.as_bytes());
                    }
                    Reply::Drop | Reply::Panic => {}
                    Reply::Delayed(pause, inner) => {
                        thread::sleep(pause);
                        if let Reply::Json(value) = *inner {
                            let _ = stream.write_all(value.to_string().as_bytes());
                        }
                    }
                }
            }
        });

        Ok(Self {
            dir,
            socket_path,
            requests,
        })
    }

    /// Daemon that serves `configs` and accepts every change
    pub fn serving(configs: Value) -> anyhow::Result<Self> {
        Self::start(move |request| match request["command"].as_str() {
            Some("getconfig") => Reply::Json(json!({"Error": "", "Configs": configs.clone()})),
            _ => Reply::Json(json!({"Error": "", "Properties": null})),
        })
    }

    pub fn path(&self) -> &Path {
        &self.socket_path
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}
