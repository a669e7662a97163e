//! External command engine
//!
//! Writes the resolved config as JSON, spawns the configured command and
//! reports ready once the dev-server port accepts connections. The port
//! must be free before the command starts.

use std::fs;
use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::address::loopback_host;
use super::engine::{BuildEngine, EngineEvent, EngineStartError, STOP_POLL_INTERVAL};
use crate::config::{ProjectConfig, CONFIG_ARG_PLACEHOLDER};
use crate::resolve::ResolvedConfig;

/// Environment variable carrying the resolved config path to the command
pub const CONFIG_PATH_ENV: &str = "GARFIELD_RESOLVED_CONFIG";

const READY_POLL_INTERVAL: Duration = Duration::from_millis(200);
const CONNECT_TIMEOUT: Duration = Duration::from_millis(250);

/// Runs the build engine as a child process
pub struct ProcessEngine {
    program: String,
    args: Vec<String>,
    config_out: PathBuf,
    working_dir: PathBuf,
    child: Option<Arc<Mutex<Child>>>,
}

impl ProcessEngine {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        config_out: impl Into<PathBuf>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            config_out: config_out.into(),
            working_dir: working_dir.into(),
            child: None,
        }
    }

    /// Engine described by the project's `[engine]` section
    pub fn from_project(project: &ProjectConfig) -> Self {
        Self::new(
            project.engine.program.clone(),
            project.engine.args.clone(),
            project.engine_config_out(),
            project.root(),
        )
    }

    pub fn config_out(&self) -> &Path {
        &self.config_out
    }

    /// Arguments with the config placeholder substituted
    pub fn command_args(&self) -> Vec<String> {
        let config_path = self.config_out.display().to_string();
        self.args
            .iter()
            .map(|arg| arg.replace(CONFIG_ARG_PLACEHOLDER, &config_path))
            .collect()
    }

    fn write_config(&self, config: &ResolvedConfig) -> Result<(), EngineStartError> {
        let to_error = |source: io::Error| EngineStartError::WriteConfig {
            path: self.config_out.clone(),
            source,
        };

        if let Some(parent) = self.config_out.parent() {
            fs::create_dir_all(parent).map_err(to_error)?;
        }
        let json = config
            .to_json()
            .map_err(|e| to_error(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        fs::write(&self.config_out, json).map_err(to_error)
    }
}

impl BuildEngine for ProcessEngine {
    fn name(&self) -> &str {
        &self.program
    }

    fn start(
        &mut self,
        config: &ResolvedConfig,
    ) -> Result<Receiver<EngineEvent>, EngineStartError> {
        let server = config.dev_server();
        let host = loopback_host(&server.host).to_string();
        let port = server.port;

        // A listener here would be mistaken for the engine
        if port_open(&host, port) {
            return Err(EngineStartError::PortInUse { host, port });
        }

        self.write_config(config)?;

        let args = self.command_args();
        tracing::info!(program = %self.program, args = ?args, "starting build engine");

        let child = Command::new(&self.program)
            .args(&args)
            .current_dir(&self.working_dir)
            .env(CONFIG_PATH_ENV, &self.config_out)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| EngineStartError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let child = Arc::new(Mutex::new(child));
        self.child = Some(Arc::clone(&child));

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || watch_until_ready(&child, &host, port, &tx));
        Ok(rx)
    }

    fn run_until_stopped(&mut self, stop: &AtomicBool) -> Result<(), EngineStartError> {
        let Some(child) = self.child.take() else {
            return Ok(());
        };

        loop {
            {
                let mut child = child.lock().map_err(|_| EngineStartError::Disconnected)?;
                if stop.load(Ordering::SeqCst) {
                    tracing::info!(program = %self.program, "stopping build engine");
                    // Already exited is fine
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(());
                }
                match child.try_wait() {
                    Ok(Some(status)) if status.success() => return Ok(()),
                    Ok(Some(status)) => return Err(EngineStartError::Exited { status }),
                    Ok(None) => {}
                    Err(e) => return Err(EngineStartError::Reported(e.to_string())),
                }
            }
            thread::sleep(STOP_POLL_INTERVAL);
        }
    }
}

impl Drop for ProcessEngine {
    fn drop(&mut self) {
        if let Some(child) = self.child.take() {
            if let Ok(mut child) = child.lock() {
                if let Ok(None) = child.try_wait() {
                    let _ = child.kill();
                    let _ = child.wait();
                }
            }
        }
    }
}

fn port_open(host: &str, port: u16) -> bool {
    let Ok(addrs) = (host, port).to_socket_addrs() else {
        return false;
    };
    addrs
        .into_iter()
        .any(|addr| TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).is_ok())
}

/// Poll until the port opens (`Done`) or the child exits (`Error`)
fn watch_until_ready(child: &Mutex<Child>, host: &str, port: u16, tx: &Sender<EngineEvent>) {
    loop {
        let exited = match child.lock() {
            Ok(mut child) => match child.try_wait() {
                Ok(Some(status)) => Some(format!("engine exited before ready ({})", status)),
                Ok(None) => None,
                Err(e) => Some(e.to_string()),
            },
            Err(_) => Some("engine state poisoned".to_string()),
        };

        if let Some(reason) = exited {
            let _ = tx.send(EngineEvent::Error(reason));
            return;
        }

        if port_open(host, port) {
            tracing::debug!(host = %host, port, "dev server accepting connections");
            let _ = tx.send(EngineEvent::Done { has_errors: false });
            return;
        }

        thread::sleep(READY_POLL_INTERVAL);
    }
}
