//! Build engine abstraction
//!
//! The engine is an external collaborator. It consumes a resolved config
//! and reports lifecycle events over a channel:
//! - BuildEngine trait: interface the launcher drives
//! - MockEngine: scripted events for tests
//! - ProcessEngine: external command (see `process`)

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::resolve::ResolvedConfig;

/// Poll interval while serving
pub const STOP_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Lifecycle events emitted by an engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A compilation finished
    Done { has_errors: bool },
    /// The engine failed
    Error(String),
}

/// Engine failures, propagated to the exit path unchanged
#[derive(Debug, thiserror::Error)]
pub enum EngineStartError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write resolved config to {path}: {source}")]
    WriteConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{host}:{port} is already in use")]
    PortInUse { host: String, port: u16 },

    #[error("engine exited before ready ({status})")]
    Exited { status: ExitStatus },

    #[error("engine error: {0}")]
    Reported(String),

    #[error("engine stopped reporting events")]
    Disconnected,
}

/// An external build/serve engine
pub trait BuildEngine {
    /// Engine name for logs
    fn name(&self) -> &str;

    /// Start the engine with `config`; events arrive on the returned channel
    fn start(&mut self, config: &ResolvedConfig) -> Result<Receiver<EngineEvent>, EngineStartError>;

    /// Keep serving until `stop` is set
    fn run_until_stopped(&mut self, stop: &AtomicBool) -> Result<(), EngineStartError> {
        while !stop.load(Ordering::SeqCst) {
            thread::sleep(STOP_POLL_INTERVAL);
        }
        Ok(())
    }
}

/// Engine with scripted events, for tests
#[derive(Debug, Clone)]
pub struct MockEngine {
    script: Vec<EngineEvent>,
    fail_on_start: Option<String>,
    starts: Arc<AtomicUsize>,
}

impl MockEngine {
    /// Engine that reports one successful compilation
    pub fn new() -> Self {
        Self::scripted(vec![EngineEvent::Done { has_errors: false }])
    }

    /// Engine that emits `script` in order, then closes the channel
    pub fn scripted(script: Vec<EngineEvent>) -> Self {
        Self {
            script,
            fail_on_start: None,
            starts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Engine whose start fails with `reason`
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_on_start: Some(reason.into()),
            ..Self::scripted(Vec::new())
        }
    }

    /// Number of start calls, shared between clones
    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    fn start(
        &mut self,
        _config: &ResolvedConfig,
    ) -> Result<Receiver<EngineEvent>, EngineStartError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.fail_on_start {
            return Err(EngineStartError::Reported(reason.clone()));
        }

        let (tx, rx) = mpsc::channel();
        for event in &self.script {
            // The receiver is still alive here
            let _ = tx.send(event.clone());
        }
        Ok(rx)
    }

    fn run_until_stopped(&mut self, _stop: &AtomicBool) -> Result<(), EngineStartError> {
        Ok(())
    }
}
