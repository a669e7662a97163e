//! Service launcher
//!
//! Thin adapter over an external build engine. Drives one start, observes
//! readiness once and reports the reachable addresses:
//! `Idle -> Starting -> Ready` or `Idle -> Starting -> Failed`.

mod address;
mod banner;
mod engine;
mod process;

pub use address::{local_network_ip, loopback_host, Addresses, UNAVAILABLE};
pub use banner::{write_ready, write_starting};
pub use engine::{BuildEngine, EngineEvent, EngineStartError, MockEngine, STOP_POLL_INTERVAL};
pub use process::{ProcessEngine, CONFIG_PATH_ENV};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;

use crate::resolve::ResolvedConfig;

/// Launcher lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    Idle,
    Starting,
    Ready,
    Failed,
}

impl LaunchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

/// Launch errors
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("a launcher is already active in this process")]
    AlreadyActive,

    #[error("readiness has already been observed")]
    ReadinessAlreadyObserved,

    #[error("failed to write status output: {0}")]
    Output(#[from] io::Error),

    #[error(transparent)]
    Engine(#[from] EngineStartError),
}

static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Held while a launcher is active in this process
#[derive(Debug)]
pub struct ProcessSlot {
    _private: (),
}

impl Drop for ProcessSlot {
    fn drop(&mut self) {
        ACTIVE.store(false, Ordering::SeqCst);
    }
}

/// Claim the single launcher slot of this process
pub fn claim_process_slot() -> Result<ProcessSlot, LaunchError> {
    ACTIVE
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .map(|_| ProcessSlot { _private: () })
        .map_err(|_| LaunchError::AlreadyActive)
}

/// Emitted once the engine reports a successful compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadyEvent {
    pub addresses: Addresses,
    pub ready_at: DateTime<Utc>,
}

/// Drives one launch of a build engine
pub struct Launcher<E: BuildEngine> {
    engine: E,
    state: LaunchState,
}

impl<E: BuildEngine> Launcher<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: LaunchState::Idle,
        }
    }

    pub fn state(&self) -> LaunchState {
        self.state
    }

    /// Write the banner and start the engine.
    ///
    /// Consumes the launcher and holds the process slot until the handle
    /// is dropped, so at most one engine runs per process. Engine failures
    /// are returned as they are, without retry.
    pub fn launch(
        mut self,
        config: ResolvedConfig,
        out: &mut dyn Write,
    ) -> Result<LaunchHandle<E>, LaunchError> {
        let slot = claim_process_slot()?;
        write_starting(out)?;
        self.state = LaunchState::Starting;
        tracing::debug!(engine = %self.engine.name(), "launching");

        match self.engine.start(&config) {
            Ok(events) => Ok(LaunchHandle {
                engine: self.engine,
                config,
                events,
                state: LaunchState::Starting,
                observed: false,
                _slot: slot,
            }),
            Err(e) => {
                self.state = LaunchState::Failed;
                tracing::error!(engine = %self.engine.name(), error = %e, "engine failed to start");
                Err(e.into())
            }
        }
    }
}

/// A started engine awaiting readiness
pub struct LaunchHandle<E: BuildEngine> {
    engine: E,
    config: ResolvedConfig,
    events: Receiver<EngineEvent>,
    state: LaunchState,
    observed: bool,
    _slot: ProcessSlot,
}

impl<E: BuildEngine> LaunchHandle<E> {
    pub fn state(&self) -> LaunchState {
        self.state
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Wait for the first successful compilation and report the addresses.
    ///
    /// Compilations with errors are skipped. Observable once per launch.
    pub fn on_ready(&mut self, out: &mut dyn Write) -> Result<ReadyEvent, LaunchError> {
        if self.observed {
            return Err(LaunchError::ReadinessAlreadyObserved);
        }
        self.observed = true;

        let failure = loop {
            match self.events.recv() {
                Ok(EngineEvent::Done { has_errors: false }) => break None,
                Ok(EngineEvent::Done { has_errors: true }) => {
                    tracing::warn!("compilation finished with errors, waiting for next build");
                }
                Ok(EngineEvent::Error(reason)) => break Some(EngineStartError::Reported(reason)),
                Err(_) => break Some(EngineStartError::Disconnected),
            }
        };

        if let Some(e) = failure {
            self.state = LaunchState::Failed;
            tracing::error!(engine = %self.engine.name(), error = %e, "engine failed before ready");
            return Err(e.into());
        }

        self.state = LaunchState::Ready;
        let ready = ReadyEvent {
            addresses: Addresses::for_server(self.config.dev_server()),
            ready_at: Utc::now(),
        };
        tracing::info!(
            local = %ready.addresses.local,
            network = %ready.addresses.network,
            "dev server ready"
        );
        write_ready(out, &ready.addresses)?;
        Ok(ready)
    }

    /// Serve until `stop` is set or the engine exits
    pub fn run_until_stopped(&mut self, stop: &AtomicBool) -> Result<(), LaunchError> {
        self.engine.run_until_stopped(stop)?;
        Ok(())
    }
}
