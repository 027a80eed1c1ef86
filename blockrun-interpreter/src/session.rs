//! Run sessions.
//!
//! A session owns the scope chain, trace and turtle that runs execute
//! against. Only one run may be in flight at a time; a second request is
//! rejected rather than queued. Runs execute either on the caller's thread or
//! on a worker thread.

use crate::actuator::Turtle;
use crate::runner::{run_cancellable, RunConfig, RunReport};
use crate::scope::ScopeChain;
use crate::trace::TraceTable;
use crate::value::Value;
use blockrun_blocks::{Program, ProgramUnit};
use miette::Diagnostic;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Diagnostic, Debug)]
pub enum SessionError {
    #[error("A run is already in progress")]
    #[diagnostic(
        code(blockrun::session::run_in_progress),
        help("Wait for the current run to finish or cancel it first")
    )]
    RunInProgress,

    #[error("The run worker panicked")]
    #[diagnostic(code(blockrun::session::worker_panicked))]
    WorkerPanicked,

    #[error("Could not start the run worker")]
    #[diagnostic(code(blockrun::session::worker_spawn))]
    WorkerSpawn {
        #[source]
        source: std::io::Error,
    },
}

/// State a run has exclusive use of while it executes
#[derive(Debug, Clone, Default)]
struct SessionState {
    scope: ScopeChain,
    trace: TraceTable,
    turtle: Turtle,
    /// Globals the last run left behind; the scope itself is reset after every run
    last_bindings: Vec<(String, Value)>,
}

impl SessionState {
    fn run(
        &mut self,
        units: &[ProgramUnit],
        timestamp: String,
        config: &RunConfig,
        cancel: &AtomicBool,
    ) -> RunReport {
        let report = run_cancellable(
            units,
            &mut self.turtle,
            &mut self.scope,
            &mut self.trace,
            timestamp,
            config,
            cancel,
        );
        self.last_bindings = report.bindings().to_vec();
        report
    }
}

/// Marks a run as in flight until dropped
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self, SessionError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SessionError::RunInProgress)?;
        Ok(Self(Arc::clone(flag)))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Copies of the state a renderer shows after a run
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub trace: TraceTable,
    pub turtle: Turtle,
    pub bindings: Vec<(String, Value)>,
}

/// A run executing on a worker thread
pub struct RunHandle {
    handle: JoinHandle<RunReport>,
}

impl RunHandle {
    /// Wait for the run to finish
    pub fn join(self) -> Result<RunReport, SessionError> {
        self.handle.join().map_err(|_| SessionError::WorkerPanicked)
    }
}

pub struct RunSession {
    state: Arc<Mutex<SessionState>>,
    running: Arc<AtomicBool>,
    cancel: Arc<AtomicBool>,
    config: RunConfig,
}

impl RunSession {
    pub fn new(config: RunConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::default())),
            running: Arc::new(AtomicBool::new(false)),
            cancel: Arc::new(AtomicBool::new(false)),
            config,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run `units` on the calling thread
    pub fn run(
        &self,
        units: &[ProgramUnit],
        timestamp: impl Into<String>,
    ) -> Result<RunReport, SessionError> {
        let _in_flight = InFlight::acquire(&self.running)?;
        self.cancel.store(false, Ordering::Relaxed);
        debug!(units = units.len(), "starting run");

        let mut state = self.state.lock();
        Ok(state.run(units, timestamp.into(), &self.config, &self.cancel))
    }

    pub fn run_program(
        &self,
        program: &Program,
        timestamp: impl Into<String>,
    ) -> Result<RunReport, SessionError> {
        self.run(program.units(), timestamp)
    }

    /// Run `units` on a worker thread
    pub fn spawn_run(
        &self,
        units: Vec<ProgramUnit>,
        timestamp: impl Into<String>,
    ) -> Result<RunHandle, SessionError> {
        let in_flight = InFlight::acquire(&self.running)?;
        self.cancel.store(false, Ordering::Relaxed);
        debug!(units = units.len(), "starting run on worker");

        let state = Arc::clone(&self.state);
        let cancel = Arc::clone(&self.cancel);
        let config = self.config;
        let timestamp = timestamp.into();

        let handle = std::thread::Builder::new()
            .name("blockrun-run".to_string())
            .spawn(move || {
                let _in_flight = in_flight;
                state.lock().run(&units, timestamp, &config, &cancel)
            })
            .map_err(|source| SessionError::WorkerSpawn { source })?;

        Ok(RunHandle { handle })
    }

    /// Ask the run in flight to stop at the next unit or loop iteration
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Current trace and turtle with the globals of the last run; waits for a run in flight
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock();
        SessionSnapshot {
            trace: state.trace.clone(),
            turtle: state.turtle.clone(),
            bindings: state.last_bindings.clone(),
        }
    }

    /// Discard the trace; refused while a run is in flight
    pub fn clear_trace(&self) -> Result<(), SessionError> {
        let _in_flight = InFlight::acquire(&self.running)?;
        self.state.lock().trace.clear();
        Ok(())
    }
}

impl Default for RunSession {
    fn default() -> Self {
        Self::new(RunConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::Actuator;
    use blockrun_blocks::{Block, Placement, UnitId};

    fn unit(id: u32, block: Block) -> ProgramUnit {
        ProgramUnit::new(UnitId::new(id), block, Placement::default())
    }

    #[test]
    fn test_state_persists_between_runs() {
        let session = RunSession::default();
        let units = vec![
            unit(1, Block::assign("x", Block::literal(1))),
            unit(2, Block::move_forward(Block::literal(5))),
        ];

        session.run(&units, "first").unwrap();
        session.run(&units, "second").unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.trace.length(), 2);
        assert_eq!(snapshot.turtle.segments().len(), 2);
        assert_eq!(snapshot.bindings, vec![("x".to_string(), Value::Integer(1))]);
    }

    #[test]
    fn test_snapshot_bindings_follow_last_run() {
        let session = RunSession::default();
        assert!(session.snapshot().bindings.is_empty());

        session
            .run(
                &[
                    unit(1, Block::assign("a", Block::literal(6))),
                    unit(2, Block::assign("b", Block::literal(2))),
                ],
                "first",
            )
            .unwrap();
        assert_eq!(
            session.snapshot().bindings,
            vec![
                ("a".to_string(), Value::Integer(6)),
                ("b".to_string(), Value::Integer(2)),
            ]
        );

        session
            .run(&[unit(1, Block::assign("c", Block::literal(1)))], "second")
            .unwrap();
        assert_eq!(
            session.snapshot().bindings,
            vec![("c".to_string(), Value::Integer(1))]
        );
    }

    #[test]
    fn test_clear_trace() {
        let session = RunSession::default();
        session
            .run(&[unit(1, Block::assign("x", Block::literal(1)))], "now")
            .unwrap();
        session.clear_trace().unwrap();
        assert_eq!(session.snapshot().trace, TraceTable::new());
    }

    #[test]
    fn test_concurrent_run_rejected_and_cancel() {
        let session = RunSession::default();
        let forever = vec![unit(1, Block::while_loop(Block::literal(1), []))];

        let handle = session.spawn_run(forever, "now").unwrap();
        assert!(session.is_running());
        assert!(matches!(
            session.run(&[], "again"),
            Err(SessionError::RunInProgress)
        ));
        assert!(matches!(
            session.clear_trace(),
            Err(SessionError::RunInProgress)
        ));

        session.cancel();
        let report = handle.join().unwrap();
        assert_eq!(report.fault(), Some("Run cancelled"));
        assert!(!session.is_running());

        // the session is usable again and the cancel flag was reset
        let report = session.run(&[unit(1, Block::literal(3))], "later").unwrap();
        assert_eq!(report.fault(), None);
    }

    #[test]
    fn test_worker_run_matches_inline_run() {
        let session = RunSession::default();
        let units = vec![unit(1, Block::literal(2))];
        let report = session.spawn_run(units.clone(), "now").unwrap().join().unwrap();

        let inline = RunSession::default().run(&units, "now").unwrap();
        assert_eq!(report, inline);
    }
}
