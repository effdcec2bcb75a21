//! Periodic execution of compare→apply cycles
//!
//! One thread owns the [`SyncScheduler`] and runs cycles and waits strictly in
//! sequence. Any other thread may hold the shared [`SyncControl`] and request
//! an immediate sync or a stop; the scheduler notices within one poll
//! interval. Neither request interrupts a cycle that is already running.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::apply::{ApplyReport, ReplicaMutator};
use crate::compare::TreeComparer;
use crate::config::{DEFAULT_POLL_INTERVAL_MS, SyncConfig};
use crate::fingerprint::CompareMode;

/// Cross-thread stop and sync-now requests.
#[derive(Debug, Default)]
pub struct SyncControl {
    stop_requested: AtomicBool,
    immediate_sync_requested: AtomicBool,
}

impl SyncControl {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Ask the scheduler to finish after the current cycle or wait.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    /// Ask the scheduler to cut its current wait short.
    pub fn request_immediate_sync(&self) {
        self.immediate_sync_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    /// Read and clear the sync-now request.
    pub fn take_immediate_sync(&self) -> bool {
        self.immediate_sync_requested.swap(false, Ordering::SeqCst)
    }
}

/// Lifecycle of a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Waiting,
    Stopped,
}

/// Why a wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeReason {
    IntervalElapsed,
    ImmediateSync,
    Stop,
}

/// Result of one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The diff was computed and applied (possibly with item failures)
    Completed(ApplyReport),
    /// The cycle was abandoned before anything was applied
    Skipped { reason: String },
}

/// Totals over a whole [`SyncScheduler::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles_completed: usize,
    pub cycles_skipped: usize,
}

/// Drives compare→apply on an interval.
#[derive(Debug)]
pub struct SyncScheduler {
    source: PathBuf,
    replica: PathBuf,
    interval: Duration,
    poll_interval: Duration,
    comparer: TreeComparer,
    mutator: ReplicaMutator,
    control: Arc<SyncControl>,
    state: SchedulerState,
}

impl SyncScheduler {
    pub fn new(
        source: impl Into<PathBuf>,
        replica: impl Into<PathBuf>,
        interval: Duration,
        control: Arc<SyncControl>,
    ) -> Self {
        let replica = replica.into();
        Self {
            source: source.into(),
            mutator: ReplicaMutator::new(replica.clone()),
            replica,
            interval,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            comparer: TreeComparer::default(),
            control,
            state: SchedulerState::Idle,
        }
    }

    /// Build a scheduler from a validated configuration.
    pub fn from_config(config: &SyncConfig, control: Arc<SyncControl>) -> Self {
        Self::new(&config.source, &config.replica, config.interval(), control)
            .with_poll_interval(config.poll_interval())
            .with_compare_mode(config.compare_mode)
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_compare_mode(mut self, mode: CompareMode) -> Self {
        self.comparer = TreeComparer::new(mode);
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn replica(&self) -> &Path {
        &self.replica
    }

    /// Run cycles until a stop is requested.
    ///
    /// The first cycle starts immediately. Cycle-level failures are logged and
    /// never end the loop.
    pub fn run(&mut self) -> RunSummary {
        let mut summary = RunSummary::default();

        while !self.control.is_stop_requested() {
            match self.run_cycle() {
                CycleOutcome::Completed(_) => summary.cycles_completed += 1,
                CycleOutcome::Skipped { .. } => summary.cycles_skipped += 1,
            }

            if self.wait() == WakeReason::Stop {
                break;
            }
        }

        self.state = SchedulerState::Stopped;
        info!(
            completed = summary.cycles_completed,
            skipped = summary.cycles_skipped,
            "Synchronization stopped"
        );
        summary
    }

    /// Perform one compare→apply pass.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        self.state = SchedulerState::Running;
        info!(source = %self.source.display(), replica = %self.replica.display(), "Synchronization started");

        if !self.source.is_dir() {
            let reason = format!("Source directory ({}) not found", self.source.display());
            error!("{}; skipping cycle", reason);
            return CycleOutcome::Skipped { reason };
        }

        if !self.replica.exists() {
            warn!(replica = %self.replica.display(), "Replica folder was not found. Creating...");
            if let Err(e) = mirror_fs::io::create_dir_all(&self.replica) {
                let reason = format!("Failed to create replica folder: {}", e);
                error!("{}; skipping cycle", reason);
                return CycleOutcome::Skipped { reason };
            }
        }

        let diff = match self.comparer.compare(&self.source, &self.replica) {
            Ok(diff) => diff,
            Err(e) => {
                let reason = format!("Comparison failed: {}", e);
                error!("{}; skipping cycle", reason);
                return CycleOutcome::Skipped { reason };
            }
        };

        if diff.is_empty() {
            debug!("Replica is up to date");
            return CycleOutcome::Completed(ApplyReport::default());
        }

        let report = self.mutator.apply(&diff);
        if report.is_success() {
            info!(changes = report.changes(), "Synchronization finished");
        } else {
            warn!(
                changes = report.changes(),
                failures = report.failures.len(),
                "Synchronization finished with failures; they will be retried next cycle"
            );
        }
        CycleOutcome::Completed(report)
    }

    /// Sleep until the interval elapses, a sync is requested, or a stop is
    /// requested, polling the shared flags every `poll_interval`.
    pub fn wait(&mut self) -> WakeReason {
        self.state = SchedulerState::Waiting;
        let deadline = Instant::now() + self.interval;

        loop {
            if self.control.is_stop_requested() {
                return WakeReason::Stop;
            }
            if self.control.take_immediate_sync() {
                info!("Immediate synchronization requested");
                return WakeReason::ImmediateSync;
            }

            let now = Instant::now();
            if now >= deadline {
                return WakeReason::IntervalElapsed;
            }
            thread::sleep(self.poll_interval.min(deadline - now));
        }
    }
}
