//! Multi-threaded workloads that check a [`SyncedFlag`] for lost updates and
//! out-of-order reads.

use crate::config::StressConfig;
use crate::error::{FlagError, Result};
use crate::lock::LockStats;
use crate::synced::SyncedFlag;
use log::{debug, info, warn};
use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Outcome of [`flip_parity`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParityReport {
    /// Threads flipping per round
    pub threads: usize,

    /// Rounds executed
    pub rounds: usize,

    /// State every round should end in
    pub expected: bool,

    /// Rounds whose final state differed from `expected`
    pub mismatched_rounds: usize,

    /// Lock usage over the whole run
    pub stats: LockStats,
}

impl ParityReport {
    /// True when no flip was lost.
    pub fn is_clean(&self) -> bool {
        self.mismatched_rounds == 0
    }
}

impl fmt::Display for ParityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "parity: {} threads x {} rounds, expected {}",
            self.threads, self.rounds, self.expected
        )?;
        writeln!(f, "mismatched rounds: {}", self.mismatched_rounds)?;
        write_stats(f, &self.stats)
    }
}

/// Outcome of [`readers_writers`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixedReport {
    /// Reader threads
    pub readers: usize,

    /// Writer threads
    pub writers: usize,

    /// Operations per thread
    pub iterations: usize,

    /// Reads that returned `true`
    pub true_reads: usize,

    /// Reads that returned `false`
    pub false_reads: usize,

    /// Reads of `false` after the same reader had already seen `true`
    pub stale_reads: usize,

    /// State after every thread finished
    pub final_state: bool,

    /// Lock usage over the whole run
    pub stats: LockStats,
}

impl MixedReport {
    /// True when every read was consistent and every write landed.
    pub fn is_clean(&self) -> bool {
        self.stale_reads == 0
            && self.true_reads + self.false_reads == self.readers * self.iterations
            && self.final_state == (self.writers > 0)
    }
}

impl fmt::Display for MixedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "stress: {} readers, {} writers x {} iterations",
            self.readers, self.writers, self.iterations
        )?;
        writeln!(
            f,
            "reads: {} true, {} false, {} stale",
            self.true_reads, self.false_reads, self.stale_reads
        )?;
        writeln!(f, "final state: {}", self.final_state)?;
        write_stats(f, &self.stats)
    }
}

fn write_stats(f: &mut fmt::Formatter<'_>, stats: &LockStats) -> fmt::Result {
    write!(
        f,
        "lock: {} acquisitions, max wait {}us, max hold {}us, contention {:.2}",
        stats.acquisitions,
        stats.max_wait_us,
        stats.max_hold_us,
        stats.contention_factor()
    )
}

/// Flip `flag` once from each of `threads` threads, `rounds` times over.
///
/// Each round starts from `false` and releases all threads together. With no
/// lost updates every round ends in `threads % 2 == 1`.
pub fn flip_parity(flag: &Arc<SyncedFlag>, threads: usize, rounds: usize) -> Result<ParityReport> {
    if threads == 0 || rounds == 0 {
        return Err(FlagError::InvalidConfig(
            "parity needs at least one thread and one round".into(),
        ));
    }

    let expected = threads % 2 == 1;
    let mut mismatched_rounds = 0;
    flag.reset_stats();

    for round in 0..rounds {
        flag.set(false);
        let gate = Arc::new(StartGate::new());

        let handles = spawn_workers(&gate, "flipper", threads, || {
            let flag = Arc::clone(flag);
            move || flag.flip()
        })?;
        gate.open();
        join_all(handles, "flipper")?;

        let observed = flag.is_true();
        if observed != expected {
            warn!(
                "parity round {}: expected {}, observed {}",
                round, expected, observed
            );
            mismatched_rounds += 1;
        } else {
            debug!("parity round {} ok", round);
        }
    }

    let report = ParityReport {
        threads,
        rounds,
        expected,
        mismatched_rounds,
        stats: flag.stats(),
    };
    info!(
        "parity finished: {}/{} rounds clean",
        rounds - mismatched_rounds,
        rounds
    );
    Ok(report)
}

/// Run concurrent `set(true)` writers against `is_true` readers.
///
/// The flag starts `false` and only ever moves to `true`, so a reader that
/// sees `false` after having seen `true` observed writes out of order.
pub fn readers_writers(flag: &Arc<SyncedFlag>, config: &StressConfig) -> Result<MixedReport> {
    config.validate_mixed()?;

    let StressConfig {
        readers,
        writers,
        iterations,
        ..
    } = *config;

    flag.set(false);
    flag.reset_stats();
    debug!(
        "starting mixed workload: {} readers, {} writers",
        readers, writers
    );

    let gate = Arc::new(StartGate::new());

    let writer_handles = spawn_workers(&gate, "writer", writers, || {
        let flag = Arc::clone(flag);
        move || {
            for _ in 0..iterations {
                flag.set(true);
            }
        }
    })?;

    let spawned_readers = spawn_workers(&gate, "reader", readers, || {
        let flag = Arc::clone(flag);
        move || {
            let mut tally = ReadTally::default();
            for _ in 0..iterations {
                tally.record(flag.is_true());
            }
            tally
        }
    });
    let reader_handles = match spawned_readers {
        Ok(handles) => handles,
        Err(err) => {
            // The gate is already aborted; writers exit without writing.
            let _ = join_all(writer_handles, "writer");
            return Err(err);
        }
    };

    gate.open();
    join_all(writer_handles, "writer")?;
    let tallies = join_all(reader_handles, "reader")?;

    let mut total = ReadTally::default();
    for tally in tallies {
        total.true_reads += tally.true_reads;
        total.false_reads += tally.false_reads;
        total.stale_reads += tally.stale_reads;
    }

    let report = MixedReport {
        readers,
        writers,
        iterations,
        true_reads: total.true_reads,
        false_reads: total.false_reads,
        stale_reads: total.stale_reads,
        final_state: flag.is_true(),
        stats: flag.stats(),
    };

    if report.is_clean() {
        info!("mixed workload clean");
    } else {
        warn!("mixed workload inconsistent: {:?}", report);
    }
    Ok(report)
}

#[derive(Debug, Default)]
struct ReadTally {
    true_reads: usize,
    false_reads: usize,
    stale_reads: usize,
    seen_true: bool,
}

impl ReadTally {
    fn record(&mut self, value: bool) {
        if value {
            self.true_reads += 1;
            self.seen_true = true;
        } else {
            self.false_reads += 1;
            if self.seen_true {
                self.stale_reads += 1;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Closed,
    Open,
    Aborted,
}

/// Holds spawned workers until every worker of a run exists.
///
/// Aborting instead of opening lets parked workers exit without doing work.
struct StartGate {
    state: Mutex<GateState>,
    changed: Condvar,
}

impl StartGate {
    fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Closed),
            changed: Condvar::new(),
        }
    }

    /// Block while closed; true when the gate opened, false when aborted.
    fn wait(&self) -> bool {
        let mut state = self.state.lock();
        while *state == GateState::Closed {
            self.changed.wait(&mut state);
        }
        *state == GateState::Open
    }

    fn open(&self) {
        self.release(GateState::Open);
    }

    fn abort(&self) {
        self.release(GateState::Aborted);
    }

    fn release(&self, to: GateState) {
        *self.state.lock() = to;
        self.changed.notify_all();
    }
}

/// Spawn `count` named workers parked on `gate`.
///
/// If the OS refuses a thread, the gate is aborted, the workers already
/// started are joined, and the refusal comes back as
/// [`FlagError::SpawnFailed`].
fn spawn_workers<T, W>(
    gate: &Arc<StartGate>,
    role: &str,
    count: usize,
    make: impl FnMut() -> W,
) -> Result<Vec<JoinHandle<Option<T>>>>
where
    W: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    spawn_workers_with(
        gate,
        role,
        count,
        |index| thread::Builder::new().name(format!("{}-{}", role, index)),
        make,
    )
}

fn spawn_workers_with<T, W>(
    gate: &Arc<StartGate>,
    role: &str,
    count: usize,
    builder: impl Fn(usize) -> thread::Builder,
    mut make: impl FnMut() -> W,
) -> Result<Vec<JoinHandle<Option<T>>>>
where
    W: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let mut handles = Vec::with_capacity(count);

    for index in 0..count {
        let worker_gate = Arc::clone(gate);
        let work = make();
        let spawned = builder(index).spawn(move || worker_gate.wait().then(work));

        match spawned {
            Ok(handle) => handles.push(handle),
            Err(source) => {
                warn!("could not spawn {} {}: {}", role, index, source);
                gate.abort();
                let _ = join_all(handles, role);
                return Err(FlagError::SpawnFailed {
                    role: role.to_string(),
                    index,
                    source,
                });
            }
        }
    }

    Ok(handles)
}

/// Join every handle, keeping results of workers that ran.
fn join_all<T>(handles: Vec<JoinHandle<Option<T>>>, role: &str) -> Result<Vec<T>> {
    let mut results = Vec::with_capacity(handles.len());

    for (index, handle) in handles.into_iter().enumerate() {
        let outcome = handle.join().map_err(|payload| {
            let message = panic_message(&*payload);
            FlagError::WorkerPanicked(format!("{} {}: {}", role, index, message))
        })?;
        results.extend(outcome);
    }

    Ok(results)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
