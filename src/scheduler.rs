use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::debug;

use crate::error::FatalError;
use crate::machine::Machine;
use crate::program::Step;

/// Pacing for a `Scheduler`.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Instruction cycles per batch; observers are notified after each batch.
    pub steps_per_batch: usize,
    /// Pause between batches in `run` (zero to run flat out).
    pub delay: Duration,
    /// Stop `run` after this many executed cycles in total.
    pub step_limit: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            steps_per_batch: 1 << 10, // 1024
            delay: Duration::ZERO,
            step_limit: None,
        }
    }
}

/// Shared cancellation flag. Clones refer to the same flag, so a token can
/// be handed to another thread or to an observer.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Handle returned by `subscribe`, needed to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Why a batch or a run stopped before using its whole budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stop {
    Halted,
    Failed(FatalError),
    /// Waiting for input.
    Blocked,
    Cancelled,
    StepLimit,
}

/// What one batch did.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// Cycles that executed an instruction (blocked attempts excluded).
    pub steps: usize,
    /// Output produced during the batch.
    pub output: String,
    /// `None` when the batch simply used up `steps_per_batch`.
    pub stop: Option<Stop>,
}

type Observer = Box<dyn FnMut(&BatchReport)>;

/// Drives a `Machine` in batches, notifying observers after each one.
///
/// Observers only ever see a `BatchReport`, never the scheduler, so they
/// cannot re-enter `run_batch`.
pub struct Scheduler<M: Machine> {
    machine: M,
    config: SchedulerConfig,
    cancel: CancelToken,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
    total_steps: u64,
}

impl<M: Machine> Scheduler<M> {
    /// A `steps_per_batch` of zero is treated as one, so every batch makes
    /// progress.
    pub fn new(machine: M, mut config: SchedulerConfig) -> Self {
        config.steps_per_batch = config.steps_per_batch.max(1);
        Self {
            machine,
            config,
            cancel: CancelToken::new(),
            observers: Vec::new(),
            next_observer: 0,
            total_steps: 0,
        }
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&BatchReport) + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns whether `id` was registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(other, _)| *other != id);
        self.observers.len() != before
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn machine(&self) -> &M {
        &self.machine
    }

    /// Mutable access between batches, e.g. to feed input after `Blocked`.
    pub fn machine_mut(&mut self) -> &mut M {
        &mut self.machine
    }

    pub fn into_machine(self) -> M {
        self.machine
    }

    /// Advance up to `steps_per_batch` cycles, stopping early on a terminal
    /// step, a block, cancellation or the step limit.
    pub fn run_batch(&mut self) -> BatchReport {
        let mut steps = 0;
        let mut stop = None;

        while steps < self.config.steps_per_batch {
            if self.cancel.is_cancelled() {
                stop = Some(Stop::Cancelled);
                break;
            }
            if self.config.step_limit.is_some_and(|limit| self.total_steps >= limit) {
                stop = Some(Stop::StepLimit);
                break;
            }
            let was_running = !self.machine.has_terminated();
            let step = self.machine.advance();
            if was_running && !matches!(step, Step::Blocked(_)) {
                steps += 1;
                self.total_steps += 1;
            }
            match step {
                Step::Progressed => {}
                Step::Blocked(_) => stop = Some(Stop::Blocked),
                Step::Halted => stop = Some(Stop::Halted),
                Step::Failed(e) => stop = Some(Stop::Failed(e)),
            }
            if stop.is_some() {
                break;
            }
        }

        let output = self.machine.read_output().unwrap_or_default();
        let report = BatchReport { steps, output, stop };
        debug!(steps, total = self.total_steps, stop = ?report.stop, "batch finished");
        for (_, observer) in &mut self.observers {
            observer(&report);
        }
        report
    }

    /// Run batches until the machine stops for any reason, sleeping
    /// `delay` between batches.
    pub fn run(&mut self) -> Stop {
        loop {
            if let Some(stop) = self.run_batch().stop {
                return stop;
            }
            if !self.config.delay.is_zero() {
                std::thread::sleep(self.config.delay);
            }
        }
    }
}
