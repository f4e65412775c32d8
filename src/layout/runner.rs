//! Background driver for the force simulation.
//!
//! A runner owns at most one live simulation. Every `start` or `cancel` bumps
//! a generation counter; a worker publishes a frame only while holding the
//! frame lock and only if its generation is still current, so a caller never
//! observes positions from a simulation that was replaced or canceled.

use crate::layout::force::{ForceSimulation, NodePosition, SimulationState};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Positions published by a running simulation
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub generation: u64,
    pub iteration: usize,
    pub state: SimulationState,
    pub positions: Vec<NodePosition>,
}

impl Frame {
    pub fn is_settled(&self) -> bool {
        self.state == SimulationState::Settled
    }
}

#[derive(Debug, Default)]
struct Shared {
    generation: AtomicU64,
    frame: Mutex<Option<Frame>>,
}

impl Shared {
    fn lock_frame(&self) -> MutexGuard<'_, Option<Frame>> {
        // A panicked worker leaves at worst a stale frame, which the generation check rejects
        self.frame.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Store a frame if its generation is still current
    fn publish(&self, frame: Frame) -> bool {
        let mut slot = self.lock_frame();
        if !self.is_current(frame.generation) {
            return false;
        }
        *slot = Some(frame);
        true
    }
}

/// Cancelable, restartable background force layout
#[derive(Debug)]
pub struct ForceLayoutRunner {
    shared: Arc<Shared>,
    tick: Duration,
    worker: Option<JoinHandle<()>>,
}

impl Default for ForceLayoutRunner {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl ForceLayoutRunner {
    /// Create a runner that sleeps `tick` between steps
    pub fn new(tick: Duration) -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            tick,
            worker: None,
        }
    }

    /// Current generation
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.shared.is_current(generation)
    }

    /// Whether the current worker is still stepping
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Start a simulation, superseding any previous one.
    ///
    /// Returns the generation of the new run.
    pub fn start(&mut self, mut sim: ForceSimulation) -> u64 {
        let generation = {
            let mut slot = self.shared.lock_frame();
            let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *slot = None;
            generation
        };
        self.detach();

        let shared = Arc::clone(&self.shared);
        let tick = self.tick;
        tracing::debug!(generation, "starting force layout");

        self.worker = Some(thread::spawn(move || loop {
            if !shared.is_current(generation) {
                tracing::trace!(generation, "force layout superseded");
                return;
            }
            let state = sim.step();
            let frame = Frame {
                generation,
                iteration: sim.iteration(),
                state,
                positions: sim.snapshot(),
            };
            if !shared.publish(frame) || state == SimulationState::Settled {
                return;
            }
            if !tick.is_zero() {
                thread::sleep(tick);
            }
        }));

        generation
    }

    /// Stop the live simulation and drop its last frame
    pub fn cancel(&mut self) {
        {
            let mut slot = self.shared.lock_frame();
            self.shared.generation.fetch_add(1, Ordering::SeqCst);
            *slot = None;
        }
        tracing::debug!(generation = self.generation(), "force layout canceled");
        self.detach();
    }

    /// Latest frame of the current generation
    pub fn latest(&self) -> Option<Frame> {
        self.shared.lock_frame().clone()
    }

    /// Block until the worker finishes and return the final frame of the
    /// current generation, if any.
    pub fn wait(&mut self) -> Option<Frame> {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("force layout worker panicked");
            }
        }
        self.latest()
    }

    /// Superseded workers stop on their own at the next step
    fn detach(&mut self) {
        self.worker.take();
    }
}

impl Drop for ForceLayoutRunner {
    fn drop(&mut self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
