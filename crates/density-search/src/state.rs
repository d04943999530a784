//! Search state machine — the worker-count transition table.
//!
//! Pure: no I/O, no clocks. The controller feeds it one per-worker
//! throughput reading per iteration and acts on the returned
//! [`Transition`].

/// Which direction the search is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Throughput has met the target so far; grow by `increment`.
    RampUp { increment: u32 },
    /// Throughput dropped below target once; shrink by one until it
    /// meets the target again.
    Decrement,
}

/// What the controller should do after an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Run the next iteration with this many workers.
    Next(u32),
    /// The current worker count sustains the target.
    Converged(u32),
    /// Even a single worker misses the target.
    Exhausted,
}

/// How ramp-up increments are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncrementPolicy {
    /// Used verbatim when set.
    pub fixed: Option<u32>,
    /// Used when the throughput ratio floors to 1.
    pub guess: u32,
}

impl Default for IncrementPolicy {
    fn default() -> Self {
        Self {
            fixed: None,
            guess: density_core::config::DEFAULT_GUESS_INCREMENT,
        }
    }
}

impl IncrementPolicy {
    /// Increment to apply while ramping up at `per_worker` throughput.
    pub fn ramp_increment(&self, per_worker: f64, target: f64) -> u32 {
        if let Some(fixed) = self.fixed {
            return fixed;
        }
        let ratio = ((per_worker / target) as u32).max(1);
        if ratio == 1 { self.guess } else { ratio }
    }
}

#[derive(Debug, Clone)]
pub struct SearchState {
    target: f64,
    worker_count: u32,
    phase: Phase,
    policy: IncrementPolicy,
}

impl SearchState {
    pub fn new(target: f64, policy: IncrementPolicy) -> Self {
        Self {
            target,
            worker_count: 1,
            phase: Phase::RampUp { increment: 1 },
            policy,
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn worker_count(&self) -> u32 {
        self.worker_count
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The signed step applied by the most recent transition.
    pub fn last_increment(&self) -> i64 {
        match self.phase {
            Phase::RampUp { increment } => i64::from(increment),
            Phase::Decrement => -1,
        }
    }

    /// Feed the per-worker throughput measured at the current worker count.
    pub fn observe(&mut self, per_worker: f64) -> Transition {
        let meets_target = per_worker >= self.target;

        match self.phase {
            Phase::RampUp { .. } => {
                self.phase = if meets_target {
                    Phase::RampUp {
                        increment: self.policy.ramp_increment(per_worker, self.target),
                    }
                } else {
                    Phase::Decrement
                };
            }
            Phase::Decrement => {
                if meets_target {
                    return Transition::Converged(self.worker_count);
                }
                if self.worker_count <= 1 {
                    self.worker_count = 1;
                    return Transition::Exhausted;
                }
            }
        }

        let next = i64::from(self.worker_count) + self.last_increment();
        if next <= 0 {
            self.worker_count = 1;
            return Transition::Exhausted;
        }
        self.worker_count = u32::try_from(next).unwrap_or(u32::MAX);
        Transition::Next(self.worker_count)
    }

    /// Undo the last step after the current count failed to produce logs.
    ///
    /// Returns the restored worker count, never below 1.
    pub fn back_off(&mut self) -> u32 {
        let previous = i64::from(self.worker_count) - self.last_increment();
        self.worker_count = u32::try_from(previous.max(1)).unwrap_or(u32::MAX);
        self.worker_count
    }
}
