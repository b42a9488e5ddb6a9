use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Radians advanced per tick of the simulated trace.
pub const PHASE_STEP: f64 = 0.5;
/// Upper bound (exclusive) of the uniform noise added to each live sample.
pub const JITTER_SPAN: f64 = 0.2;

/// Something that can produce an amplitude for a given tick phase.
pub trait WaveformSource: Send {
    /// Noise-free value at `phase`; used to seed the window.
    fn base(&self, phase: u64) -> f64;
    /// Live value at `phase`, base waveform plus any noise.
    fn sample(&mut self, phase: u64) -> f64;
}

/// Simulated Lead II trace: a phase-indexed sinusoid with bounded jitter.
pub struct SimulatedLeadII {
    rng: StdRng,
}

impl SimulatedLeadII {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible noise sequence, handy for tests and demos.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SimulatedLeadII {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveformSource for SimulatedLeadII {
    fn base(&self, phase: u64) -> f64 {
        (phase as f64 * PHASE_STEP).sin()
    }

    fn sample(&mut self, phase: u64) -> f64 {
        self.base(phase) + self.rng.gen_range(0.0..JITTER_SPAN)
    }
}

/// In-memory source useful for tests and deterministic playback.
/// Seeds with zeros, then replays the queued amplitudes; once drained it keeps
/// returning the last value.
pub struct ManualSource {
    queue: VecDeque<f64>,
    last: f64,
}

impl ManualSource {
    pub fn new(amplitudes: impl IntoIterator<Item = f64>) -> Self {
        Self {
            queue: amplitudes.into_iter().collect(),
            last: 0.0,
        }
    }
}

impl WaveformSource for ManualSource {
    fn base(&self, _phase: u64) -> f64 {
        0.0
    }

    fn sample(&mut self, _phase: u64) -> f64 {
        if let Some(next) = self.queue.pop_front() {
            self.last = next;
        }
        self.last
    }
}
