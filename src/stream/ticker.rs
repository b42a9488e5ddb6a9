use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::stream::{SignalWindow, SimulatedLeadII, StreamError, WaveformSource};
use crate::types::SamplePoint;

/// Rolling Lead II trace advanced one sample per tick.
pub struct SignalStreamBuffer {
    window: SignalWindow,
    source: Box<dyn WaveformSource>,
    tick_interval: Duration,
    next_phase: u64,
    running: bool,
}

impl SignalStreamBuffer {
    /// Window of `capacity` samples seeded from the noise-free base waveform.
    pub fn initialize(capacity: usize, tick_interval: Duration) -> Result<Self, StreamError> {
        Self::with_source(capacity, tick_interval, Box::new(SimulatedLeadII::new()))
    }

    pub fn with_source(
        capacity: usize,
        tick_interval: Duration,
        source: Box<dyn WaveformSource>,
    ) -> Result<Self, StreamError> {
        // timestamps are whole milliseconds
        if tick_interval < Duration::from_millis(1) {
            return Err(StreamError::ZeroInterval);
        }
        let mut window = SignalWindow::new(capacity)?;
        let step_ms = tick_interval.as_millis() as u64;
        for phase in 0..capacity as u64 {
            window.push(SamplePoint {
                timestamp: phase * step_ms,
                amplitude: source.base(phase),
            });
        }
        Ok(Self {
            window,
            source,
            tick_interval,
            next_phase: capacity as u64,
            running: true,
        })
    }

    /// Appends one fresh sample and drops the oldest. No-op once stopped.
    pub fn tick(&mut self) -> Option<SamplePoint> {
        if !self.running {
            return None;
        }
        let phase = self.next_phase;
        self.next_phase += 1;
        let sample = SamplePoint {
            timestamp: phase * self.tick_interval.as_millis() as u64,
            amplitude: self.source.sample(phase),
        };
        self.window.push(sample);
        Some(sample)
    }

    pub fn stop(&mut self) {
        if self.running {
            log::info!("signal stream stopped after {} ticks", self.ticks_elapsed());
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn ticks_elapsed(&self) -> u64 {
        self.next_phase - self.window.capacity() as u64
    }

    pub fn window(&self) -> &SignalWindow {
        &self.window
    }

    pub fn snapshot(&self) -> Vec<SamplePoint> {
        self.window.to_vec()
    }
}

/// Repeating timer task. Cancelled by `stop()` or when the handle is dropped.
pub struct TickerHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl TickerHandle {
    /// Calls `on_tick` every `period` until cancelled or until it returns `false`.
    /// The first call happens one full period after spawning.
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let mut timer = interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval() fires immediately on the first poll
            timer.tick().await;
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        log::debug!("stream ticker cancelled");
                        break;
                    }
                    _ = timer.tick() => {
                        if !on_tick() {
                            log::debug!("stream ticker receiver gone, exiting");
                            break;
                        }
                    }
                }
            }
        });
        Self { cancel, task }
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled() || self.task.is_finished()
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
