//! Cancellable debounce timers driven by explicit `poll(now)` calls.
//!
//! The core never sleeps or spawns: the embedding event loop calls `poll`
//! with the current instant and acts on whatever fired.

use std::time::{Duration, Instant};

/// A single pending deadline that every new input pushes back.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// (Re)arm the timer to fire `delay` after `now`, superseding any pending deadline.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fire at most once: true when the deadline has passed, which disarms the timer.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Text handed to the external renderer, tagged with its generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub generation: u64,
    pub text: String,
}

/// Debounced render trigger with last-writer-wins result acceptance.
///
/// Each fired request bumps the generation; a result is only accepted when it
/// belongs to the newest request issued.
#[derive(Debug, Clone)]
pub struct RenderScheduler {
    timer: Debouncer,
    generation: u64,
}

impl RenderScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            timer: Debouncer::new(delay),
            generation: 0,
        }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.timer.schedule(now);
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Issue a request for `text` if the debounce window has elapsed.
    pub fn poll(&mut self, now: Instant, text: &str) -> Option<RenderRequest> {
        if !self.timer.poll(now) {
            return None;
        }
        self.generation += 1;
        Some(RenderRequest {
            generation: self.generation,
            text: text.to_string(),
        })
    }

    /// True when a render started for `generation` is still the latest one.
    pub fn accept(&self, generation: u64) -> bool {
        generation != 0 && generation == self.generation
    }
}

#[cfg(test)]
#[path = "../../tests/rust/test_composer_scheduler.rs"]
mod tests;
