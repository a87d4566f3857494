// SPDX-License-Identifier: GPL-3.0-only

//! Single-deadline timers driven by the UI tick
//!
//! Both timers hold at most one pending deadline; triggering again replaces
//! it. Callers pass `now` so tests can drive time explicitly.

use std::time::{Duration, Instant};

/// Delivers the last value triggered once `delay` has passed without a newer one
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Schedule `value`, replacing any pending one
    pub fn trigger(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.delay, value));
    }

    /// Take the pending value if its deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// A state that reverts after a fixed duration
#[derive(Debug)]
pub struct RevertTimer {
    duration: Duration,
    until: Option<Instant>,
}

impl RevertTimer {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            until: None,
        }
    }

    /// Enter the transient state, restarting the countdown
    pub fn trigger(&mut self, now: Instant) {
        self.until = Some(now + self.duration);
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.until.map(|until| now < until).unwrap_or(false)
    }

    /// Returns true exactly once, when the state reverts
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.until {
            Some(until) if now >= until => {
                self.until = None;
                true
            }
            _ => false,
        }
    }
}
