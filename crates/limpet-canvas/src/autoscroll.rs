//! Repeating auto-scroll timer driven by explicit ticks.

use crate::viewport::Viewport;
use limpet_geom::{IntPoint, IntVector, int_vector};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct AutoScroll {
    interval: Duration,
    next: Option<Instant>,
}

impl AutoScroll {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.next.is_some()
    }

    /// Arms the timer; a running timer keeps its schedule.
    pub fn start(&mut self, now: Instant) {
        if self.next.is_none() {
            tracing::debug!(interval = ?self.interval, "auto-scroll started");
            self.next = Some(now + self.interval);
        }
    }

    pub fn stop(&mut self) {
        if self.next.take().is_some() {
            tracing::debug!("auto-scroll stopped");
        }
    }

    /// Returns `true` when the timer fires at `now`, and schedules the next firing.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next {
            Some(due) if now >= due => {
                self.next = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    /// Viewport nudge for a pointer at `pointer`: its overshoot past the viewport edges, each
    /// axis clamped to `max_step` of the viewport extent on that axis.
    pub fn nudge(viewport: &Viewport, pointer: IntPoint, max_step: f64) -> IntVector {
        let over = viewport.overshoot(pointer);
        let clamp = |v: i32, extent: i32| {
            let limit = ((extent as f64 * max_step).ceil() as i32).max(1);
            v.clamp(-limit, limit)
        };
        int_vector(
            clamp(over.x, viewport.size.width),
            clamp(over.y, viewport.size.height),
        )
    }
}
