//! Redraw scheduling
//!
//! Two kinds of trigger feed one FIFO queue: event triggers requested by
//! whoever mutated the session state, and deadline triggers (the clock
//! tick and the clear-indicator timeout) that become due as time passes.
//! The main loop sleeps until `poll_timeout`, moves due deadlines into the
//! queue with `collect_due`, and then drains the queue one trigger at a
//! time. Triggers are never merged or dropped.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::constants::{CLEAR_INDICATOR_DELAY, TICK_FIRST_DELAY, TICK_INTERVAL};

/// Why a redraw is happening
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Session state changed
    Event,
    /// Periodic clock tick
    Tick,
    /// Keystroke feedback timed out; hide it before redrawing
    ClearIndicator,
}

/// The once-a-minute clock tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTick {
    next: Instant,
    interval: Duration,
}

impl PeriodicTick {
    fn armed_at(now: Instant) -> Self {
        Self {
            next: now + TICK_FIRST_DELAY,
            interval: TICK_INTERVAL,
        }
    }

    /// Restart the schedule from `now`
    fn reset(&mut self, now: Instant) {
        *self = Self::armed_at(now);
    }

    #[cfg(test)]
    pub fn next_fire(&self) -> Instant {
        self.next
    }

    #[cfg(test)]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Consume one fire if due. Fires missed while the loop was stalled
    /// collapse into this one; the next fire stays on the interval grid.
    fn fire(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        while self.next <= now {
            self.next += self.interval;
        }
        true
    }
}

/// Event and time trigger coordinator
#[derive(Debug, Default)]
pub struct RedrawScheduler {
    /// Created on the first `start_periodic`, reset on later ones
    tick: Option<PeriodicTick>,
    clear_deadline: Option<Instant>,
    pending: VecDeque<Trigger>,
}

impl RedrawScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the clock tick: first fire 1s from `now`, then every 60s.
    /// An existing tick is rescheduled rather than duplicated.
    pub fn start_periodic(&mut self, now: Instant) {
        match &mut self.tick {
            Some(tick) => {
                tick.reset(now);
                debug!("Clock tick re-armed");
            }
            None => {
                self.tick = Some(PeriodicTick::armed_at(now));
                debug!("Clock tick started");
            }
        }
    }

    /// Cancel the clock tick; `start_periodic` may arm it again later
    pub fn stop_periodic(&mut self) {
        if self.tick.take().is_some() {
            debug!("Clock tick stopped");
        }
    }

    #[cfg(test)]
    pub fn is_periodic_active(&self) -> bool {
        self.tick.is_some()
    }

    #[cfg(test)]
    pub fn periodic(&self) -> Option<&PeriodicTick> {
        self.tick.as_ref()
    }

    /// Queue a trigger to run as soon as the loop gets to it
    pub fn request(&mut self, trigger: Trigger) {
        trace!("Redraw requested: {:?}", trigger);
        self.pending.push_back(trigger);
    }

    /// (Re)arm the one-shot clear-indicator deadline
    pub fn arm_clear(&mut self, now: Instant) {
        self.clear_deadline = Some(now + CLEAR_INDICATOR_DELAY);
    }

    pub fn cancel_clear(&mut self) {
        self.clear_deadline = None;
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        let tick = self.tick.map(|t| t.next);
        match (tick, self.clear_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// How long the loop may sleep. `None` means no deadline is armed and
    /// nothing is queued.
    pub fn poll_timeout(&self, now: Instant) -> Option<Duration> {
        if !self.pending.is_empty() {
            return Some(Duration::ZERO);
        }
        self.next_deadline()
            .map(|d| d.saturating_duration_since(now))
    }

    /// Move every deadline due at `now` into the queue, earliest first
    pub fn collect_due(&mut self, now: Instant) {
        let mut due: Vec<(Instant, Trigger)> = Vec::with_capacity(2);
        if let Some(at) = self.clear_deadline.filter(|d| *d <= now) {
            self.clear_deadline = None;
            due.push((at, Trigger::ClearIndicator));
        }
        if let Some(tick) = &mut self.tick {
            let at = tick.next;
            if tick.fire(now) {
                due.push((at, Trigger::Tick));
            }
        }
        due.sort_by_key(|(at, _)| *at);
        self.pending.extend(due.into_iter().map(|(_, t)| t));
    }

    /// Next trigger in FIFO order
    pub fn next_trigger(&mut self) -> Option<Trigger> {
        self.pending.pop_front()
    }

    #[cfg(test)]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn drain(s: &mut RedrawScheduler) -> Vec<Trigger> {
        std::iter::from_fn(|| s.next_trigger()).collect()
    }

    #[test]
    fn test_start_periodic_twice_keeps_one_tick() {
        let t0 = Instant::now();
        let mut s = RedrawScheduler::new();
        s.start_periodic(t0);
        s.start_periodic(t0 + secs(30));
        assert!(s.is_periodic_active());

        // Rescheduled from the second call, not the first
        assert_eq!(s.periodic().unwrap().next_fire(), t0 + secs(31));

        s.collect_due(t0 + secs(31));
        assert_eq!(drain(&mut s), vec![Trigger::Tick]);
    }

    #[test]
    fn test_tick_schedule() {
        let t0 = Instant::now();
        let mut s = RedrawScheduler::new();
        s.start_periodic(t0);
        assert_eq!(s.poll_timeout(t0), Some(secs(1)));

        s.collect_due(t0 + Duration::from_millis(999));
        assert_eq!(s.pending_len(), 0);

        s.collect_due(t0 + secs(1));
        assert_eq!(drain(&mut s), vec![Trigger::Tick]);
        assert_eq!(s.periodic().unwrap().next_fire(), t0 + secs(61));
        assert_eq!(s.periodic().unwrap().interval(), secs(60));

        s.collect_due(t0 + secs(61));
        assert_eq!(drain(&mut s), vec![Trigger::Tick]);
    }

    #[test]
    fn test_stalled_loop_fires_once() {
        let t0 = Instant::now();
        let mut s = RedrawScheduler::new();
        s.start_periodic(t0);
        s.collect_due(t0 + secs(200));
        assert_eq!(drain(&mut s), vec![Trigger::Tick]);
        assert_eq!(s.periodic().unwrap().next_fire(), t0 + secs(241));
    }

    #[test]
    fn test_stop_and_restart() {
        let t0 = Instant::now();
        let mut s = RedrawScheduler::new();
        s.start_periodic(t0);
        s.stop_periodic();
        assert!(!s.is_periodic_active());
        assert_eq!(s.poll_timeout(t0), None);
        s.collect_due(t0 + secs(5));
        assert_eq!(s.pending_len(), 0);

        s.start_periodic(t0 + secs(5));
        s.collect_due(t0 + secs(6));
        assert_eq!(drain(&mut s), vec![Trigger::Tick]);
    }

    #[test]
    fn test_events_are_fifo_and_never_coalesced() {
        let t0 = Instant::now();
        let mut s = RedrawScheduler::new();
        s.start_periodic(t0);
        s.request(Trigger::Event);
        s.request(Trigger::Event);
        assert_eq!(s.poll_timeout(t0), Some(Duration::ZERO));

        s.collect_due(t0 + secs(1));
        s.request(Trigger::Event);
        assert_eq!(
            drain(&mut s),
            vec![Trigger::Event, Trigger::Event, Trigger::Tick, Trigger::Event]
        );
    }

    #[test]
    fn test_clear_deadline_rearms_and_orders_by_time() {
        let t0 = Instant::now();
        let mut s = RedrawScheduler::new();
        s.arm_clear(t0);
        s.arm_clear(t0 + Duration::from_millis(500));
        s.collect_due(t0 + secs(1));
        assert_eq!(s.pending_len(), 0);

        s.start_periodic(t0 + Duration::from_millis(600));
        // Clear due at 1.5s, tick at 1.6s
        s.collect_due(t0 + secs(2));
        assert_eq!(drain(&mut s), vec![Trigger::ClearIndicator, Trigger::Tick]);

        s.arm_clear(t0 + secs(3));
        s.cancel_clear();
        s.collect_due(t0 + Duration::from_millis(61_600));
        assert_eq!(drain(&mut s), vec![Trigger::Tick]);
    }
}
