//! Virtual millisecond clock with timeout/interval timers.
//!
//! The host advances the clock once per frame; timers come due in order and
//! are popped one at a time so that a handler scheduling a new timer inside
//! the same frame window still sees it fire in that frame.

use std::collections::BTreeMap;

use crate::api::types::TimerId;

/// Browsers clamp intervals; a zero interval would otherwise never let `pop_due` finish.
const MIN_INTERVAL_MS: f64 = 1.0;

#[derive(Debug, Clone)]
struct Timer<A> {
    due_ms: f64,
    interval_ms: Option<f64>,
    action: A,
}

/// Pending timers keyed by handle. `A` is the action delivered when a timer fires.
#[derive(Debug)]
pub struct TimerQueue<A> {
    now_ms: f64,
    next_id: u32,
    timers: BTreeMap<TimerId, Timer<A>>,
}

impl<A: Clone> TimerQueue<A> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            next_id: 0,
            timers: BTreeMap::new(),
        }
    }

    /// Current clock time in milliseconds.
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Fire `action` once, `delay_ms` from now.
    pub fn set_timeout(&mut self, delay_ms: f64, action: A) -> TimerId {
        self.insert(self.now_ms + delay_ms.max(0.0), None, action)
    }

    /// Fire `action` every `interval_ms`, first at now + `interval_ms`.
    pub fn set_interval(&mut self, interval_ms: f64, action: A) -> TimerId {
        let interval_ms = interval_ms.max(MIN_INTERVAL_MS);
        self.insert(self.now_ms + interval_ms, Some(interval_ms), action)
    }

    fn insert(&mut self, due_ms: f64, interval_ms: Option<f64>, action: A) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.insert(id, Timer { due_ms, interval_ms, action });
        id
    }

    /// Cancel a timer. Returns false if it already fired or was cleared.
    pub fn clear(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    /// Cancel every pending timer.
    pub fn clear_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Pop the earliest timer due at or before `until_ms`, moving the clock to its due time.
    /// Intervals are rescheduled; timeouts are removed.
    pub fn pop_due(&mut self, until_ms: f64) -> Option<(TimerId, A)> {
        let id = self
            .timers
            .iter()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by(|a, b| a.1.due_ms.total_cmp(&b.1.due_ms).then(a.0.cmp(b.0)))
            .map(|(&id, _)| id)?;

        let timer = self.timers.get_mut(&id)?;
        self.now_ms = self.now_ms.max(timer.due_ms);
        let action = timer.action.clone();
        match timer.interval_ms {
            Some(interval) => timer.due_ms += interval,
            None => {
                self.timers.remove(&id);
            }
        }
        Some((id, action))
    }

    /// Move the clock forward to `until_ms` (never backwards).
    pub fn advance_to(&mut self, until_ms: f64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

impl<A: Clone> Default for TimerQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fire_until(q: &mut TimerQueue<&'static str>, until: f64) -> Vec<&'static str> {
        let mut fired = Vec::new();
        while let Some((_, action)) = q.pop_due(until) {
            fired.push(action);
        }
        q.advance_to(until);
        fired
    }

    #[test]
    fn timeout_fires_once() {
        let mut q = TimerQueue::new();
        q.set_timeout(300.0, "swap");
        assert!(fire_until(&mut q, 299.0).is_empty());
        assert_eq!(fire_until(&mut q, 300.0), vec!["swap"]);
        assert!(q.is_empty());
    }

    #[test]
    fn interval_repeats_and_catches_up() {
        let mut q = TimerQueue::new();
        q.set_interval(100.0, "tick");
        assert_eq!(fire_until(&mut q, 350.0), vec!["tick", "tick", "tick"]);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn fires_in_due_order() {
        let mut q = TimerQueue::new();
        q.set_timeout(50.0, "late");
        q.set_timeout(10.0, "early");
        assert_eq!(fire_until(&mut q, 100.0), vec!["early", "late"]);
    }

    #[test]
    fn clock_moves_to_due_time_while_popping() {
        let mut q = TimerQueue::new();
        q.set_timeout(300.0, "first");
        let (_, action) = q.pop_due(1000.0).unwrap();
        assert_eq!(action, "first");
        assert_eq!(q.now_ms(), 300.0);

        // Scheduled from inside a handler: due relative to the handler's time.
        q.set_timeout(40.0, "nested");
        assert_eq!(fire_until(&mut q, 1000.0), vec!["nested"]);
        assert_eq!(q.now_ms(), 1000.0);
    }

    #[test]
    fn cleared_timer_never_fires() {
        let mut q = TimerQueue::new();
        let id = q.set_interval(10.0, "tick");
        assert!(q.clear(id));
        assert!(!q.clear(id));
        assert!(fire_until(&mut q, 100.0).is_empty());
    }
}
