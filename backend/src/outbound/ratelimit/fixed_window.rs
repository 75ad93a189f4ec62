//! Fixed-window request counter implementing the `RateLimiter` port.
//!
//! Counters live in a mutex-guarded map keyed by rule name plus client key,
//! so different operations spend independent budgets for the same client.
//! Windows anchor at the first request: the first hit at or after
//! `window start + window` resets the slot. Counters are process-local and
//! reset on restart.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{RateLimitRule, RateLimiter};

struct WindowSlot {
    started_at: DateTime<Utc>,
    count: u32,
}

/// Concurrency-safe fixed-window limiter.
///
/// The clock is injected so tests can drive window expiry deterministically.
pub struct FixedWindowLimiter {
    clock: Arc<dyn Clock>,
    slots: Mutex<HashMap<String, WindowSlot>>,
}

impl FixedWindowLimiter {
    /// Create a limiter over the given clock.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, WindowSlot>> {
        // A poisoned counter map only means another request panicked mid
        // increment; the counters themselves are still valid.
        match self.slots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn try_acquire(&self, rule: &RateLimitRule, key: &str) -> bool {
        let now = self.clock.utc();
        let window = TimeDelta::from_std(rule.window()).unwrap_or(TimeDelta::MAX);
        let slot_key = format!("{}:{key}", rule.name());

        let mut slots = self.slots();
        let slot = slots.entry(slot_key).or_insert(WindowSlot {
            started_at: now,
            count: 0,
        });

        if now.signed_duration_since(slot.started_at) >= window {
            slot.started_at = now;
            slot.count = 0;
        }

        if slot.count >= rule.max_requests() {
            return false;
        }
        slot.count += 1;
        true
    }
}
