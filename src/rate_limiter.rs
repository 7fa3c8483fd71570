use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::time::Duration;

/// Minimum-spacing gate over generation dispatches.
pub struct RateLimiter {
    last_dispatch: Mutex<Option<DateTime<Utc>>>,
    cooldown: Duration,
}

impl RateLimiter {
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            last_dispatch: Mutex::new(None),
            cooldown: Duration::from_millis(cooldown_ms),
        }
    }

    /// Accepts and records this dispatch, or reports the remaining cooldown
    /// in milliseconds. Check and update happen under one lock, so two
    /// overlapping events inside the window cannot both be accepted.
    pub fn check_and_update(&self) -> Result<(), u64> {
        let mut last = self.last_dispatch.lock().unwrap();
        let now = Utc::now();

        if let Some(last_time) = *last {
            let elapsed = (now - last_time).num_milliseconds();
            let cooldown_ms = self.cooldown.as_millis() as i64;

            if elapsed < cooldown_ms {
                return Err((cooldown_ms - elapsed) as u64);
            }
        }

        *last = Some(now);
        Ok(())
    }

    pub fn last_dispatch(&self) -> Option<DateTime<Utc>> {
        *self.last_dispatch.lock().unwrap()
    }
}
