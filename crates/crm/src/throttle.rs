//! Outbound call throttle.
//!
//! Protects the CRM's own rate limits: a fixed count per one-second window.
//! At capacity the caller suspends until the window deadline and re-checks
//! once, it is never rejected. The single bounded sleep guarantees
//! termination even if the clock misbehaves.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

pub struct Throttle {
    limit: u32,
    window: Duration,
    state: Mutex<WindowState>,
}

struct WindowState {
    window_start: Instant,
    count: u32,
}

impl Throttle {
    pub fn new(limit_per_sec: u32) -> Self {
        Self {
            limit: limit_per_sec.max(1),
            window: Duration::from_secs(1),
            state: Mutex::new(WindowState {
                window_start: Instant::now(),
                count: 0,
            }),
        }
    }

    /// Take one slot, suspending until the current window resets when full.
    pub async fn acquire(&self) {
        let deadline = {
            let mut state = self.state.lock().await;
            let now = Instant::now();
            if now >= state.window_start + self.window {
                state.window_start = now;
                state.count = 1;
                return;
            }
            if state.count < self.limit {
                state.count += 1;
                return;
            }
            state.window_start + self.window
        };

        tokio::time::sleep_until(deadline).await;

        let mut state = self.state.lock().await;
        let now = Instant::now();
        if now >= state.window_start + self.window {
            state.window_start = now;
            state.count = 1;
        } else {
            // Another task already rolled the window over; join it.
            state.count += 1;
        }
    }
}
