use tokio::time::{Duration, Instant};

/// One-shot timer measured on the tokio clock.
///
/// Used as the idle timer of the operating loop: restarted whenever the request
/// queue drains, and checked after the idle wait returns.
pub struct Timer {
    timer_active: bool,
    timeout_duration: Duration,
    start_time: Instant,
}

/// Creates a stopped timer with the given timeout.
pub fn new(timeout_duration: Duration) -> Timer {
    Timer {
        timer_active: false,
        timeout_duration,
        start_time: Instant::now(),
    }
}

impl Timer {
    /// (Re)starts the timer from now.
    pub fn timer_start(&mut self) {
        self.timer_active = true;
        self.start_time = Instant::now();
    }

    #[allow(missing_docs)]
    pub fn timer_stop(&mut self) {
        self.timer_active = false;
    }

    /// True once an active timer has run for its full duration.
    pub fn timer_timeouted(&self) -> bool {
        self.timer_active && self.start_time.elapsed() >= self.timeout_duration
    }

    /// Time left before [Timer::timer_timeouted] turns true. Full duration if stopped.
    pub fn remaining(&self) -> Duration {
        if !self.timer_active {
            return self.timeout_duration;
        }
        self.timeout_duration.saturating_sub(self.start_time.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn times_out_after_full_duration() {
        let mut t = new(Duration::from_secs(10));
        assert!(!t.timer_timeouted());
        t.timer_start();
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(!t.timer_timeouted());
        assert_eq!(t.remaining(), Duration::from_secs(6));
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(t.timer_timeouted());
        t.timer_stop();
        assert!(!t.timer_timeouted());
    }
}
