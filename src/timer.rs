use std::time::{Duration, Instant};

pub const DEFAULT_CYCLES_PER_SECOND: u32 = 60;

/// Fixed-rate pacing for the host loop. The interpreter's timers count cycles, so this rate
/// is also how fast they tick in wall-clock time.
#[derive(Debug)]
pub struct Cadence {
    interval: Duration,
    next_tick: Instant,
}

impl Cadence {
    pub fn new(cycles_per_second: u32) -> Self {
        Self {
            interval: Self::interval_for(cycles_per_second),
            next_tick: Instant::now(),
        }
    }

    pub fn interval_for(cycles_per_second: u32) -> Duration {
        Duration::from_secs(1) / cycles_per_second.max(1)
    }

    /// Sleeps until the next tick is due.
    pub fn wait(&mut self) {
        self.next_tick += self.interval;
        let now = Instant::now();
        match self.next_tick.checked_duration_since(now) {
            Some(remaining) => std::thread::sleep(remaining),
            // fell behind (window dragged, debugger); don't try to catch up
            None => self.next_tick = now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval() {
        assert_eq!(Cadence::interval_for(60), Duration::from_nanos(16_666_666));
        assert_eq!(Cadence::interval_for(500), Duration::from_millis(2));
        assert_eq!(Cadence::interval_for(0), Duration::from_secs(1));
    }

    #[test]
    fn wait_paces() {
        let mut cadence = Cadence::new(200);
        let start = Instant::now();
        cadence.wait();
        cadence.wait();
        assert!(start.elapsed() >= Duration::from_millis(9));
    }
}
