// src/mpi_helpers/benchmark.rs
use std::time::{Duration, Instant};

use tracing::debug;

/// Represents a timing for a single collective call
#[derive(Clone, Debug)]
pub struct BenchmarkTiming {
    /// Operation name
    pub name: &'static str,
    /// Duration of the operation
    pub duration: Duration,
    /// Number of matrix elements moved
    pub items_processed: usize,
}

impl BenchmarkTiming {
    pub fn new(name: &'static str, duration: Duration, items_processed: usize) -> Self {
        Self {
            name,
            duration,
            items_processed,
        }
    }

    /// Get the duration in seconds as a float
    pub fn seconds(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

/// A timer for measuring operation durations
pub struct BenchmarkTimer {
    pub name: &'static str,
    pub start: Instant,
    pub items: usize,
}

impl BenchmarkTimer {
    /// Start a new timer with the number of elements to be moved
    pub fn start_with_items(name: &'static str, items: usize) -> Self {
        Self {
            name,
            start: Instant::now(),
            items,
        }
    }

    /// Stop the timer and return a BenchmarkTiming
    pub fn stop(self) -> BenchmarkTiming {
        let duration = self.start.elapsed();
        BenchmarkTiming::new(self.name, duration, self.items)
    }
}

/// Accumulates the time a rank spends inside collective calls
#[derive(Debug)]
pub struct CommClock {
    rank: i32,
    timings: Vec<BenchmarkTiming>,
}

impl CommClock {
    pub fn new(rank: i32) -> Self {
        Self {
            rank,
            timings: Vec::new(),
        }
    }

    /// Record a timing
    pub fn record(&mut self, timing: BenchmarkTiming) {
        debug!(
            rank = self.rank,
            operation = timing.name,
            elements = timing.items_processed,
            elapsed = %format_time(timing.seconds()),
            "collective finished"
        );
        self.timings.push(timing);
    }

    pub fn timings(&self) -> &[BenchmarkTiming] {
        &self.timings
    }

    /// Sum of all recorded collective durations
    pub fn total(&self) -> Duration {
        self.timings.iter().map(|t| t.duration).sum()
    }
}

/// Run `operation` and add its wall-clock duration to the clock
pub fn time_operation<F, T>(clock: &mut CommClock, name: &'static str, items: usize, operation: F) -> T
where
    F: FnOnce() -> T,
{
    let timer = BenchmarkTimer::start_with_items(name, items);
    let result = operation();
    clock.record(timer.stop());

    result
}

/// Convenience function to create a formatted time string from seconds
pub fn format_time(seconds: f64) -> String {
    if seconds < 0.001 {
        format!("{:.2} μs", seconds * 1_000_000.0)
    } else if seconds < 1.0 {
        format!("{:.2} ms", seconds * 1_000.0)
    } else if seconds < 60.0 {
        format!("{:.2} sec", seconds)
    } else {
        let minutes = (seconds / 60.0).floor();
        let secs = seconds - (minutes * 60.0);
        format!("{:.0}m {:.2}s", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_accumulates_every_operation() {
        let mut clock = CommClock::new(0);
        let value = time_operation(&mut clock, "scatter", 16, || {
            thread::sleep(Duration::from_millis(5));
            42
        });
        time_operation(&mut clock, "broadcast", 16, || {
            thread::sleep(Duration::from_millis(5));
        });

        assert_eq!(value, 42);
        assert_eq!(clock.timings().len(), 2);
        assert_eq!(clock.timings()[0].name, "scatter");
        assert_eq!(clock.timings()[1].items_processed, 16);
        assert!(clock.total() >= Duration::from_millis(10));

        let summed: Duration = clock.timings().iter().map(|t| t.duration).sum();
        assert_eq!(clock.total(), summed);
    }

    #[test]
    fn test_empty_clock_is_zero() {
        assert_eq!(CommClock::new(3).total(), Duration::ZERO);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0005), "500.00 μs");
        assert_eq!(format_time(0.25), "250.00 ms");
        assert_eq!(format_time(2.5), "2.50 sec");
        assert_eq!(format_time(90.0), "1m 30.00s");
    }
}
