//! Counters: tallies entities visited during a build and reports elapsed
//! wall-clock time.

use std::time::Instant;

/// Running totals for a single build pass, plus its timing.
#[derive(Debug)]
pub struct Counters {
    pub clusters: usize,
    pub stacks: usize,
    pub modules: usize,
    start: Option<Instant>,
    elapsed_secs: f64,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            clusters: 0,
            stacks: 0,
            modules: 0,
            start: None,
            elapsed_secs: 0.0,
        }
    }
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all counts and start the clock.
    pub fn reset(&mut self) {
        self.clusters = 0;
        self.stacks = 0;
        self.modules = 0;
        self.elapsed_secs = 0.0;
        self.start = Some(Instant::now());
    }

    /// Stop the clock, recording elapsed time since the last [`reset`].
    ///
    /// [`reset`]: Counters::reset
    pub fn stop(&mut self) {
        if let Some(start) = self.start.take() {
            self.elapsed_secs = start.elapsed().as_secs_f64();
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    pub fn stats_message(&self) -> String {
        format!(
            "built {} cluster(s), {} stack(s), {} module(s) in {:.2}s",
            self.clusters, self.stacks, self.modules, self.elapsed_secs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_message_reports_current_counts() {
        let mut counters = Counters::new();
        counters.reset();
        counters.clusters = 1;
        counters.stacks = 3;
        counters.modules = 9;
        counters.stop();
        let message = counters.stats_message();
        assert!(message.contains("1 cluster(s)"));
        assert!(message.contains("3 stack(s)"));
        assert!(message.contains("9 module(s)"));
    }
}
