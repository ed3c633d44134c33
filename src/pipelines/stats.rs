use std::time::{Duration, Instant};

/// Statistics for a classification run.
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Total execution time, tokenization included.
    pub total_time: Duration,
    /// Number of tokens fed to the model after truncation.
    pub input_tokens: usize,
}

impl PipelineStats {
    /// Create a new stats tracker (call at start of operation).
    pub(crate) fn start() -> PipelineStatsBuilder {
        PipelineStatsBuilder {
            start_time: Instant::now(),
        }
    }
}

/// Tracks timing from creation to `finish`.
pub(crate) struct PipelineStatsBuilder {
    start_time: Instant,
}

impl PipelineStatsBuilder {
    pub fn finish(self, input_tokens: usize) -> PipelineStats {
        PipelineStats {
            total_time: self.start_time.elapsed(),
            input_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PipelineStats;
    use std::time::Duration;

    #[test]
    fn records_elapsed_time_and_tokens() {
        let builder = PipelineStats::start();
        std::thread::sleep(Duration::from_millis(5));
        let stats = builder.finish(7);

        assert_eq!(stats.input_tokens, 7);
        assert!(stats.total_time >= Duration::from_millis(5));
    }
}
