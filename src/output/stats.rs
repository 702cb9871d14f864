//! Run statistics for the command-line front end

use crate::output::RunSummary;
use std::time::Duration;

/// Aggregated figures for one finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatistics {
    pub sources: usize,
    pub failed_sources: Vec<String>,
    pub pages: u32,
    pub reviews: usize,
    pub elapsed: Duration,
}

impl RunStatistics {
    pub fn from_summary(summary: &RunSummary, elapsed: Duration) -> Self {
        Self {
            sources: summary.sources.len(),
            failed_sources: summary
                .failed_sources()
                .map(|s| s.source_id.clone())
                .collect(),
            pages: summary.total_pages(),
            reviews: summary.total_reviews(),
            elapsed,
        }
    }

    /// Percentage of sources that finished without error
    pub fn success_rate(&self) -> f64 {
        if self.sources == 0 {
            return 100.0;
        }
        let succeeded = self.sources - self.failed_sources.len();
        (succeeded as f64 / self.sources as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RunStatistics, summary: &RunSummary) {
    println!("=== Collection Statistics ===\n");

    println!("Overview:");
    println!("  Sources visited: {}", stats.sources);
    println!("  Pages decoded: {}", stats.pages);
    println!("  Reviews found: {}", stats.reviews);
    println!("  Elapsed: {:.1}s", stats.elapsed.as_secs_f64());
    println!();

    println!("Per Source:");
    for source in &summary.sources {
        match &source.error {
            Some(error) => println!(
                "  {}: failed at page {} ({})",
                source.source_id, source.last_page, error
            ),
            None => println!(
                "  {}: {} reviews over {} pages",
                source.source_id, source.reviews, source.pages_fetched
            ),
        }
    }
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} sources completed without error)",
        stats.success_rate(),
        stats.sources - stats.failed_sources.len(),
        stats.sources
    );
}
