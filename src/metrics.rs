//! Performance metrics and statistics tracking for the scoring pipeline.

use crate::error::ErrorKind;
use crate::types::{LoanDecision, PredictionResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for pipeline performance
pub struct PipelineMetrics {
    /// Total applications processed (scored or failed)
    pub applications_processed: AtomicU64,
    /// Applications approved
    pub approvals: AtomicU64,
    /// Applications rejected
    pub rejections: AtomicU64,
    /// Failed requests by error kind
    errors_by_kind: RwLock<HashMap<&'static str, u64>>,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Approval probability distribution buckets
    probability_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl PipelineMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            applications_processed: AtomicU64::new(0),
            approvals: AtomicU64::new(0),
            rejections: AtomicU64::new(0),
            errors_by_kind: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            probability_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a scored application
    pub fn record_decision(&self, processing_time: Duration, result: &PredictionResult) {
        self.applications_processed.fetch_add(1, Ordering::Relaxed);
        match result.decision {
            LoanDecision::Approved => self.approvals.fetch_add(1, Ordering::Relaxed),
            LoanDecision::Rejected => self.rejections.fetch_add(1, Ordering::Relaxed),
        };

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only recent samples for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = (result.probability_approved * 10.0).min(9.0) as usize;
        if let Ok(mut buckets) = self.probability_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record a failed request
    pub fn record_error(&self, kind: ErrorKind) {
        self.applications_processed.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut by_kind) = self.errors_by_kind.write() {
            *by_kind.entry(kind.as_str()).or_insert(0) += 1;
        }
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = self.processing_times.read().unwrap();
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get current throughput (applications per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.applications_processed.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get the approval probability distribution
    pub fn get_probability_distribution(&self) -> [u64; 10] {
        *self.probability_buckets.read().unwrap()
    }

    /// Get failed requests by error kind
    pub fn get_errors_by_kind(&self) -> HashMap<&'static str, u64> {
        self.errors_by_kind.read().unwrap().clone()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let processed = self.applications_processed.load(Ordering::Relaxed);
        let approvals = self.approvals.load(Ordering::Relaxed);
        let rejections = self.rejections.load(Ordering::Relaxed);
        let scored = approvals + rejections;
        let approval_rate = if scored > 0 {
            (approvals as f64 / scored as f64) * 100.0
        } else {
            0.0
        };

        let processing = self.get_processing_stats();
        let throughput = self.get_throughput();
        let errors = self.get_errors_by_kind();
        let distribution = self.get_probability_distribution();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║        LOAN ELIGIBILITY PIPELINE - METRICS SUMMARY           ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Applications Processed: {:>8}  │  Throughput: {:>6.1} app/s ║",
            processed, throughput
        );
        info!(
            "║ Approved: {:>8}  Rejected: {:>8}  │  Approval: {:>5.1}%  ║",
            approvals, rejections, approval_rate
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Processing Time (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5} ║",
            processing.mean_us, processing.p50_us, processing.p95_us, processing.p99_us
        );
        if !errors.is_empty() {
            info!("╠══════════════════════════════════════════════════════════════╣");
            info!("║ Failed Requests:                                             ║");
            for (kind, count) in &errors {
                info!("║   {:18}: {:>6}                                  ║", kind, count);
            }
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Approval Probability Distribution:                           ║");
        let total: u64 = distribution.iter().sum();
        for (i, &count) in distribution.iter().enumerate() {
            let pct = if total > 0 {
                (count as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            let bar_len = (pct / 2.0) as usize;
            let bar: String = "█".repeat(bar_len.min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Real-time metrics reporter that prints periodic summaries
pub struct MetricsReporter {
    metrics: std::sync::Arc<PipelineMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<PipelineMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = PipelineMetrics::new();

        let approved = PredictionResult::from_probabilities([0.2, 0.8]);
        let rejected = PredictionResult::from_probabilities([0.9, 0.1]);
        metrics.record_decision(Duration::from_micros(100), &approved);
        metrics.record_decision(Duration::from_micros(200), &rejected);
        metrics.record_error(ErrorKind::UnknownCategory);

        assert_eq!(metrics.applications_processed.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.approvals.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.rejections.load(Ordering::Relaxed), 1);
        assert_eq!(
            metrics.get_errors_by_kind().get("unknown_category"),
            Some(&1)
        );
    }

    #[test]
    fn test_probability_distribution_buckets() {
        let metrics = PipelineMetrics::new();

        metrics.record_decision(
            Duration::from_micros(100),
            &PredictionResult::from_probabilities([0.2, 0.8]),
        );
        metrics.record_decision(
            Duration::from_micros(100),
            &PredictionResult::from_probabilities([0.15, 0.85]),
        );

        let distribution = metrics.get_probability_distribution();
        assert_eq!(distribution[8], 2);
    }
}
