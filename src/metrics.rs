// Performance Metrics for the Reservation Rules engine
//
// Tracks execution times, denial counts and slow operations for eligibility
// checks, price quotes and reservation commits.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default threshold for slow operations (100ms)
pub const DEFAULT_SLOW_OPERATION_THRESHOLD_MS: u64 = 100;

/// Performance metrics for the rules engine
#[derive(Debug, Clone)]
pub struct PerformanceMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    slow_threshold_ms: u64,

    // Operation counts
    eligibility_checks: AtomicU64,
    denied_checks: AtomicU64,
    pricing_calculations: AtomicU64,
    reservations_committed: AtomicU64,

    // Timing metrics (in microseconds)
    total_eligibility_time_us: AtomicU64,
    total_pricing_time_us: AtomicU64,

    // Slow operation counts
    slow_eligibility_checks: AtomicU64,
    slow_pricing_calculations: AtomicU64,
}

impl PerformanceMetrics {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_SLOW_OPERATION_THRESHOLD_MS)
    }

    /// Metrics that flag operations slower than `slow_threshold_ms`
    pub fn with_threshold(slow_threshold_ms: u64) -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                slow_threshold_ms,
                eligibility_checks: AtomicU64::new(0),
                denied_checks: AtomicU64::new(0),
                pricing_calculations: AtomicU64::new(0),
                reservations_committed: AtomicU64::new(0),
                total_eligibility_time_us: AtomicU64::new(0),
                total_pricing_time_us: AtomicU64::new(0),
                slow_eligibility_checks: AtomicU64::new(0),
                slow_pricing_calculations: AtomicU64::new(0),
            }),
        }
    }

    /// Start timing an eligibility check
    pub fn start_eligibility_check(&self) -> OperationTimer {
        OperationTimer::new(OperationType::Eligibility, self.clone())
    }

    /// Start timing a price quote
    pub fn start_pricing_calculation(&self) -> OperationTimer {
        OperationTimer::new(OperationType::Pricing, self.clone())
    }

    pub fn record_denied(&self) {
        self.inner.denied_checks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reservation(&self) {
        self.inner.reservations_committed.fetch_add(1, Ordering::Relaxed);
    }

    fn is_slow(&self, duration: Duration) -> bool {
        duration.as_millis() as u64 > self.inner.slow_threshold_ms
    }

    fn record_eligibility_check(&self, duration: Duration) {
        self.inner.eligibility_checks.fetch_add(1, Ordering::Relaxed);
        self.inner
            .total_eligibility_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);

        if self.is_slow(duration) {
            self.inner.slow_eligibility_checks.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("Slow eligibility check: {}ms", duration.as_millis());
        }
    }

    fn record_pricing_calculation(&self, duration: Duration) {
        self.inner.pricing_calculations.fetch_add(1, Ordering::Relaxed);
        self.inner
            .total_pricing_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);

        if self.is_slow(duration) {
            self.inner.slow_pricing_calculations.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("Slow pricing calculation: {}ms", duration.as_millis());
        }
    }

    fn average_ms(total_us: &AtomicU64, count: &AtomicU64) -> f64 {
        let count = count.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            (total_us.load(Ordering::Relaxed) as f64 / count as f64) / 1000.0
        }
    }

    /// Share of eligibility checks that were denied (0.0 to 1.0)
    pub fn denial_rate(&self) -> f64 {
        let checks = self.inner.eligibility_checks.load(Ordering::Relaxed);
        let denied = self.inner.denied_checks.load(Ordering::Relaxed);
        if checks == 0 {
            0.0
        } else {
            denied as f64 / checks as f64
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        let inner = &self.inner;
        MetricsSummary {
            eligibility_checks: inner.eligibility_checks.load(Ordering::Relaxed),
            denied_checks: inner.denied_checks.load(Ordering::Relaxed),
            avg_eligibility_time_ms: Self::average_ms(
                &inner.total_eligibility_time_us,
                &inner.eligibility_checks,
            ),
            slow_eligibility_checks: inner.slow_eligibility_checks.load(Ordering::Relaxed),
            pricing_calculations: inner.pricing_calculations.load(Ordering::Relaxed),
            avg_pricing_time_ms: Self::average_ms(
                &inner.total_pricing_time_us,
                &inner.pricing_calculations,
            ),
            slow_pricing_calculations: inner.slow_pricing_calculations.load(Ordering::Relaxed),
            reservations_committed: inner.reservations_committed.load(Ordering::Relaxed),
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        let summary = self.summary();
        tracing::info!(
            "Reservation Rules Metrics:\n\
             Eligibility: {} checks ({} denied), avg {:.2}ms, {} slow\n\
             Pricing: {} calculations, avg {:.2}ms, {} slow\n\
             Reservations: {} committed",
            summary.eligibility_checks,
            summary.denied_checks,
            summary.avg_eligibility_time_ms,
            summary.slow_eligibility_checks,
            summary.pricing_calculations,
            summary.avg_pricing_time_ms,
            summary.slow_pricing_calculations,
            summary.reservations_committed,
        );
    }
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
enum OperationType {
    Eligibility,
    Pricing,
}

/// Records the elapsed time when completed or dropped, whichever comes first
pub struct OperationTimer {
    start: Instant,
    operation_type: OperationType,
    metrics: PerformanceMetrics,
    recorded: bool,
}

impl OperationTimer {
    fn new(operation_type: OperationType, metrics: PerformanceMetrics) -> Self {
        Self {
            start: Instant::now(),
            operation_type,
            metrics,
            recorded: false,
        }
    }

    /// Complete the timer and record the duration
    pub fn complete(mut self) {
        self.record();
    }

    fn record(&mut self) {
        if self.recorded {
            return;
        }
        self.recorded = true;
        let duration = self.start.elapsed();
        match self.operation_type {
            OperationType::Eligibility => self.metrics.record_eligibility_check(duration),
            OperationType::Pricing => self.metrics.record_pricing_calculation(duration),
        }
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        self.record();
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSummary {
    pub eligibility_checks: u64,
    pub denied_checks: u64,
    pub avg_eligibility_time_ms: f64,
    pub slow_eligibility_checks: u64,
    pub pricing_calculations: u64,
    pub avg_pricing_time_ms: f64,
    pub slow_pricing_calculations: u64,
    pub reservations_committed: u64,
}
