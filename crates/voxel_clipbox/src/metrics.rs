//! Engine-agnostic metrics collection for clipbox streaming.
//!
//! [`TickStats`] is produced by every tick. [`StreamingMetrics`] accumulates
//! them over time and is feature-gated and runtime-toggled to ensure zero
//! overhead when disabled.
//!
//! # Usage
//!
//! ```ignore
//! use voxel_clipbox::metrics::COLLECT_METRICS;
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! let output = streaming.process(&viewers, &mut store, true, true)?;
//! println!("tick took {}us", output.stats.elapsed_us);
//! println!("avg {}us", streaming.metrics().avg_tick_us());
//! ```

use std::collections::VecDeque;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;
use std::sync::atomic::AtomicBool;

/// Runtime toggle for metrics collection.
/// Set to false to disable metrics gathering at runtime.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
    #[cfg(feature = "metrics")]
    {
        COLLECT_METRICS.load(Ordering::Relaxed)
    }
    #[cfg(not(feature = "metrics"))]
    {
        false
    }
}

/// Rolling window for storing recent values (e.g., timing history).
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    buffer: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    /// Create a new rolling window with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new value, evicting the oldest if at capacity.
    pub fn push(&mut self, value: T) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Iterate over values (oldest to newest).
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }

    /// Get the most recent value.
    pub fn last(&self) -> Option<&T> {
        self.buffer.back()
    }
}

impl RollingWindow<u64> {
    /// Compute the average of all values.
    pub fn average(&self) -> f64 {
        if self.buffer.is_empty() {
            0.0
        } else {
            self.buffer.iter().sum::<u64>() as f64 / self.buffer.len() as f64
        }
    }

    /// Get min and max values.
    pub fn min_max(&self) -> Option<(u64, u64)> {
        let min = *self.buffer.iter().min()?;
        let max = *self.buffer.iter().max()?;
        Some((min, max))
    }
}

impl Default for RollingWindow<u64> {
    fn default() -> Self {
        Self::new(128) // Default to 128 samples (~2 seconds at 60fps)
    }
}

/// Counters for a single streaming tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Viewers paired at the end of the tick.
    pub paired_viewers: usize,
    /// Data chunks newly requested from the host.
    pub data_blocks_requested: usize,
    /// Resident data chunks whose last viewer left.
    pub data_blocks_unloaded: usize,
    /// In-flight loads nobody wants anymore.
    pub data_loads_cancelled: usize,
    /// Mesh records created.
    pub mesh_blocks_added: usize,
    /// Mesh records erased.
    pub mesh_blocks_removed: usize,
    /// Mesh updates handed to the mesher.
    pub mesh_updates_sent: usize,
    /// Data completions drained from the mailbox.
    pub data_completions: usize,
    /// Mesh completions drained from the mailbox.
    pub mesh_completions: usize,
    /// Activation and deactivation events emitted.
    pub visibility_changes: usize,
    /// Wall time of the tick in microseconds.
    pub elapsed_us: u64,
}

/// Streaming statistics accumulated across ticks.
#[derive(Debug, Clone, Default)]
pub struct StreamingMetrics {
    /// Rolling window of tick times in microseconds.
    pub tick_timings: RollingWindow<u64>,
    /// Stats of the most recent tick.
    pub last_tick: TickStats,
    /// Total ticks recorded this session.
    pub total_ticks: u64,
    /// Total data chunks requested this session.
    pub total_data_blocks_requested: u64,
    /// Total mesh updates sent this session.
    pub total_mesh_updates_sent: u64,
    /// Total visibility events this session.
    pub total_visibility_changes: u64,
}

impl StreamingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished tick.
    pub fn record_tick(&mut self, stats: &TickStats) {
        if !is_enabled() {
            return;
        }
        self.tick_timings.push(stats.elapsed_us);
        self.last_tick = *stats;
        self.total_ticks += 1;
        self.total_data_blocks_requested += stats.data_blocks_requested as u64;
        self.total_mesh_updates_sent += stats.mesh_updates_sent as u64;
        self.total_visibility_changes += stats.visibility_changes as u64;
    }

    /// Reset all metrics, including session totals.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Average tick time in microseconds over the rolling window.
    pub fn avg_tick_us(&self) -> f64 {
        self.tick_timings.average()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_window() {
        let mut window = RollingWindow::new(3);
        assert!(window.is_empty());

        window.push(10u64);
        window.push(20);
        window.push(30);
        assert_eq!(window.len(), 3);
        assert_eq!(window.average(), 20.0);

        // Push one more, oldest should be evicted
        window.push(40);
        assert_eq!(window.len(), 3);
        assert_eq!(window.average(), 30.0);
        assert_eq!(window.min_max(), Some((20, 40)));
        assert_eq!(window.last(), Some(&40));
    }

    #[test]
    fn test_empty_window() {
        let window = RollingWindow::<u64>::default();
        assert_eq!(window.average(), 0.0);
        assert_eq!(window.min_max(), None);
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_record_tick_accumulates() {
        let mut metrics = StreamingMetrics::new();
        let stats = TickStats {
            data_blocks_requested: 10,
            mesh_updates_sent: 3,
            visibility_changes: 2,
            elapsed_us: 100,
            ..Default::default()
        };

        metrics.record_tick(&stats);
        metrics.record_tick(&TickStats { elapsed_us: 300, ..stats });

        assert_eq!(metrics.total_ticks, 2);
        assert_eq!(metrics.total_data_blocks_requested, 20);
        assert_eq!(metrics.avg_tick_us(), 200.0);
        assert_eq!(metrics.last_tick.elapsed_us, 300);

        metrics.reset();
        assert_eq!(metrics.total_ticks, 0);
    }

    #[cfg(not(feature = "metrics"))]
    #[test]
    fn test_record_tick_disabled_without_feature() {
        let mut metrics = StreamingMetrics::new();
        metrics.record_tick(&TickStats { elapsed_us: 5, ..Default::default() });
        assert_eq!(metrics.total_ticks, 0);
        assert!(metrics.tick_timings.is_empty());
    }
}
