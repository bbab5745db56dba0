//! Back-pressure gate with hysteresis
//!
//! Consumers poll the gate before each fetch; while it is engaged they
//! sleep briefly instead of consuming. The gate engages when the observed
//! queue size reaches the high watermark and releases only once it falls
//! to the low watermark, so sizes oscillating between the two never
//! toggle it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Hysteresis gate over a queue's fill level
///
/// # Example
///
/// ```
/// use shunt_flow::BackPressure;
///
/// // Capacity 10, engage at 8, release at 5
/// let gate = BackPressure::new(10, 0.8, 0.5, true);
///
/// assert!(!gate.observe(7));
/// assert!(gate.observe(8));   // engaged
/// assert!(gate.observe(6));   // between the watermarks: stays engaged
/// assert!(!gate.observe(5));  // released
/// ```
#[derive(Debug)]
pub struct BackPressure {
    enabled: bool,
    /// Engage when size reaches this
    high: usize,
    /// Release when size falls to this
    low: usize,
    engaged: AtomicBool,
    engagements: AtomicU64,
}

impl BackPressure {
    /// Build a gate for a queue of `capacity` items
    ///
    /// `high_watermark` and `low_watermark` are fill fractions in (0, 1]
    /// with low <= high; configuration validation enforces the range.
    /// Both thresholds round up: engage at `ceil(capacity * high)`,
    /// release at `ceil(capacity * low)`. A disabled gate never throttles.
    pub fn new(capacity: usize, high_watermark: f64, low_watermark: f64, enabled: bool) -> Self {
        let high = ((capacity as f64) * high_watermark).ceil() as usize;
        let high = high.max(1);
        let low = ((capacity as f64) * low_watermark).ceil() as usize;
        Self {
            enabled,
            high,
            low: low.min(high),
            engaged: AtomicBool::new(false),
            engagements: AtomicU64::new(0),
        }
    }

    /// Feed the gate an observed queue size; returns whether to throttle
    pub fn observe(&self, size: usize) -> bool {
        if !self.enabled {
            return false;
        }
        let engaged = self.engaged.load(Ordering::Relaxed);
        if !engaged && size >= self.high {
            if self
                .engaged
                .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                self.engagements.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(size, high = self.high, "back-pressure engaged");
            }
            return true;
        }
        if engaged && size <= self.low {
            self.engaged.store(false, Ordering::Relaxed);
            tracing::debug!(size, low = self.low, "back-pressure released");
            return false;
        }
        engaged
    }

    /// Whether the gate is currently engaged
    #[inline]
    pub fn is_engaged(&self) -> bool {
        self.enabled && self.engaged.load(Ordering::Relaxed)
    }

    /// How many times the gate has transitioned to engaged
    #[inline]
    pub fn engage_count(&self) -> u64 {
        self.engagements.load(Ordering::Relaxed)
    }
}
