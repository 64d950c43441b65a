//! Blocking detection contract.

/// Stall detector for one control axis (distance or angle).
///
/// The detector integrates the control error; once it stays above
/// `error_threshold` for `duration` consecutive control periods it latches
/// [`is_blocked`](Self::is_blocked) until [`reset`](Self::reset).
pub trait BlockingDetector: Send + Sync {
    /// Latched "axis has stalled" flag.
    fn is_blocked(&self) -> bool;

    /// Clear the latch and the integration state.
    fn reset(&self);

    /// Change the trigger sensitivity.
    fn set_thresholds(&self, error_threshold: u32, duration: u32);
}
