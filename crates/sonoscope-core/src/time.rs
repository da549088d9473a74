//! Frame/time conversion.
//!
//! Positions are kept in sample frames and converted to seconds with a
//! single division per call. Accumulating per-block float additions drifts
//! over long files; converting from the integer frame position does not.

/// Convert a frame position to seconds.
#[inline]
pub fn frame_to_seconds(frame: u64, sample_rate: f64) -> f64 {
    debug_assert!(sample_rate > 0.0);
    frame as f64 / sample_rate
}

/// Convert a time in seconds to the nearest frame position.
#[inline]
pub fn seconds_to_frame(seconds: f64, sample_rate: f64) -> u64 {
    debug_assert!(sample_rate > 0.0);
    (seconds * sample_rate).round().max(0.0) as u64
}
