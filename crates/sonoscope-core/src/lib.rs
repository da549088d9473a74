//! # Sonoscope Core
//!
//! Shared foundation for the sonoscope analysis workstation:
//! - **Audio sources**: the `AudioSource` abstraction over in-memory and
//!   streamed WAV audio, read by position without loading whole files
//! - **Frame/time math**: exact sample-position to seconds conversion
//! - **Lock-free primitives**: cache-line aligned atomics and a bounded
//!   spin lock for the real-time audio thread
//! - **Gain ramp**: per-sample gain smoothing for click-free playback

pub mod error;
pub mod lockfree;
pub mod ramp;
pub mod rt_lock;
pub mod source;
pub mod time;

pub use error::{Error, Result};
pub use lockfree::{AtomicFlag, AtomicFloat};
pub use ramp::GainRamp;
pub use rt_lock::{RtLock, RtLockGuard};
pub use source::{AudioSource, MemorySource, WavSource};
pub use time::{frame_to_seconds, seconds_to_frame};
