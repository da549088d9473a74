//! Real-time transport reader.

use sonoscope_core::{AtomicFlag, AtomicFloat, AudioSource, GainRamp, RtLock};
use std::sync::atomic::{AtomicU64, Ordering};

/// Loop boundaries in sample frames, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopRange {
    pub start: u64,
    pub end: u64,
}

impl LoopRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct ReaderState {
    source: Box<dyn AudioSource>,
    position: u64,
    start_position: u64,
    loop_range: Option<LoopRange>,
    looping: bool,
    stop_at_loop_end: bool,
    gain: GainRamp,
    scratch: Vec<Vec<f32>>,
}

impl ReaderState {
    fn active_end(&self, len: u64) -> u64 {
        match (self.looping, self.loop_range) {
            (true, Some(range)) => range.end.min(len),
            _ => len,
        }
    }

    fn wrap_target(&self) -> u64 {
        match (self.looping, self.loop_range) {
            (true, Some(range)) => range.start,
            _ => self.start_position,
        }
    }
}

/// Feeds the audio callback from an audio source with looping and
/// smoothed gain.
///
/// The audio-thread entry point [`next_audio_block`](Self::next_audio_block)
/// never blocks: state is behind an [`RtLock`] and a contended callback
/// outputs silence. Control entry points acquire the same lock with a
/// bounded spin before yielding; the target gain alone is set atomically
/// and picked up by the ramp inside the callback.
pub struct TransportReader {
    inner: RtLock<ReaderState>,
    playing: AtomicFlag,
    target_gain: AtomicFloat,
    position: AtomicU64,
}

impl TransportReader {
    pub fn new(source: Box<dyn AudioSource>) -> Self {
        let channels = source.channels();
        Self {
            inner: RtLock::new(ReaderState {
                source,
                position: 0,
                start_position: 0,
                loop_range: None,
                looping: false,
                stop_at_loop_end: false,
                gain: GainRamp::new(1.0, 512),
                scratch: vec![vec![0.0; 512]; channels],
            }),
            playing: AtomicFlag::new(false),
            target_gain: AtomicFloat::new(1.0),
            position: AtomicU64::new(0),
        }
    }

    /// Size the gain ramp and staging buffers to one callback block.
    /// Call before playback starts and whenever the block size changes.
    pub fn prepare(&self, samples_per_block: usize) {
        let mut state = self.inner.lock();
        state.gain.prepare(samples_per_block.max(1) as u32);
        for channel in state.scratch.iter_mut() {
            channel.resize(samples_per_block.max(1), 0.0);
        }
    }

    /// Audio-thread entry point: fill `out[channel][0..frames]`.
    ///
    /// Outputs silence when stopped or when the state lock is contended.
    /// The read position wraps at the active end boundary (loop end while
    /// looping, source end otherwise); with `stop_at_loop_end` set the
    /// reader instead finishes the samples before the boundary and flips
    /// playback off.
    pub fn next_audio_block(&self, out: &mut [Vec<f32>], frames: usize) {
        for channel in out.iter_mut() {
            channel[..frames].fill(0.0);
        }
        if !self.playing.get() {
            return;
        }
        let Some(mut state) = self.inner.try_lock() else {
            return;
        };

        state.gain.set_target(self.target_gain.get());
        let len = state.source.len_samples();
        let mut written = 0usize;

        while written < frames {
            let end = state.active_end(len);
            if state.position >= end {
                if state.stop_at_loop_end {
                    self.playing.set(false);
                    break;
                }
                let target = state.wrap_target();
                if target >= end {
                    // Degenerate range, nothing to play.
                    break;
                }
                state.position = target;
                continue;
            }

            let ReaderState {
                source,
                position,
                gain,
                scratch,
                ..
            } = &mut *state;

            let capacity = scratch.first().map_or(0, |c| c.len());
            if capacity == 0 {
                break;
            }
            let span = ((end - *position).min((frames - written) as u64) as usize).min(capacity);

            if source.read(scratch, *position, span).is_ok() {
                for i in 0..span {
                    let g = gain.next_sample();
                    for (ch, out_channel) in out.iter_mut().enumerate() {
                        let sample = scratch.get(ch).map_or(0.0, |c| c[i]);
                        out_channel[written + i] = sample * g;
                    }
                }
            }
            // A failed read leaves silence for this span but keeps time
            // moving so playback does not stall.
            *position += span as u64;
            written += span;
        }

        self.position.store(state.position, Ordering::Release);
    }

    pub fn set_playing(&self, playing: bool) {
        if playing {
            let mut state = self.inner.lock();
            if state.position >= state.source.len_samples() {
                state.position = state.start_position;
            }
        }
        self.playing.set(playing);
    }

    pub fn is_playing(&self) -> bool {
        self.playing.get()
    }

    /// Target gain, applied through the ramp on the audio thread.
    pub fn set_gain(&self, gain: f32) {
        self.target_gain.set(gain.max(0.0));
    }

    pub fn gain(&self) -> f32 {
        self.target_gain.get()
    }

    pub fn set_start_position(&self, frame: u64) {
        self.inner.lock().start_position = frame;
    }

    /// Set or clear the loop boundaries. Empty ranges are ignored.
    pub fn set_loop_range(&self, range: Option<LoopRange>) {
        if let Some(range) = range {
            if !range.is_valid() {
                tracing::warn!(?range, "ignoring empty loop range");
                return;
            }
        }
        self.inner.lock().loop_range = range;
    }

    pub fn set_looping(&self, looping: bool) {
        self.inner.lock().looping = looping;
    }

    pub fn set_stop_at_loop_end(&self, stop: bool) {
        self.inner.lock().stop_at_loop_end = stop;
    }

    pub fn seek(&self, frame: u64) {
        let mut state = self.inner.lock();
        let clamped = frame.min(state.source.len_samples());
        state.position = clamped;
        self.position.store(clamped, Ordering::Release);
    }

    /// Current read position, readable without taking the state lock.
    pub fn position(&self) -> u64 {
        self.position.load(Ordering::Acquire)
    }
}
