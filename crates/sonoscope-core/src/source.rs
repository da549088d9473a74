//! Audio-source abstraction.
//!
//! Analysis and playback consume audio through [`AudioSource`]: a seekable,
//! positioned reader over deinterleaved f32 frames. Implementations stream
//! from disk where possible; an analysis pass over a long file never holds
//! the whole file in memory.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A positioned reader over multi-channel audio.
///
/// Each analysis pass opens its own source handle onto the underlying
/// audio; handles are never shared between the analysis worker and the
/// live playback reader.
pub trait AudioSource: Send {
    /// Sample rate in Hz.
    fn sample_rate(&self) -> f64;

    /// Number of channels.
    fn channels(&self) -> usize;

    /// Total length in sample frames.
    fn len_samples(&self) -> u64;

    /// Fill `dest[channel][0..frames]` starting at `position`.
    ///
    /// Frames past the end of the source are zero-filled. Returns the
    /// number of frames actually read from the source.
    fn read(&mut self, dest: &mut [Vec<f32>], position: u64, frames: usize) -> Result<usize>;
}

/// Deinterleaved in-memory audio.
#[derive(Debug, Clone)]
pub struct MemorySource {
    channels: Vec<Vec<f32>>,
    sample_rate: f64,
}

impl MemorySource {
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: f64) -> Result<Self> {
        if sample_rate <= 0.0 {
            return Err(Error::InvalidSource(format!(
                "sample rate must be positive, got {sample_rate}"
            )));
        }
        if channels.is_empty() {
            return Err(Error::InvalidSource("no channels".into()));
        }
        let len = channels[0].len();
        if channels.iter().any(|c| c.len() != len) {
            return Err(Error::InvalidSource(
                "channels have differing lengths".into(),
            ));
        }

        Ok(Self {
            channels,
            sample_rate,
        })
    }

    pub fn from_mono(samples: Vec<f32>, sample_rate: f64) -> Result<Self> {
        Self::new(vec![samples], sample_rate)
    }
}

impl AudioSource for MemorySource {
    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn channels(&self) -> usize {
        self.channels.len()
    }

    fn len_samples(&self) -> u64 {
        self.channels[0].len() as u64
    }

    fn read(&mut self, dest: &mut [Vec<f32>], position: u64, frames: usize) -> Result<usize> {
        let len = self.len_samples();
        let start = position.min(len) as usize;
        let available = (len as usize - start).min(frames);

        for (ch, out) in dest.iter_mut().enumerate() {
            match self.channels.get(ch) {
                Some(data) => {
                    out[..available].copy_from_slice(&data[start..start + available]);
                    out[available..frames].fill(0.0);
                }
                None => out[..frames].fill(0.0),
            }
        }

        Ok(available)
    }
}

/// Streaming WAV file source.
///
/// Reads frames on demand through a buffered reader, seeking only when the
/// requested position differs from the cursor. Supports integer (8/16/24/32
/// bit) and 32-bit float PCM.
pub struct WavSource {
    reader: hound::WavReader<BufReader<File>>,
    spec: hound::WavSpec,
    len_frames: u64,
    cursor: u64,
}

impl WavSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let reader = hound::WavReader::open(path.as_ref())?;
        let spec = reader.spec();

        match (spec.sample_format, spec.bits_per_sample) {
            (hound::SampleFormat::Float, 32) => {}
            (hound::SampleFormat::Int, 8 | 16 | 24 | 32) => {}
            (format, bits) => {
                return Err(Error::UnsupportedFormat(format!(
                    "{format:?} with {bits} bits per sample"
                )));
            }
        }
        if spec.channels == 0 || spec.sample_rate == 0 {
            return Err(Error::UnsupportedFormat(
                "WAV header reports zero channels or sample rate".into(),
            ));
        }

        let len_frames = reader.duration() as u64;
        tracing::debug!(
            path = %path.as_ref().display(),
            channels = spec.channels,
            sample_rate = spec.sample_rate,
            len_frames,
            "opened WAV source"
        );

        Ok(Self {
            reader,
            spec,
            len_frames,
            cursor: 0,
        })
    }

    /// Read up to `frames` interleaved frames at the cursor, deinterleaving
    /// into `dest`. Stops at the last complete frame.
    fn read_at_cursor(&mut self, dest: &mut [Vec<f32>], frames: usize) -> Result<usize> {
        let channels = self.spec.channels as usize;
        let mut done = 0;

        match self.spec.sample_format {
            hound::SampleFormat::Float => {
                let mut samples = self.reader.samples::<f32>();
                'frames: for frame in 0..frames {
                    for ch in 0..channels {
                        let sample = match samples.next() {
                            Some(s) => s?,
                            None => break 'frames,
                        };
                        if let Some(out) = dest.get_mut(ch) {
                            out[frame] = sample;
                        }
                    }
                    done = frame + 1;
                }
            }
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1i64 << (self.spec.bits_per_sample - 1)) as f32;
                let mut samples = self.reader.samples::<i32>();
                'frames: for frame in 0..frames {
                    for ch in 0..channels {
                        let sample = match samples.next() {
                            Some(s) => s?,
                            None => break 'frames,
                        };
                        if let Some(out) = dest.get_mut(ch) {
                            out[frame] = sample as f32 * scale;
                        }
                    }
                    done = frame + 1;
                }
            }
        }

        self.cursor += done as u64;
        Ok(done)
    }
}

impl AudioSource for WavSource {
    fn sample_rate(&self) -> f64 {
        self.spec.sample_rate as f64
    }

    fn channels(&self) -> usize {
        self.spec.channels as usize
    }

    fn len_samples(&self) -> u64 {
        self.len_frames
    }

    fn read(&mut self, dest: &mut [Vec<f32>], position: u64, frames: usize) -> Result<usize> {
        if position != self.cursor {
            let target = position.min(self.len_frames);
            self.reader.seek(target as u32)?;
            self.cursor = target;
        }

        let read = if position >= self.len_frames {
            0
        } else {
            let available = (self.len_frames - position).min(frames as u64) as usize;
            self.read_at_cursor(dest, available)?
        };

        for out in dest.iter_mut() {
            out[read..frames].fill(0.0);
        }

        Ok(read)
    }
}
