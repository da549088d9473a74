//! Block-wise streaming of one audio source through one extractor.

use sonoscope_core::{frame_to_seconds, AudioSource, Result};
use sonoscope_extract::{ExtractorAdapter, Feature, OutputDescriptor};

/// Pulls step-sized reads from an audio source and feeds block-sized
/// windows to an adapted extractor.
///
/// The processor owns the per-analysis source handle; the cursor is kept
/// in sample frames and each block's timestamp is computed from it
/// directly, so timestamps stay exact over arbitrarily long files.
pub struct BlockProcessor {
    source: Box<dyn AudioSource>,
    adapter: ExtractorAdapter,
    position: u64,
    len: u64,
    sample_rate: f64,
    scratch: Vec<Vec<f32>>,
    drained: bool,
}

impl BlockProcessor {
    pub fn new(adapter: ExtractorAdapter, source: Box<dyn AudioSource>) -> Self {
        let scratch = vec![vec![0.0; adapter.block_size()]; adapter.channels()];
        let len = source.len_samples();
        let sample_rate = source.sample_rate();

        Self {
            source,
            adapter,
            position: 0,
            len,
            sample_rate,
            scratch,
            drained: false,
        }
    }

    pub fn output(&self) -> &OutputDescriptor {
        self.adapter.output()
    }

    /// Process the next block into `acc`.
    ///
    /// Returns `Ok(true)` while more blocks remain. Once the cursor passes
    /// the end of the source, drains the extractor's trailing features
    /// (exactly once) and returns `Ok(false)`.
    pub fn next_block(&mut self, acc: &mut Vec<Feature>) -> Result<bool> {
        if self.position > self.len {
            if !self.drained {
                let timestamp = frame_to_seconds(self.position, self.sample_rate);
                acc.extend(self.adapter.remaining_features(timestamp));
                self.drained = true;
            }
            return Ok(false);
        }

        let step = self.adapter.step_size() as u64;
        let remaining = self.len - self.position;
        let want = step.min(remaining) as usize;

        for channel in self.scratch.iter_mut() {
            channel.fill(0.0);
        }
        if want > 0 {
            self.source.read(&mut self.scratch, self.position, want)?;
        }

        let timestamp = frame_to_seconds(self.position, self.sample_rate);
        let block: Vec<&[f32]> = self.scratch.iter().map(|c| c.as_slice()).collect();
        acc.extend(self.adapter.process_block(&block, timestamp));

        self.position += step;
        Ok(true)
    }

    /// Fractional progress in `[0, 1]`, non-decreasing over the run.
    pub fn advancement(&self) -> f32 {
        if self.len == 0 {
            return 1.0;
        }
        (self.position as f64 / self.len as f64).min(1.0) as f32
    }
}
