//! End-to-end analysis pipeline tests
//!
//! Drives the full chain: audio source -> extractor adapter -> block
//! processor -> analysis driver -> result store.
//!
//! Run with:
//! ```bash
//! cargo test -p sonoscope --test analysis_pipeline
//! ```

use approx::assert_relative_eq;
use sonoscope::prelude::*;
use sonoscope::{AnalysisResult, Feature};
use std::sync::Arc;
use std::time::Duration;

/// Generate a test sine wave buffer.
fn generate_sine(frequency: f64, sample_rate: f64, duration_secs: f64) -> Vec<f32> {
    let num_samples = (sample_rate * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            (2.0 * std::f64::consts::PI * frequency * t).sin() as f32
        })
        .collect()
}

/// Generate silence with short bursts at the given sample positions.
fn generate_clicks(sample_rate: f64, duration_secs: f64, click_samples: &[usize]) -> Vec<f32> {
    let num_samples = (sample_rate * duration_secs) as usize;
    let mut samples = vec![0.0f32; num_samples];
    for &click in click_samples {
        let end = (click + 1024).min(num_samples);
        for sample in samples.iter_mut().take(end).skip(click) {
            *sample = 0.9;
        }
    }
    samples
}

fn catalogue() -> Arc<dyn ExtractorCatalogue> {
    Arc::new(ExtractorRegistry::with_builtins())
}

fn sine_source(duration_secs: f64) -> Box<dyn AudioSource> {
    let samples = generate_sine(440.0, 44100.0, duration_secs);
    Box::new(MemorySource::from_mono(samples, 44100.0).unwrap())
}

fn recv_ended(driver: &AnalysisDriver) -> sonoscope::AnalysisResults {
    match driver.events().recv_timeout(Duration::from_secs(10)).unwrap() {
        AnalysisEvent::Ended(results) => results,
        AnalysisEvent::Aborted => panic!("expected analysis to end"),
    }
}

/// Throttles reads so a run reliably stays in flight while the test
/// reconfigures it.
struct ThrottledSource {
    inner: MemorySource,
}

impl AudioSource for ThrottledSource {
    fn sample_rate(&self) -> f64 {
        self.inner.sample_rate()
    }
    fn channels(&self) -> usize {
        self.inner.channels()
    }
    fn len_samples(&self) -> u64 {
        self.inner.len_samples()
    }
    fn read(
        &mut self,
        dest: &mut [Vec<f32>],
        position: u64,
        frames: usize,
    ) -> sonoscope::core::Result<usize> {
        std::thread::sleep(Duration::from_millis(2));
        self.inner.read(dest, position, frames)
    }
}

#[test]
fn test_power_analysis_of_sine() {
    let mut driver = AnalysisDriver::new(catalogue());
    let setup = driver.run_analysis(
        &ExtractorKey::new("power", "power"),
        &ExtractorState::new(1024, 1024).unwrap(),
        sine_source(1.0),
    );
    assert!(setup.succeeded());
    assert_eq!(setup.output().unwrap().frame_type(), FrameType::Value);

    let results = recv_ended(&driver);

    // Full-scale sine has RMS ~ 1/sqrt(2); interior blocks should agree.
    let mid = &results.channels[0][10];
    assert_relative_eq!(
        mid.values[0],
        std::f32::consts::FRAC_1_SQRT_2,
        epsilon = 0.05
    );

    // Monotonic, exactly one result per hop plus the drain.
    let series = &results.channels[0];
    assert!(series.windows(2).all(|w| w[0].time <= w[1].time));
    assert_eq!(driver.advancement(), 1.0);
}

#[test]
fn test_onset_analysis_finds_clicks() {
    let clicks = [11025usize, 22050, 33075];
    let samples = generate_clicks(44100.0, 1.0, &clicks);
    let source = Box::new(MemorySource::from_mono(samples, 44100.0).unwrap());

    let store = Arc::new(ResultStore::new());
    let mut driver = AnalysisDriver::new(catalogue());
    let setup = driver.run_analysis_into(
        &ExtractorKey::new("onsets", "onsets"),
        &ExtractorState::new(512, 512).unwrap(),
        source,
        Arc::clone(&store),
    );
    assert!(setup.succeeded());
    store.configure(setup.output().unwrap().frame_type(), 1);

    let results = recv_ended(&driver);
    assert_eq!(results.frame_type, FrameType::Label);
    assert_eq!(results.channels[0].len(), clicks.len());

    for (result, &click) in results.channels[0].iter().zip(&clicks) {
        let expected = click as f64 / 44100.0;
        // Onset lands within one block of the click.
        assert!(
            (result.time - expected).abs() < 512.0 / 44100.0 + 1e-9,
            "onset at {} expected near {}",
            result.time,
            expected
        );
        assert_eq!(result.label.as_deref(), Some("onset"));
    }

    // The store saw the same series, via the read guard.
    let guard = store.read().unwrap();
    assert_eq!(guard.channel(0).len(), clicks.len());
    match guard.view(0) {
        SeriesView::Markers(markers) => assert_eq!(markers.len(), clicks.len()),
        _ => panic!("expected marker view"),
    }
}

#[test]
fn test_spectrum_analysis_is_vector_series() {
    let store = Arc::new(ResultStore::new());
    let mut driver = AnalysisDriver::new(catalogue());
    let setup = driver.run_analysis_into(
        &ExtractorKey::new("spectrum", "magnitudes"),
        &ExtractorState::new(512, 256).unwrap(),
        sine_source(0.5),
        Arc::clone(&store),
    );
    assert!(setup.succeeded());

    let output = setup.output().unwrap().clone();
    assert_eq!(output.frame_type(), FrameType::Vector);
    assert_eq!(output.bin_count, 257);

    let results = recv_ended(&driver);
    assert!(results.channels[0]
        .iter()
        .all(|r| r.values.len() == output.bin_count));

    // 440 Hz at 44.1 kHz with 512-point FFT peaks near bin 5.
    let mid: &AnalysisResult = &results.channels[0][20];
    let peak_bin = (0..mid.values.len())
        .max_by(|&a, &b| mid.values[a].partial_cmp(&mid.values[b]).unwrap())
        .unwrap();
    assert!((4..=6).contains(&peak_bin), "peak bin {peak_bin}");
}

#[test]
fn test_bad_key_fails_synchronously() {
    let mut driver = AnalysisDriver::new(catalogue());
    let setup = driver.run_analysis(
        &ExtractorKey::new("", "x"),
        &ExtractorState::new(1024, 1024).unwrap(),
        sine_source(0.1),
    );

    assert_eq!(setup.warning, WarningType::State);
    assert!(!setup.message.is_empty());
    assert!(!driver.is_running());
    assert!(driver.events().try_recv().is_err());
}

#[test]
fn test_reconfiguration_aborts_then_completes() {
    let mut driver = AnalysisDriver::new(catalogue());

    // Run A over a long file, read slowly enough to still be in flight.
    let samples = generate_sine(440.0, 44100.0, 30.0);
    let slow = ThrottledSource {
        inner: MemorySource::from_mono(samples, 44100.0).unwrap(),
    };
    let setup = driver.run_analysis(
        &ExtractorKey::new("power", "power"),
        &ExtractorState::new(512, 512).unwrap(),
        Box::new(slow),
    );
    assert!(setup.succeeded());

    // Reconfigure to run B before A can finish.
    let setup = driver.run_analysis(
        &ExtractorKey::new("power", "peak"),
        &ExtractorState::new(512, 512).unwrap(),
        sine_source(0.2),
    );
    assert!(setup.succeeded());

    // Exactly one abort (A), then exactly one completion (B).
    let first = driver
        .events()
        .recv_timeout(Duration::from_secs(10))
        .unwrap();
    assert!(matches!(first, AnalysisEvent::Aborted));

    let results = recv_ended(&driver);
    assert!(!results.channels[0].is_empty());
    assert!(driver.events().try_recv().is_err());
}

#[test]
fn test_wav_file_end_to_end() {
    // Stream a real WAV from disk through the pipeline.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for sample in generate_sine(440.0, 44100.0, 1.0) {
        writer
            .write_sample((sample * i16::MAX as f32 * 0.9) as i16)
            .unwrap();
    }
    writer.finalize().unwrap();

    let source = Box::new(WavSource::open(&path).unwrap());
    let mut driver = AnalysisDriver::new(catalogue());
    let setup = driver.run_analysis(
        &ExtractorKey::new("power", "power"),
        &ExtractorState::new(1024, 1024).unwrap(),
        source,
    );
    assert!(setup.succeeded());

    let results = recv_ended(&driver);
    let mid = &results.channels[0][10];
    assert!((mid.values[0] - 0.9 * std::f32::consts::FRAC_1_SQRT_2).abs() < 0.05);
}

#[test]
fn test_store_queries_after_analysis() {
    let store = Arc::new(ResultStore::new());
    let mut driver = AnalysisDriver::new(catalogue());
    driver.run_analysis_into(
        &ExtractorKey::new("power", "power"),
        &ExtractorState::new(4410, 4410).unwrap(),
        sine_source(1.0),
        Arc::clone(&store),
    );
    let _ = recv_ended(&driver);

    let guard = store.read().unwrap();

    // Lower-bound lookup by time.
    let index = guard.find_first_at(0, 0.25).unwrap();
    assert!(guard.channel(0)[index].time >= 0.25);
    if index > 0 {
        assert!(guard.channel(0)[index - 1].time < 0.25);
    }

    // Durationless lookup resolves to the following result.
    let result = guard.result_at(0, 0.05).unwrap();
    assert!(result.time >= 0.05);

    // Value range spans sine RMS values, not the sentinel.
    let (min, max) = guard.value_range();
    assert!(min > f32::MIN && max < f32::MAX);
    assert!(max <= 1.0);
}

#[test]
fn test_unstamped_features_are_backfilled() {
    // The power extractor emits unstamped features; every published
    // result must carry a block timestamp.
    let mut driver = AnalysisDriver::new(catalogue());
    driver.run_analysis(
        &ExtractorKey::new("power", "power"),
        &ExtractorState::new(1000, 1000).unwrap(),
        Box::new(MemorySource::from_mono(vec![0.1; 5000], 1000.0).unwrap()),
    );
    let results = recv_ended(&driver);

    let times: Vec<f64> = results.channels[0].iter().map(|r| r.time).collect();
    // Blocks at 0..=5 seconds (position 5000 processes the final, empty
    // hop) plus nothing from the drain for this extractor.
    assert_eq!(times, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);

    // Feature equality helper tolerates float noise.
    let a = Feature::at(1.0).with_value(0.1);
    let b = Feature::at(1.0 + 1e-9).with_value(0.1);
    assert!(a.approx_eq(&b, 1e-6));
}
