//! Asynchronous analysis orchestration.
//!
//! One driver owns at most one in-flight analysis. Setup (key/state
//! validation, adapter construction) happens synchronously on the calling
//! thread; the block loop runs on a named background thread and reports
//! back through an event channel. Abort is cooperative and checked at
//! block boundaries: an extractor whose `process` call never returns
//! cannot be cancelled from here, only by tearing down the process.

use crate::block::BlockProcessor;
use crate::store::{AnalysisResult, ResultStore};
use crossbeam_channel::{unbounded, Receiver, Sender};
use sonoscope_core::{AtomicFloat, AudioSource};
use sonoscope_extract::{
    ExtractorAdapter, ExtractorCatalogue, ExtractorDescription, ExtractorKey, ExtractorState,
    FrameType, OutputDescriptor,
};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Lifecycle of one driver's analysis slot.
///
/// The only path is `Available -> Running -> {Ended | Aborted} ->
/// Available`. The worker owns the `Running -> Ended` transition and the
/// control side owns `Running -> Aborted`; both race through
/// compare-exchange so exactly one terminal state wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ProcessState {
    Available = 0,
    Running = 1,
    Aborted = 2,
    Ended = 3,
}

impl ProcessState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ProcessState::Running,
            2 => ProcessState::Aborted,
            3 => ProcessState::Ended,
            _ => ProcessState::Available,
        }
    }
}

/// Setup-time failure classification surfaced to track owners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WarningType {
    #[default]
    None,
    /// The extractor could not be loaded or rejected its configuration.
    Plugin,
    /// The supplied key, state, or parameters are invalid.
    State,
}

/// Synchronous result of `run_analysis`: either the adapted extractor's
/// description (analysis launched) or a warning with a message (analysis
/// never started, no event will fire).
#[derive(Debug, Clone)]
pub struct AnalysisSetup {
    pub warning: WarningType,
    pub message: String,
    pub description: Option<ExtractorDescription>,
}

impl AnalysisSetup {
    fn launched(description: ExtractorDescription) -> Self {
        Self {
            warning: WarningType::None,
            message: String::new(),
            description: Some(description),
        }
    }

    fn failed(warning: WarningType, message: String) -> Self {
        Self {
            warning,
            message,
            description: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.warning == WarningType::None
    }

    /// Shape of the configured output, for pre-configuring a result store.
    pub fn output(&self) -> Option<&OutputDescriptor> {
        self.description.as_ref().map(|d| &d.output)
    }
}

/// Normalized payload of a completed analysis.
#[derive(Debug, Clone)]
pub struct AnalysisResults {
    pub frame_type: FrameType,
    pub sample_rate: f64,
    pub channels: Vec<Vec<AnalysisResult>>,
}

/// Edge-triggered completion notification; exactly one per launched run.
#[derive(Debug, Clone)]
pub enum AnalysisEvent {
    Ended(AnalysisResults),
    Aborted,
}

/// Drives one extractor over one audio source on a background thread.
pub struct AnalysisDriver {
    catalogue: Arc<dyn ExtractorCatalogue>,
    state: Arc<AtomicU8>,
    advancement: Arc<AtomicFloat>,
    worker: Option<JoinHandle<()>>,
    event_tx: Sender<AnalysisEvent>,
    event_rx: Receiver<AnalysisEvent>,
}

impl AnalysisDriver {
    pub fn new(catalogue: Arc<dyn ExtractorCatalogue>) -> Self {
        let (event_tx, event_rx) = unbounded();
        Self {
            catalogue,
            state: Arc::new(AtomicU8::new(ProcessState::Available as u8)),
            advancement: Arc::new(AtomicFloat::new(0.0)),
            worker: None,
            event_tx,
            event_rx,
        }
    }

    /// Start an analysis of `source` with the given key and state.
    ///
    /// If an analysis is already in flight it is aborted and joined first;
    /// two runs never overlap on one driver. Setup errors are returned
    /// synchronously and launch nothing. On success the block loop starts
    /// on a background thread and the completion event arrives on
    /// [`events`](Self::events).
    pub fn run_analysis(
        &mut self,
        key: &ExtractorKey,
        state: &ExtractorState,
        source: Box<dyn AudioSource>,
    ) -> AnalysisSetup {
        self.run_analysis_with_store(key, state, source, None)
    }

    /// Like [`run_analysis`](Self::run_analysis), additionally replacing
    /// `store` wholesale with the normalized results on completion (before
    /// the `Ended` event is delivered). An aborted run leaves the store
    /// untouched.
    pub fn run_analysis_into(
        &mut self,
        key: &ExtractorKey,
        state: &ExtractorState,
        source: Box<dyn AudioSource>,
        store: Arc<ResultStore>,
    ) -> AnalysisSetup {
        self.run_analysis_with_store(key, state, source, Some(store))
    }

    fn run_analysis_with_store(
        &mut self,
        key: &ExtractorKey,
        state: &ExtractorState,
        source: Box<dyn AudioSource>,
        store: Option<Arc<ResultStore>>,
    ) -> AnalysisSetup {
        self.stop_analysis();

        let channels = source.channels();
        if channels == 0 {
            return AnalysisSetup::failed(
                WarningType::State,
                "audio source has no channels".into(),
            );
        }

        let adapter = match ExtractorAdapter::create(
            self.catalogue.as_ref(),
            key,
            state,
            channels,
            source.sample_rate(),
        ) {
            Ok(adapter) => adapter,
            Err(e) => {
                let warning = if e.is_state_error() {
                    WarningType::State
                } else {
                    WarningType::Plugin
                };
                tracing::warn!(key = %key, error = %e, "analysis setup failed");
                return AnalysisSetup::failed(warning, e.to_string());
            }
        };

        let description = adapter.description().clone();
        let frame_type = adapter.output().frame_type();
        let sample_rate = source.sample_rate();
        let mut processor = BlockProcessor::new(adapter, source);

        let entered = self.transition(ProcessState::Available, ProcessState::Running);
        debug_assert!(entered, "state must be available after stop_analysis");
        self.advancement.set(0.0);

        let shared_state = Arc::clone(&self.state);
        let advancement = Arc::clone(&self.advancement);
        let event_tx = self.event_tx.clone();

        tracing::debug!(key = %key, "analysis started");
        let handle = std::thread::Builder::new()
            .name("sonoscope-analysis".into())
            .spawn(move || {
                worker_loop(
                    &mut processor,
                    shared_state,
                    advancement,
                    event_tx,
                    frame_type,
                    sample_rate,
                    store,
                );
            })
            .expect("failed to spawn analysis thread");
        self.worker = Some(handle);

        AnalysisSetup::launched(description)
    }

    /// Abort any in-flight analysis and wait for the worker to exit.
    ///
    /// Blocks for at most one block's processing time. After return the
    /// driver is `Available` with zero advancement, and no event from the
    /// stopped run other than its single `Aborted` will ever fire.
    pub fn stop_analysis(&mut self) {
        self.transition(ProcessState::Running, ProcessState::Aborted);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
        self.state
            .store(ProcessState::Available as u8, Ordering::Release);
        self.advancement.set(0.0);
    }

    pub fn is_running(&self) -> bool {
        self.process_state() == ProcessState::Running
    }

    pub fn process_state(&self) -> ProcessState {
        ProcessState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Fractional progress of the current run, safe to poll from a UI
    /// refresh timer.
    pub fn advancement(&self) -> f32 {
        self.advancement.get()
    }

    /// Completion events, one per launched run: `Ended` or `Aborted`.
    pub fn events(&self) -> &Receiver<AnalysisEvent> {
        &self.event_rx
    }

    fn transition(&self, from: ProcessState, to: ProcessState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Drop for AnalysisDriver {
    fn drop(&mut self) {
        self.stop_analysis();
    }
}

fn worker_loop(
    processor: &mut BlockProcessor,
    state: Arc<AtomicU8>,
    advancement: Arc<AtomicFloat>,
    event_tx: Sender<AnalysisEvent>,
    frame_type: FrameType,
    sample_rate: f64,
    store: Option<Arc<ResultStore>>,
) {
    let mut features = Vec::new();

    loop {
        if ProcessState::from_u8(state.load(Ordering::Acquire)) != ProcessState::Running {
            tracing::debug!("analysis aborted");
            let _ = event_tx.send(AnalysisEvent::Aborted);
            return;
        }

        match processor.next_block(&mut features) {
            Ok(true) => advancement.set(processor.advancement()),
            Ok(false) => break,
            Err(e) => {
                tracing::warn!(error = %e, "audio read failed, aborting analysis");
                let _ = state.compare_exchange(
                    ProcessState::Running as u8,
                    ProcessState::Aborted as u8,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                );
                let _ = event_tx.send(AnalysisEvent::Aborted);
                return;
            }
        }
    }

    // The run is only published if completion wins the race against abort.
    let ended = state
        .compare_exchange(
            ProcessState::Running as u8,
            ProcessState::Ended as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        )
        .is_ok();
    if !ended {
        let _ = event_tx.send(AnalysisEvent::Aborted);
        return;
    }

    advancement.set(1.0);

    let mut series: Vec<AnalysisResult> = features.into_iter().map(AnalysisResult::from).collect();
    // Extractors emitting their own timestamps are not required to emit
    // in order; the store invariant is non-decreasing time.
    series.sort_by(|a, b| a.time.total_cmp(&b.time));

    let results = AnalysisResults {
        frame_type,
        sample_rate,
        channels: vec![series],
    };

    if let Some(store) = store {
        store.replace(results.frame_type, results.channels.clone());
    }

    tracing::debug!(count = results.channels[0].len(), "analysis ended");
    let _ = event_tx.send(AnalysisEvent::Ended(results));
    state.store(ProcessState::Available as u8, Ordering::Release);
}
