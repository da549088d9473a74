//! Normalized, queryable analysis results.
//!
//! One store per track: an ordered sequence of results per channel, with
//! timestamps non-decreasing within a channel. Renderers and tooltips read
//! through a try-acquired guard so the UI thread never blocks on a swap;
//! the analysis side replaces the contents wholesale when a run completes,
//! and readers see either the old or the new sequence, never a splice.

use parking_lot::{RwLock, RwLockReadGuard};
use serde::{Deserialize, Serialize};
use sonoscope_extract::{Feature, FrameType};

/// One normalized result: a stamped feature with its optional duration,
/// value vector, and label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub time: f64,
    pub duration: Option<f64>,
    pub values: Vec<f32>,
    pub label: Option<String>,
}

impl AnalysisResult {
    /// The scalar value of a point-series result.
    pub fn value(&self) -> Option<f32> {
        self.values.first().copied()
    }

    /// True when `time <= t < time + duration`.
    pub fn contains(&self, t: f64) -> bool {
        match self.duration {
            Some(d) => self.time <= t && t < self.time + d,
            None => false,
        }
    }
}

impl From<Feature> for AnalysisResult {
    fn from(f: Feature) -> Self {
        Self {
            time: f.timestamp.unwrap_or_default(),
            duration: f.duration,
            values: f.values,
            label: f.label,
        }
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    frame_type: FrameType,
    channels: Vec<Vec<AnalysisResult>>,
}

/// Multi-reader / single-writer result container.
#[derive(Debug, Default)]
pub struct ResultStore {
    inner: RwLock<StoreInner>,
}

impl ResultStore {
    /// An empty store with no channels configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expected frame type and channel count, emptying all series.
    /// Called when a track is configured, before results arrive.
    pub fn configure(&self, frame_type: FrameType, channel_count: usize) {
        let mut inner = self.inner.write();
        inner.frame_type = frame_type;
        inner.channels = vec![Vec::new(); channel_count];
    }

    /// Empty every channel's series, keeping the configured shape.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        for channel in inner.channels.iter_mut() {
            channel.clear();
        }
    }

    /// Wholesale swap with a completed analysis' results.
    ///
    /// Each channel's results must be in non-decreasing time order; the
    /// driver normalizes (sorts) before publishing.
    pub fn replace(&self, frame_type: FrameType, channels: Vec<Vec<AnalysisResult>>) {
        debug_assert!(channels
            .iter()
            .all(|c| c.windows(2).all(|w| w[0].time <= w[1].time)));

        let mut inner = self.inner.write();
        inner.frame_type = frame_type;
        inner.channels = channels;
    }

    /// Acquire read access, or `None` while a writer holds the store.
    pub fn read(&self) -> Option<StoreReadGuard<'_>> {
        self.inner.try_read().map(StoreReadGuard)
    }
}

/// Read token over the store. All queries live here, so readers cannot
/// touch the sequences without holding access.
pub struct StoreReadGuard<'a>(RwLockReadGuard<'a, StoreInner>);

impl StoreReadGuard<'_> {
    pub fn frame_type(&self) -> FrameType {
        self.0.frame_type
    }

    pub fn channel_count(&self) -> usize {
        self.0.channels.len()
    }

    pub fn channel(&self, channel: usize) -> &[AnalysisResult] {
        self.0.channels.get(channel).map_or(&[], |c| c.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.0.channels.iter().all(|c| c.is_empty())
    }

    /// Index of the first result at or after `time`, by binary search.
    pub fn find_first_at(&self, channel: usize, time: f64) -> Option<usize> {
        let series = self.channel(channel);
        let index = series.partition_point(|r| r.time < time);
        (index < series.len()).then_some(index)
    }

    /// The result covering `time`.
    ///
    /// Results with durations match by containment
    /// (`time <= t < time + duration`); otherwise the nearest result at or
    /// after `t` is returned.
    pub fn result_at(&self, channel: usize, time: f64) -> Option<&AnalysisResult> {
        let series = self.channel(channel);
        if series.is_empty() {
            return None;
        }

        let following = series.partition_point(|r| r.time < time);
        if following > 0 && series[following - 1].contains(time) {
            return Some(&series[following - 1]);
        }
        series.get(following)
    }

    /// Min/max over each result's scalar value, across all channels.
    /// Degenerates to the full-float sentinel range when no result
    /// carries a value, so auto-scaling never divides by zero.
    pub fn value_range(&self) -> (f32, f32) {
        self.fold_range(|r| r.value().into_iter())
    }

    /// Min/max over every component of every value vector.
    pub fn bin_range(&self) -> (f32, f32) {
        self.fold_range(|r| r.values.iter().copied())
    }

    fn fold_range<'a, I, F>(&'a self, values: F) -> (f32, f32)
    where
        I: Iterator<Item = f32>,
        F: Fn(&'a AnalysisResult) -> I,
    {
        let mut range: Option<(f32, f32)> = None;
        for channel in &self.0.channels {
            for result in channel {
                for v in values(result) {
                    range = Some(match range {
                        Some((min, max)) => (min.min(v), max.max(v)),
                        None => (v, v),
                    });
                }
            }
        }
        range.unwrap_or((f32::MIN, f32::MAX))
    }

    /// Typed view of one channel's series, matching the store's frame type.
    pub fn view(&self, channel: usize) -> SeriesView<'_> {
        let series = self.channel(channel);
        match self.0.frame_type {
            FrameType::Label => SeriesView::Markers(MarkerSeries { results: series }),
            FrameType::Value => SeriesView::Points(PointSeries { results: series }),
            FrameType::Vector => SeriesView::Columns(ColumnSeries { results: series }),
        }
    }
}

/// A labeled instant or span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker<'a> {
    pub time: f64,
    pub duration: Option<f64>,
    pub label: Option<&'a str>,
}

/// A scalar sample in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub time: f64,
    pub duration: Option<f64>,
    pub value: Option<f32>,
}

/// One dense per-frame array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column<'a> {
    pub time: f64,
    pub values: &'a [f32],
}

/// Typed access to one channel, by frame type.
pub enum SeriesView<'a> {
    Markers(MarkerSeries<'a>),
    Points(PointSeries<'a>),
    Columns(ColumnSeries<'a>),
}

/// Marker series: `(time, duration, label)` events.
#[derive(Debug, Clone, Copy)]
pub struct MarkerSeries<'a> {
    results: &'a [AnalysisResult],
}

impl<'a> MarkerSeries<'a> {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Marker<'a>> + '_ {
        self.results.iter().map(|r| Marker {
            time: r.time,
            duration: r.duration,
            label: r.label.as_deref(),
        })
    }
}

/// Point series: `(time, duration, optional value)` samples.
#[derive(Debug, Clone, Copy)]
pub struct PointSeries<'a> {
    results: &'a [AnalysisResult],
}

impl<'a> PointSeries<'a> {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Point> + 'a {
        self.results.iter().map(|r| Point {
            time: r.time,
            duration: r.duration,
            value: r.value(),
        })
    }
}

/// Column series: dense per-frame arrays.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSeries<'a> {
    results: &'a [AnalysisResult],
}

impl<'a> ColumnSeries<'a> {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Column<'a>> + '_ {
        self.results.iter().map(|r| Column {
            time: r.time,
            values: &r.values,
        })
    }
}
