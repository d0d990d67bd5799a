use std::collections::BTreeMap;
use std::time::Instant;

use crate::capture::domain::frame_slot::FrameStats;

/// Observer for frame pipeline events.
///
/// The frame worker reports through this trait so the binary and tests can
/// watch the pipeline without the worker knowing where output goes.
pub trait PipelineLogger: Send {
    /// A frame finished processing; `stats` are the slot counters after it.
    fn frame(&mut self, index: usize, stats: FrameStats);

    /// How long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// A point-in-time metric.
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// End-of-stream summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards everything.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn frame(&mut self, _index: usize, _stats: FrameStats) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Running aggregate of one timing or metric series.
///
/// A camera feed has no end in sight, so values are folded in rather than
/// kept.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Series {
    pub count: usize,
    pub total: f64,
    pub max: f64,
}

impl Series {
    fn record(&mut self, value: f64) {
        self.max = if self.count == 0 { value } else { self.max.max(value) };
        self.count += 1;
        self.total += value;
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

/// Logs progress every `throttle_frames` processed frames through `log`
/// and prints a timing summary when the stream ends.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    timings: BTreeMap<String, Series>,
    metrics: BTreeMap<String, Series>,
    started: Instant,
    processed: usize,
    latest: FrameStats,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            started: Instant::now(),
            processed: 0,
            latest: FrameStats::default(),
        }
    }

    pub fn timings_for(&self, stage: &str) -> Option<&Series> {
        self.timings.get(stage)
    }

    pub fn frames_processed(&self) -> usize {
        self.processed
    }

    /// The summary text, or `None` before anything was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.processed == 0 && self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }
        let elapsed = self.started.elapsed().as_secs_f64();

        let mut lines = vec![format!(
            "Pipeline summary ({} frames processed, {} dropped, {elapsed:.1}s):",
            self.processed, self.latest.dropped
        )];
        for (stage, series) in &self.timings {
            lines.push(format!(
                "  {stage:12}: avg {:6.1}ms  max {:6.1}ms  total {:7.0}ms",
                series.mean(),
                series.max,
                series.total
            ));
        }
        for (name, series) in &self.metrics {
            lines.push(format!("  {name}: avg {:.1} over {}", series.mean(), series.count));
        }
        if self.processed > 0 && elapsed > 0.0 {
            lines.push(format!(
                "  Throughput: {:.1} fps",
                self.processed as f64 / elapsed
            ));
        }
        Some(lines.join("\n"))
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn frame(&mut self, index: usize, stats: FrameStats) {
        self.processed += 1;
        self.latest = stats;
        if self.processed % self.throttle_frames == 0 {
            log::info!(
                "Processed {} frames (latest #{index}, {} dropped)",
                self.processed,
                stats.dropped
            );
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .record(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().record(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
