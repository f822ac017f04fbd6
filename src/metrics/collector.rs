//! Metrics collection and registry.

use crate::mailbox::FrameBufferStats;
use crate::view::ViewStats;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};
use std::sync::Mutex;
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of pipeline counters for metrics update.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    /// Mailbox traffic.
    pub buffer: FrameBufferStats,
    /// Render and capture results.
    pub view: ViewStats,
}

impl MetricsSnapshot {
    /// Reads the current counters of a view.
    pub fn from_view(view: &crate::view::EdgeView) -> Self {
        Self {
            buffer: view.buffer_stats(),
            view: view.stats(),
        }
    }
}

/// Prometheus metrics registry for the edge pipeline.
pub struct MetricsRegistry {
    registry: Registry,
    // Held across a whole update; concurrent scrapes would otherwise
    // both add the same gap.
    update_lock: Mutex<()>,

    // Mailbox
    frames_published: IntCounter,
    frames_dropped_busy: IntCounter,
    frames_dropped_unconsumed: IntCounter,
    frames_consumed: IntCounter,
    consume_busy: IntCounter,
    consume_empty: IntCounter,

    // Render path
    frames_rendered: IntCounter,
    frames_skipped: IntCounter,
    frames_rejected: IntCounter,
    captures_saved: IntCounter,
    captures_failed: IntCounter,
}

/// Advances a counter to `target` (counters only move forward).
///
/// Read-then-add: callers must not advance the same counter concurrently.
fn advance(counter: &IntCounter, target: u64) {
    let current = counter.get();
    if target > current {
        counter.inc_by(target - current);
    }
}

impl MetricsRegistry {
    /// Creates a new registry with all pipeline metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let counter = |name: &str, help: &str| -> Result<IntCounter, MetricsError> {
            let counter = IntCounter::new(name, help)?;
            registry.register(Box::new(counter.clone()))?;
            Ok(counter)
        };

        let frames_published = counter(
            "edge_finder_frames_published_total",
            "Frames accepted into the frame buffer",
        )?;
        let frames_dropped_busy = counter(
            "edge_finder_frames_dropped_busy_total",
            "Frames dropped because the renderer held the frame buffer",
        )?;
        let frames_dropped_unconsumed = counter(
            "edge_finder_frames_dropped_unconsumed_total",
            "Frames dropped because the previous frame was not rendered yet",
        )?;
        let frames_consumed = counter(
            "edge_finder_frames_consumed_total",
            "Frames taken from the frame buffer by the renderer",
        )?;
        let consume_busy = counter(
            "edge_finder_consume_busy_total",
            "Draw cycles that found the camera holding the frame buffer",
        )?;
        let consume_empty = counter(
            "edge_finder_consume_empty_total",
            "Draw cycles that found no fresh frame",
        )?;
        let frames_rendered = counter(
            "edge_finder_frames_rendered_total",
            "Frames rendered by the edge detector",
        )?;
        let frames_skipped = counter(
            "edge_finder_frames_skipped_total",
            "Consumed frames the edge detector rejected",
        )?;
        let frames_rejected = counter(
            "edge_finder_frames_rejected_total",
            "Camera frames rejected for malformed dimensions",
        )?;
        let captures_saved = counter(
            "edge_finder_captures_saved_total",
            "Edge captures persisted",
        )?;
        let captures_failed = counter(
            "edge_finder_captures_failed_total",
            "Edge captures that could not be persisted",
        )?;

        Ok(Self {
            registry,
            update_lock: Mutex::new(()),
            frames_published,
            frames_dropped_busy,
            frames_dropped_unconsumed,
            frames_consumed,
            consume_busy,
            consume_empty,
            frames_rendered,
            frames_skipped,
            frames_rejected,
            captures_saved,
            captures_failed,
        })
    }

    /// Updates all metrics from a snapshot.
    ///
    /// Safe to call from concurrent scrapes.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        let _guard = self
            .update_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let buffer = &snapshot.buffer;
        advance(&self.frames_published, buffer.published);
        advance(&self.frames_dropped_busy, buffer.dropped_busy);
        advance(&self.frames_dropped_unconsumed, buffer.dropped_unconsumed);
        advance(&self.frames_consumed, buffer.consumed);
        advance(&self.consume_busy, buffer.consume_busy);
        advance(&self.consume_empty, buffer.consume_empty);

        let view = &snapshot.view;
        advance(&self.frames_rendered, view.rendered);
        advance(&self.frames_skipped, view.skipped);
        advance(&self.frames_rejected, view.frames_rejected);
        advance(&self.captures_saved, view.captures_saved);
        advance(&self.captures_failed, view.captures_failed);
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = MetricsRegistry::new();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();

        let snapshot = MetricsSnapshot {
            buffer: FrameBufferStats {
                published: 12,
                dropped_unconsumed: 30,
                consumed: 11,
                ..Default::default()
            },
            view: ViewStats {
                rendered: 11,
                captures_saved: 1,
                ..Default::default()
            },
        };

        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("edge_finder_frames_published_total 12"));
        assert!(output.contains("edge_finder_frames_dropped_unconsumed_total 30"));
        assert!(output.contains("edge_finder_captures_saved_total 1"));
    }

    #[test]
    fn test_counters_never_go_backwards() {
        let registry = MetricsRegistry::new().unwrap();
        let mut snapshot = MetricsSnapshot::default();

        snapshot.view.rendered = 5;
        registry.update(&snapshot);
        snapshot.view.rendered = 3;
        registry.update(&snapshot);

        assert_eq!(registry.frames_rendered.get(), 5);
    }

    #[test]
    fn test_concurrent_updates_land_on_target() {
        let registry = std::sync::Arc::new(MetricsRegistry::new().unwrap());
        let mut snapshot = MetricsSnapshot::default();
        snapshot.buffer.published = 1_000;
        snapshot.view.rendered = 750;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = std::sync::Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        registry.update(&snapshot);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.frames_published.get(), 1_000);
        assert_eq!(registry.frames_rendered.get(), 750);
    }

    #[test]
    fn test_metrics_encode() {
        let registry = MetricsRegistry::new().unwrap();
        let output = registry.encode().unwrap();

        assert!(output.contains("edge_finder_frames_published_total"));
        assert!(output.contains("edge_finder_consume_busy_total"));
        assert!(output.contains("edge_finder_captures_failed_total"));
    }
}
