//! Analytics sinks
//!
//! A sink is the one-way exit for events. Delivery is fire-and-forget: no
//! acknowledgement, no retry, no backpressure towards the page.

pub mod http;
pub mod memory;

pub use http::{HttpSink, HttpSinkConfig};
pub use memory::RecordingSink;

use std::sync::Arc;

use tracing::{info, warn};

use crate::{error::SinkResult, event::Event};

/// Destination for dispatched events
pub trait AnalyticsSink: Send + Sync {
    /// Hand one event to the backend
    fn event(&self, event: &Event) -> SinkResult<()>;
}

/// Sink for environments where no analytics backend is loaded
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl AnalyticsSink for NoopSink {
    fn event(&self, _event: &Event) -> SinkResult<()> {
        Ok(())
    }
}

/// Writes every event to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl AnalyticsSink for ConsoleSink {
    fn event(&self, event: &Event) -> SinkResult<()> {
        info!(target: "leadtrail::analytics", event_id = %event.id, "{}", event.description());
        Ok(())
    }
}

/// Forwards each event to several sinks
///
/// A failing sink does not keep the others from receiving the event; the
/// first error is reported after all sinks were tried.
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn AnalyticsSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn AnalyticsSink>>) -> Self {
        Self { sinks }
    }

    /// Add another destination
    pub fn push(&mut self, sink: Arc<dyn AnalyticsSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl AnalyticsSink for FanoutSink {
    fn event(&self, event: &Event) -> SinkResult<()> {
        let mut first_error = None;

        for (index, sink) in self.sinks.iter().enumerate() {
            if let Err(e) = sink.event(event) {
                warn!(sink = index, error = %e, "Fan-out sink failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
