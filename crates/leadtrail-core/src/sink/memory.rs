//! Recording sink for assertions

use parking_lot::RwLock;

use crate::{error::SinkResult, event::Event, sink::AnalyticsSink};

/// Keeps every event it receives, in order
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: RwLock<Vec<Event>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events
    pub fn events(&self) -> Vec<Event> {
        self.events.read().clone()
    }

    /// Names of all recorded events, in order
    pub fn names(&self) -> Vec<String> {
        self.events.read().iter().map(|e| e.name.clone()).collect()
    }

    /// Number of events recorded under `name`
    pub fn count(&self, name: &str) -> usize {
        self.events.read().iter().filter(|e| e.name == name).count()
    }

    /// Events recorded under `name`
    pub fn named(&self, name: &str) -> Vec<Event> {
        self.events
            .read()
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    /// Most recent event, if any
    pub fn last(&self) -> Option<Event> {
        self.events.read().last().cloned()
    }

    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl AnalyticsSink for RecordingSink {
    fn event(&self, event: &Event) -> SinkResult<()> {
        self.events.write().push(event.clone());
        Ok(())
    }
}
