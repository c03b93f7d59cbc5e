//! Host environment abstraction
//!
//! Trackers never touch a browser directly. Everything they need from the
//! environment (location, scroll geometry, listener registration) goes
//! through [`Host`], and every method is allowed to report "not available".
//! Code that runs before the document exists gets a [`HeadlessHost`] and all
//! tracking turns into no-ops.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Scroll geometry of the current document, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, viewport_height: f64, document_height: f64) -> Self {
        Self {
            scroll_top,
            viewport_height,
            document_height,
        }
    }

    /// Percentage of the document seen so far
    ///
    /// `floor((scroll_top + viewport_height) / document_height * 100)`.
    /// `None` when the document has no height.
    pub fn scroll_percentage(&self) -> Option<u32> {
        if !(self.document_height > 0.0) {
            return None;
        }
        let seen = (self.scroll_top + self.viewport_height).max(0.0);
        let pct = (seen / self.document_height * 100.0).floor();
        Some(pct.min(u32::MAX as f64) as u32)
    }
}

/// Host events a tracker can listen to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostEventKind {
    /// Passive scroll listener
    Scroll,
    /// Best-effort page unload
    BeforeUnload,
    Focus,
    Blur,
    Submit,
}

/// Handle returned by [`Host::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// The environment trackers run in
pub trait Host: Send + Sync {
    /// Path of the current page, if there is a location
    fn page_path(&self) -> Option<String>;

    /// Current scroll geometry, if there is a document
    fn scroll_metrics(&self) -> Option<ScrollMetrics>;

    /// Register interest in a host event
    fn subscribe(&self, kind: HostEventKind) -> Option<SubscriptionId>;

    /// Release a subscription; unknown ids are ignored
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Host without window or document
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessHost;

impl Host for HeadlessHost {
    fn page_path(&self) -> Option<String> {
        None
    }

    fn scroll_metrics(&self) -> Option<ScrollMetrics> {
        None
    }

    fn subscribe(&self, _kind: HostEventKind) -> Option<SubscriptionId> {
        None
    }

    fn unsubscribe(&self, _id: SubscriptionId) {}
}

/// In-memory host with settable geometry
///
/// Used by tests and by replay tooling. Keeps track of live subscriptions so
/// callers can check that trackers release everything they acquire.
#[derive(Debug, Default)]
pub struct SimulatedHost {
    page_path: Mutex<Option<String>>,
    metrics: Mutex<Option<ScrollMetrics>>,
    subscriptions: Mutex<HashMap<SubscriptionId, HostEventKind>>,
    next_id: AtomicU64,
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host showing `path` with a document of the given heights, scrolled to the top
    pub fn with_page(path: impl Into<String>, viewport_height: f64, document_height: f64) -> Self {
        let host = Self::new();
        host.set_page_path(path);
        host.set_metrics(ScrollMetrics::new(0.0, viewport_height, document_height));
        host
    }

    pub fn set_page_path(&self, path: impl Into<String>) {
        *self.page_path.lock() = Some(path.into());
    }

    pub fn set_metrics(&self, metrics: ScrollMetrics) {
        *self.metrics.lock() = Some(metrics);
    }

    /// Forget the document, as if running headless
    pub fn clear_metrics(&self) {
        *self.metrics.lock() = None;
    }

    /// Scroll so that `percent` of the document has been seen
    pub fn scroll_to_percent(&self, percent: f64) {
        let mut metrics = self.metrics.lock();
        if let Some(m) = metrics.as_mut() {
            let target = m.document_height * percent / 100.0 - m.viewport_height;
            m.scroll_top = target.max(0.0);
        }
    }

    /// Number of live subscriptions
    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions.lock().len()
    }

    /// Number of live subscriptions of one kind
    pub fn active_subscriptions_of(&self, kind: HostEventKind) -> usize {
        self.subscriptions
            .lock()
            .values()
            .filter(|k| **k == kind)
            .count()
    }
}

impl Host for SimulatedHost {
    fn page_path(&self) -> Option<String> {
        self.page_path.lock().clone()
    }

    fn scroll_metrics(&self) -> Option<ScrollMetrics> {
        *self.metrics.lock()
    }

    fn subscribe(&self, kind: HostEventKind) -> Option<SubscriptionId> {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscriptions.lock().insert(id, kind);
        Some(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions.lock().remove(&id);
    }
}
