//! Page lifecycle tracking
//!
//! A [`PageTracker`] covers one rendered page: a single view event on start,
//! scroll milestones while the page is open, and a dwell-time report when it
//! goes away.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use leadtrail_core::{
    elapsed_seconds,
    names::{self, props},
    EventDispatcher, HostEventKind, PageContext, Properties, PropertyValue, SessionAttribution,
    SubscriptionId, TrackingScope,
};

/// Scroll milestones used when none are configured
pub const DEFAULT_MILESTONES: [u8; 4] = [25, 50, 75, 100];

/// What a page tracker reports about
#[derive(Debug, Clone)]
pub struct PageOptions {
    pub page_type: String,
    /// Defaults to the scope's page name, then to `page_type`
    pub page_name: Option<String>,
    pub program_code: Option<String>,
    /// Merged into the page view event; wins over scope dimensions
    pub additional_data: Properties,
    pub scope: TrackingScope,
    /// Ascending percentages in `1..=100`
    pub milestones: Vec<u8>,
    /// Funnel to report a drop-off against when the page sees no engagement
    pub funnel_id: Option<String>,
    /// Session attribution, merged into the first page view of the session
    pub attribution: Option<Arc<SessionAttribution>>,
}

impl PageOptions {
    pub fn new(page_type: impl Into<String>) -> Self {
        Self {
            page_type: page_type.into(),
            page_name: None,
            program_code: None,
            additional_data: Properties::new(),
            scope: TrackingScope::new(),
            milestones: DEFAULT_MILESTONES.to_vec(),
            funnel_id: None,
            attribution: None,
        }
    }

    pub fn with_page_name(mut self, page_name: impl Into<String>) -> Self {
        self.page_name = Some(page_name.into());
        self
    }

    pub fn with_program_code(mut self, program_code: impl Into<String>) -> Self {
        self.program_code = Some(program_code.into());
        self
    }

    pub fn with_additional_data(mut self, data: Properties) -> Self {
        self.additional_data.extend(data);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.additional_data.insert(key.into(), value.into());
        self
    }

    pub fn with_scope(mut self, scope: TrackingScope) -> Self {
        self.scope = scope;
        self
    }

    /// Replace the scroll milestones
    ///
    /// Values outside `1..=100` are dropped; the rest are sorted and deduplicated.
    pub fn with_milestones(mut self, milestones: impl IntoIterator<Item = u8>) -> Self {
        let mut milestones: Vec<u8> = milestones
            .into_iter()
            .filter(|m| (1..=100).contains(m))
            .collect();
        milestones.sort_unstable();
        milestones.dedup();
        self.milestones = milestones;
        self
    }

    pub fn with_funnel(mut self, funnel_id: impl Into<String>) -> Self {
        self.funnel_id = Some(funnel_id.into());
        self
    }

    pub fn with_attribution(mut self, attribution: Arc<SessionAttribution>) -> Self {
        self.attribution = Some(attribution);
        self
    }
}

/// Tracks the lifecycle of one page
///
/// Host and clock come from the dispatcher. The caller forwards host
/// notifications to [`handle_scroll`](Self::handle_scroll) and
/// [`handle_before_unload`](Self::handle_before_unload), and calls
/// [`stop`](Self::stop) on teardown. Dropping a tracker stops it.
#[derive(Debug)]
pub struct PageTracker {
    options: PageOptions,
    scope: TrackingScope,
    dispatcher: EventDispatcher,
    started_at: Option<DateTime<Utc>>,
    reached: Vec<u8>,
    reported: bool,
    subscriptions: Vec<SubscriptionId>,
    stopped: bool,
}

impl PageTracker {
    pub fn new(options: PageOptions, dispatcher: EventDispatcher) -> Self {
        let page_name = options
            .page_name
            .clone()
            .or_else(|| options.scope.page().map(|p| p.page_name.clone()))
            .unwrap_or_else(|| options.page_type.clone());
        let scope = options
            .scope
            .with_page(PageContext::new(options.page_type.clone(), page_name));

        Self {
            options,
            scope,
            dispatcher,
            started_at: None,
            reached: Vec::new(),
            reported: false,
            subscriptions: Vec::new(),
            stopped: false,
        }
    }

    /// Fire the page view and subscribe to host notifications
    ///
    /// Only the first call does anything.
    pub fn start(&mut self) {
        if self.started_at.is_some() || self.stopped {
            return;
        }
        self.started_at = Some(self.dispatcher.clock().now());

        let mut extra = self.options.additional_data.clone();
        if let Some(code) = &self.options.program_code {
            extra
                .entry(props::PROGRAM_CODE.to_string())
                .or_insert_with(|| PropertyValue::from(code.as_str()));
        }
        if let Some(attribution) = self
            .options
            .attribution
            .as_ref()
            .and_then(|a| a.take_for_page_view())
        {
            for (key, value) in attribution {
                extra.entry(key).or_insert(value);
            }
        }
        self.dispatcher.track_page_view(&self.scope, extra);

        for kind in [HostEventKind::Scroll, HostEventKind::BeforeUnload] {
            if let Some(id) = self.dispatcher.host().subscribe(kind) {
                self.subscriptions.push(id);
            }
        }

        debug!(
            page_type = %self.options.page_type,
            subscriptions = self.subscriptions.len(),
            "Page tracking started"
        );
    }

    /// Fire `scroll_depth` for every milestone newly crossed
    ///
    /// No-op without host metrics, before start and after stop.
    pub fn handle_scroll(&mut self) {
        if !self.is_active() {
            return;
        }
        let Some(percentage) = self
            .dispatcher
            .host()
            .scroll_metrics()
            .and_then(|m| m.scroll_percentage())
        else {
            return;
        };

        let crossed: Vec<u8> = self
            .options
            .milestones
            .iter()
            .copied()
            .filter(|m| u32::from(*m) <= percentage && !self.reached.contains(m))
            .collect();

        for milestone in crossed {
            self.reached.push(milestone);
            debug!(milestone, percentage, "Scroll milestone reached");
            self.dispatcher.track_scroll_depth(milestone, &self.scope);
        }
    }

    /// Report time on page as the page is about to unload
    pub fn handle_before_unload(&mut self) {
        self.report_final();
    }

    /// Report time on page if not yet reported and release host subscriptions
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.report_final();

        for id in self.subscriptions.drain(..) {
            self.dispatcher.host().unsubscribe(id);
        }
        self.stopped = true;
        debug!(page_type = %self.options.page_type, "Page tracking stopped");
    }

    /// Call-to-action click on this page
    pub fn track_cta_click(&self, cta_name: &str, destination: &str) {
        self.dispatcher
            .track_cta_click(cta_name, destination, &self.scope);
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Started and not yet stopped
    pub fn is_active(&self) -> bool {
        self.started_at.is_some() && !self.stopped
    }

    /// Highest milestone reached so far, 0 if none
    pub fn max_scroll_depth(&self) -> u8 {
        self.reached.iter().copied().max().unwrap_or(0)
    }

    /// Milestones reached, in the order they fired
    pub fn milestones_reached(&self) -> &[u8] {
        &self.reached
    }

    /// Scope used for this page's events, including its page context
    pub fn scope(&self) -> &TrackingScope {
        &self.scope
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    fn report_final(&mut self) {
        if self.reported {
            return;
        }
        let Some(started_at) = self.started_at else {
            return;
        };
        self.reported = true;

        let seconds = elapsed_seconds(started_at, self.dispatcher.clock().now());
        let max_depth = self.max_scroll_depth();
        self.dispatcher
            .track_time_on_page(seconds, max_depth, &self.scope);

        if max_depth == 0 {
            if let Some(funnel_id) = &self.options.funnel_id {
                self.dispatcher
                    .track_funnel_drop_off(funnel_id, names::REASON_NO_ENGAGEMENT);
            }
        }
    }
}

impl Drop for PageTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadtrail_core::{ManualClock, RecordingSink, SimulatedHost};

    struct Harness {
        sink: Arc<RecordingSink>,
        host: Arc<SimulatedHost>,
        clock: ManualClock,
        dispatcher: EventDispatcher,
    }

    fn harness() -> Harness {
        let sink = Arc::new(RecordingSink::new());
        let host = Arc::new(SimulatedHost::with_page("/programs/msds", 1000.0, 10_000.0));
        let clock = ManualClock::default();
        let dispatcher = EventDispatcher::new(sink.clone())
            .with_host(host.clone())
            .with_clock(Arc::new(clock.clone()));
        Harness {
            sink,
            host,
            clock,
            dispatcher,
        }
    }

    #[test]
    fn test_start_fires_page_view_once() {
        let h = harness();
        let mut tracker = PageTracker::new(
            PageOptions::new("program_page").with_program_code("MSDS"),
            h.dispatcher.clone(),
        );

        tracker.start();
        tracker.start();

        let views = h.sink.named("program_page_view");
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].str_property("program_code"), Some("MSDS"));
        assert_eq!(views[0].str_property("page_path"), Some("/programs/msds"));
        assert_eq!(views[0].str_property("page_name"), Some("program_page"));
    }

    #[test]
    fn test_scroll_milestones_fire_once_each() {
        let h = harness();
        let mut tracker = PageTracker::new(PageOptions::new("program_page"), h.dispatcher.clone());
        tracker.start();

        h.host.scroll_to_percent(60.0);
        tracker.handle_scroll();
        h.host.scroll_to_percent(30.0);
        tracker.handle_scroll();
        h.host.scroll_to_percent(80.0);
        tracker.handle_scroll();

        let depths: Vec<i64> = h
            .sink
            .named("scroll_depth")
            .iter()
            .filter_map(|e| e.int_property("scroll_percentage"))
            .collect();
        assert_eq!(depths, vec![25, 50, 75]);
        assert_eq!(tracker.max_scroll_depth(), 75);
    }

    #[test]
    fn test_scroll_before_start_is_ignored() {
        let h = harness();
        let mut tracker = PageTracker::new(PageOptions::new("program_page"), h.dispatcher.clone());

        h.host.scroll_to_percent(100.0);
        tracker.handle_scroll();

        assert!(h.sink.events().is_empty());
    }

    #[test]
    fn test_time_on_page_reported_once() {
        let h = harness();
        let mut tracker = PageTracker::new(PageOptions::new("program_page"), h.dispatcher.clone());
        tracker.start();

        h.host.scroll_to_percent(55.0);
        tracker.handle_scroll();
        h.clock.advance_secs(42);
        tracker.handle_before_unload();
        h.clock.advance_secs(5);
        tracker.stop();

        let reports = h.sink.named("time_on_page");
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].int_property("time_seconds"), Some(42));
        assert_eq!(reports[0].int_property("max_scroll_depth"), Some(50));
    }

    #[test]
    fn test_drop_off_without_engagement() {
        let h = harness();
        let mut tracker = PageTracker::new(
            PageOptions::new("program_page").with_funnel("rfi_form_completion"),
            h.dispatcher.clone(),
        );
        tracker.start();
        tracker.stop();

        let drops = h.sink.named("funnel_drop_off");
        assert_eq!(drops.len(), 1);
        assert_eq!(drops[0].str_property("funnel_id"), Some("rfi_form_completion"));
        assert_eq!(drops[0].str_property("reason"), Some("no_engagement"));
    }

    #[test]
    fn test_no_drop_off_after_engagement() {
        let h = harness();
        let mut tracker = PageTracker::new(
            PageOptions::new("program_page").with_funnel("rfi_form_completion"),
            h.dispatcher.clone(),
        );
        tracker.start();
        h.host.scroll_to_percent(26.0);
        tracker.handle_scroll();
        tracker.stop();

        assert!(h.sink.named("funnel_drop_off").is_empty());
    }

    #[test]
    fn test_stop_releases_subscriptions() {
        let h = harness();
        let mut tracker = PageTracker::new(PageOptions::new("program_page"), h.dispatcher.clone());
        tracker.start();
        assert_eq!(h.host.active_subscriptions_of(HostEventKind::Scroll), 1);
        assert_eq!(h.host.active_subscriptions_of(HostEventKind::BeforeUnload), 1);

        tracker.stop();
        assert_eq!(h.host.active_subscriptions(), 0);
        assert_eq!(tracker.subscription_count(), 0);
    }

    #[test]
    fn test_drop_stops_tracker() {
        let h = harness();
        {
            let mut tracker =
                PageTracker::new(PageOptions::new("program_page"), h.dispatcher.clone());
            tracker.start();
        }

        assert_eq!(h.host.active_subscriptions(), 0);
        assert_eq!(h.sink.named("time_on_page").len(), 1);
    }

    #[test]
    fn test_milestone_options_are_normalized() {
        let options = PageOptions::new("blog_post").with_milestones([90, 0, 10, 90, 150, 50]);
        assert_eq!(options.milestones, vec![10, 50, 90]);
    }

    #[test]
    fn test_additional_data_wins_over_scope() {
        let h = harness();
        let scope = TrackingScope::new().with_page(PageContext::new("blog_post", "Career Guide"));
        let mut tracker = PageTracker::new(
            PageOptions::new("blog_post")
                .with_scope(scope)
                .with_property("page_name", "Override")
                .with_property("author", "staff"),
            h.dispatcher.clone(),
        );
        tracker.start();

        let view = h.sink.last().unwrap();
        assert_eq!(view.name, "blog_post_view");
        assert_eq!(view.str_property("page_name"), Some("Override"));
        assert_eq!(view.str_property("author"), Some("staff"));
        assert_eq!(tracker.scope().page().map(|p| p.page_name.as_str()), Some("Career Guide"));
    }
}
