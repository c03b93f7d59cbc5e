//! Event dispatcher
//!
//! The single path from a tracking call site to the analytics sink. The
//! dispatcher stamps and enriches events, echoes them in development builds,
//! and forwards them. It never fails: a missing or broken sink only produces
//! a log line.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    clock::{Clock, SystemClock},
    context::TrackingScope,
    event::{Event, Properties, PropertyValue},
    host::{HeadlessHost, Host},
    names::{self, props},
    sink::{AnalyticsSink, NoopSink},
};

/// Enriches and forwards analytics events
///
/// Cloning is cheap; clones share the sink, host and clock.
#[derive(Clone)]
pub struct EventDispatcher {
    sink: Arc<dyn AnalyticsSink>,
    host: Arc<dyn Host>,
    clock: Arc<dyn Clock>,
    development: bool,
}

impl EventDispatcher {
    /// Create a dispatcher forwarding to `sink`, with no host and the system clock
    pub fn new(sink: Arc<dyn AnalyticsSink>) -> Self {
        Self {
            sink,
            host: Arc::new(HeadlessHost),
            clock: Arc::new(SystemClock),
            development: false,
        }
    }

    /// Dispatcher for environments without any analytics sink
    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopSink))
    }

    /// Use `host` for the implicit page path
    pub fn with_host(mut self, host: Arc<dyn Host>) -> Self {
        self.host = host;
        self
    }

    /// Use `clock` for event timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Echo every event through the log
    pub fn with_development(mut self, development: bool) -> Self {
        self.development = development;
        self
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn is_development(&self) -> bool {
        self.development
    }

    /// Forward a named event
    ///
    /// Attaches `page_path` from the host unless the caller set one. No
    /// deduplication happens here.
    pub fn track_event(&self, name: &str, mut properties: Properties) {
        if name.is_empty() {
            debug!("Dropping event with empty name");
            return;
        }

        if !properties.contains_key(props::PAGE_PATH) {
            if let Some(path) = self.host.page_path() {
                properties.insert(props::PAGE_PATH.to_string(), PropertyValue::from(path));
            }
        }

        let event = Event::new(name, properties, self.clock.now());

        if self.development {
            info!(target: "leadtrail::analytics", "[analytics] {}", event.description());
        }

        match self.sink.event(&event) {
            Ok(()) => debug!(event = %event.name, "Event dispatched"),
            Err(e) => warn!(event = %event.name, error = %e, "Analytics sink rejected event"),
        }
    }

    /// Page view for the scope's page (`<page_type>_view`, or `page_view`)
    pub fn track_page_view(&self, scope: &TrackingScope, extra: Properties) {
        let name = scope
            .page()
            .map(|page| names::page_view_event(&page.page_type))
            .unwrap_or_else(|| names::PAGE_VIEW.to_string());

        let mut properties = extra;
        scope.enrich(&mut properties);
        self.track_event(&name, properties);
    }

    /// A scroll milestone was crossed
    pub fn track_scroll_depth(&self, milestone: u8, scope: &TrackingScope) {
        let mut properties = Properties::new();
        properties.insert(props::SCROLL_PERCENTAGE.to_string(), milestone.into());
        scope.enrich(&mut properties);
        self.track_event(names::SCROLL_DEPTH, properties);
    }

    /// Final dwell time for a page
    pub fn track_time_on_page(&self, seconds: u64, max_scroll_depth: u8, scope: &TrackingScope) {
        let mut properties = Properties::new();
        properties.insert(props::TIME_SECONDS.to_string(), seconds.into());
        properties.insert(props::MAX_SCROLL_DEPTH.to_string(), max_scroll_depth.into());
        scope.enrich(&mut properties);
        self.track_event(names::TIME_ON_PAGE, properties);
    }

    /// A tracked sequence ended before reaching a later stage of `funnel_id`
    pub fn track_funnel_drop_off(&self, funnel_id: &str, reason: &str) {
        let mut properties = Properties::new();
        properties.insert(props::FUNNEL_ID.to_string(), funnel_id.into());
        properties.insert(props::REASON.to_string(), reason.into());
        self.track_event(names::FUNNEL_DROP_OFF, properties);
    }

    /// Call-to-action click
    pub fn track_cta_click(&self, cta_name: &str, destination: &str, scope: &TrackingScope) {
        let mut properties = Properties::new();
        properties.insert(props::CTA_NAME.to_string(), cta_name.into());
        properties.insert(props::DESTINATION.to_string(), destination.into());
        scope.enrich(&mut properties);
        self.track_event(names::CTA_CLICK, properties);
    }

    /// Business conversion, tagged with the funnel's conversion value
    pub fn track_conversion(&self, conversion_value: &str, scope: &TrackingScope) {
        let mut properties = Properties::new();
        properties.insert(props::CONVERSION_VALUE.to_string(), conversion_value.into());
        scope.enrich(&mut properties);
        self.track_event(names::CONVERSION, properties);
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("development", &self.development)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::{PageContext, ProgramContext, ProgramType},
        error::{SinkError, SinkResult},
        host::SimulatedHost,
        props,
        sink::RecordingSink,
    };

    struct FailingSink;

    impl AnalyticsSink for FailingSink {
        fn event(&self, _event: &Event) -> SinkResult<()> {
            Err(SinkError::Transport("connection refused".to_string()))
        }
    }

    fn recording() -> (Arc<RecordingSink>, EventDispatcher) {
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = EventDispatcher::new(sink.clone());
        (sink, dispatcher)
    }

    #[test]
    fn test_track_event_forwards_name_and_properties() {
        let (sink, dispatcher) = recording();
        dispatcher.track_event("cta_click", props! { "cta_name" => "apply" });

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "cta_click");
        assert_eq!(events[0].str_property("cta_name"), Some("apply"));
    }

    #[test]
    fn test_track_event_attaches_page_path() {
        let (sink, dispatcher) = recording();
        let host = Arc::new(SimulatedHost::new());
        host.set_page_path("/programs/msds");
        let dispatcher = dispatcher.with_host(host);

        dispatcher.track_event("cta_click", Properties::new());
        assert_eq!(sink.events()[0].str_property("page_path"), Some("/programs/msds"));
    }

    #[test]
    fn test_caller_page_path_wins() {
        let (sink, dispatcher) = recording();
        let host = Arc::new(SimulatedHost::new());
        host.set_page_path("/from-host");
        let dispatcher = dispatcher.with_host(host);

        dispatcher.track_event("cta_click", props! { "page_path" => "/explicit" });
        assert_eq!(sink.events()[0].str_property("page_path"), Some("/explicit"));
    }

    #[test]
    fn test_headless_dispatch_has_no_page_path() {
        let (sink, dispatcher) = recording();
        dispatcher.track_event("cta_click", Properties::new());
        assert!(sink.events()[0].property("page_path").is_none());
    }

    #[test]
    fn test_no_deduplication() {
        let (sink, dispatcher) = recording();
        dispatcher.track_event("cta_click", Properties::new());
        dispatcher.track_event("cta_click", Properties::new());
        assert_eq!(sink.count("cta_click"), 2);
    }

    #[test]
    fn test_empty_name_is_dropped() {
        let (sink, dispatcher) = recording();
        dispatcher.track_event("", Properties::new());
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_sink_failure_is_swallowed() {
        let dispatcher = EventDispatcher::new(Arc::new(FailingSink)).with_development(true);
        dispatcher.track_event("form_submit", Properties::new());
    }

    #[test]
    fn test_disabled_dispatcher_is_silent() {
        let dispatcher = EventDispatcher::disabled();
        dispatcher.track_page_view(&TrackingScope::new(), Properties::new());
        dispatcher.track_funnel_drop_off("rfi_form_completion", "no_engagement");
    }

    #[test]
    fn test_page_view_name_follows_page_type() {
        let (sink, dispatcher) = recording();
        let scope = TrackingScope::new()
            .with_program(ProgramContext::new("MSDS", "MS in Data Science", ProgramType::Degree))
            .with_page(PageContext::new("program_page", "Data Science"));

        dispatcher.track_page_view(&scope, Properties::new());
        dispatcher.track_page_view(&TrackingScope::new(), Properties::new());

        let events = sink.events();
        assert_eq!(events[0].name, "program_page_view");
        assert_eq!(events[0].str_property("program_code"), Some("MSDS"));
        assert_eq!(events[1].name, "page_view");
        assert!(events[1].property("program_code").is_none());
    }

    #[test]
    fn test_derived_event_shapes() {
        let (sink, dispatcher) = recording();
        let scope = TrackingScope::new();

        dispatcher.track_scroll_depth(50, &scope);
        dispatcher.track_time_on_page(95, 75, &scope);
        dispatcher.track_funnel_drop_off("blog_to_lead", "no_engagement");
        dispatcher.track_cta_click("request_info", "/rfi", &scope);
        dispatcher.track_conversion("rfi_lead", &scope);

        let events = sink.events();
        assert_eq!(events[0].name, "scroll_depth");
        assert_eq!(events[0].int_property("scroll_percentage"), Some(50));
        assert_eq!(events[1].name, "time_on_page");
        assert_eq!(events[1].int_property("time_seconds"), Some(95));
        assert_eq!(events[1].int_property("max_scroll_depth"), Some(75));
        assert_eq!(events[2].name, "funnel_drop_off");
        assert_eq!(events[2].str_property("funnel_id"), Some("blog_to_lead"));
        assert_eq!(events[2].str_property("reason"), Some("no_engagement"));
        assert_eq!(events[3].str_property("destination"), Some("/rfi"));
        assert_eq!(events[4].str_property("conversion_value"), Some("rfi_lead"));
    }
}
