//! Property-based tests for event dispatch and context enrichment

use std::sync::Arc;

use leadtrail_core::*;
use proptest::prelude::*;

fn event_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{2,30}".prop_map(|s| s.to_string())
}

fn program_strategy() -> impl Strategy<Value = ProgramContext> {
    (
        "[A-Z]{2,6}",
        "[A-Za-z ]{3,30}",
        prop_oneof![
            Just(ProgramType::Degree),
            Just(ProgramType::Certificate),
            Just(ProgramType::Bootcamp),
            Just(ProgramType::Course),
        ],
    )
        .prop_map(|(code, name, kind)| ProgramContext::new(code, name, kind))
}

proptest! {
    /// Every dispatched event reaches the sink once, unchanged in name
    #[test]
    fn prop_dispatch_forwards_every_event(names in prop::collection::vec(event_name_strategy(), 1..20)) {
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = EventDispatcher::new(sink.clone());

        for name in &names {
            dispatcher.track_event(name, Properties::new());
        }

        prop_assert_eq!(sink.names(), names);
    }

    /// Enrichment adds all program dimensions and never clobbers caller keys
    #[test]
    fn prop_enrich_preserves_caller_properties(program in program_strategy(), value in "[a-z]{1,10}") {
        let scope = TrackingScope::new().with_program(program.clone());
        let mut properties = Properties::new();
        properties.insert("program_name".to_string(), PropertyValue::from(value.clone()));

        scope.enrich(&mut properties);

        prop_assert_eq!(properties["program_name"].as_str(), Some(value.as_str()));
        prop_assert_eq!(properties["program_code"].as_str(), Some(program.program_code.as_str()));
        prop_assert_eq!(properties["program_type"].as_str(), Some(program.program_type.as_str()));
    }

    /// Scroll percentage is monotonic in scroll position
    #[test]
    fn prop_scroll_percentage_monotonic(
        viewport in 100.0f64..2000.0,
        document in 100.0f64..20000.0,
        a in 0.0f64..20000.0,
        b in 0.0f64..20000.0,
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let p_low = ScrollMetrics::new(low, viewport, document).scroll_percentage().unwrap();
        let p_high = ScrollMetrics::new(high, viewport, document).scroll_percentage().unwrap();
        prop_assert!(p_low <= p_high);
    }
}

#[test]
fn test_dispatcher_uses_clock_for_timestamps() {
    let sink = Arc::new(RecordingSink::new());
    let clock = Arc::new(ManualClock::default());
    let dispatcher = EventDispatcher::new(sink.clone()).with_clock(clock.clone());

    dispatcher.track_event("page_view", Properties::new());
    clock.advance_secs(30);
    dispatcher.track_event("time_on_page", Properties::new());

    let events = sink.events();
    assert_eq!(elapsed_seconds(events[0].timestamp, events[1].timestamp), 30);
}

#[test]
fn test_events_serialize_for_the_collector() {
    let sink = Arc::new(RecordingSink::new());
    let dispatcher = EventDispatcher::new(sink.clone());
    dispatcher.track_scroll_depth(25, &TrackingScope::new());

    let json = serde_json::to_value(sink.last().unwrap()).unwrap();
    assert_eq!(json["name"], "scroll_depth");
    assert_eq!(json["properties"]["scroll_percentage"], 25);
    assert!(json["timestamp"].is_string());
    assert!(json["id"].is_string());
}
