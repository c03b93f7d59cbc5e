//! Leadtrail core: event dispatch and journey context
//!
//! This crate holds everything a page or form needs to emit analytics events
//! without knowing where they end up.
//!
//! # Architecture
//!
//! 1. **Events** (`event`, `names`): immutable named records with primitive properties
//! 2. **Sinks** (`sink`): one-way delivery to an external analytics backend
//! 3. **Dispatcher** (`dispatcher`): enriches events and forwards them, never failing
//! 4. **Context** (`context`): program and page identity threaded through a scope value
//! 5. **Host** (`host`, `clock`): the browser environment and time, both optional
//! 6. **Attribution** (`attribution`): first-touch and last-touch marketing parameters
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use leadtrail_core::{EventDispatcher, PageContext, Properties, RecordingSink, TrackingScope};
//!
//! let sink = Arc::new(RecordingSink::new());
//! let dispatcher = EventDispatcher::new(sink.clone());
//!
//! let scope = TrackingScope::new().with_page(PageContext::new("program_page", "MS Data Science"));
//! dispatcher.track_page_view(&scope, Properties::new());
//!
//! assert_eq!(sink.names(), vec!["program_page_view"]);
//! ```
//!
//! # Error Handling
//!
//! Tracking is best-effort. Operations on the dispatcher return `()`; sink
//! failures are logged and dropped so tracking can never break a page.

pub mod attribution;
pub mod clock;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod host;
pub mod names;
pub mod sink;

pub use attribution::{Attribution, AttributionStore, SessionAttribution};
pub use clock::{elapsed_seconds, Clock, ManualClock, SystemClock};
pub use context::{PageContext, ProgramContext, ProgramType, TrackingScope};
pub use dispatcher::EventDispatcher;
pub use error::{SinkError, SinkResult};
pub use event::{Event, Properties, PropertyValue};
pub use host::{HeadlessHost, Host, HostEventKind, ScrollMetrics, SimulatedHost, SubscriptionId};
pub use sink::{
    AnalyticsSink, ConsoleSink, FanoutSink, HttpSink, HttpSinkConfig, NoopSink, RecordingSink,
};
