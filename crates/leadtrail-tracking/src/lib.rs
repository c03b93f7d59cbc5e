//! Leadtrail page and form trackers
//!
//! Lifecycle-bound trackers that turn host notifications and user
//! interactions into analytics events through an
//! [`EventDispatcher`](leadtrail_core::EventDispatcher).
//!
//! - [`PageTracker`]: page view, scroll milestones, time on page
//! - [`FormTracker`]: form view, start, field progress, submit, error, abandon
//!
//! Both trackers are idempotent where it matters (one page view, one start,
//! one abandonment) and degrade to no-ops when the host has no document.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use leadtrail_core::{EventDispatcher, RecordingSink};
//! use leadtrail_tracking::{FormOptions, FormTracker, PageOptions, PageTracker};
//!
//! let dispatcher = EventDispatcher::new(Arc::new(RecordingSink::new()));
//!
//! let mut page = PageTracker::new(PageOptions::new("program_page"), dispatcher.clone());
//! page.start();
//!
//! let form = FormTracker::new(FormOptions::new("rfi"), dispatcher);
//! let email = form.field_props("email");
//! email.on_focus();
//! email.on_blur("jane@example.com");
//! form.form_props().on_submit();
//! ```

pub mod form;
pub mod page;

pub use form::{FieldProps, FormOptions, FormProps, FormState, FormTracker};
pub use page::{PageOptions, PageTracker, DEFAULT_MILESTONES};
