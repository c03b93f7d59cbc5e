//! Form lifecycle tracking
//!
//! A [`FormTracker`] follows one form from first view to submission or
//! abandonment:
//!
//! ```text
//! Idle --focus--> Started --submit--> Submitting --> Submitted
//!                    |                    ^
//!                    +--error--> Error ---+
//! ```
//!
//! Submission is accepted from `Idle`, `Started` and `Error`. Stopping the
//! tracker in `Started` or `Error` reports an abandonment.

use std::collections::BTreeSet;
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use leadtrail_core::{
    elapsed_seconds,
    names::{self, props},
    EventDispatcher, Properties, PropertyValue, TrackingScope,
};

/// Fields that must be present for the personal-info milestone
const PERSONAL_INFO_FIELD: &str = "email";
const PERSONAL_INFO_MIN_FIELDS: usize = 2;

/// Fields that must be present for the contact-info milestone
const CONTACT_INFO_FIELD: &str = "phone";
const CONTACT_INFO_MIN_FIELDS: usize = 4;

/// Where a form is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormState {
    Idle,
    Started,
    Error,
    Submitting,
    Submitted,
}

impl FormState {
    /// Leaving the form in this state counts as an abandonment
    pub fn is_in_progress(&self) -> bool {
        matches!(self, FormState::Started | FormState::Error)
    }

    fn accepts_submit(&self) -> bool {
        matches!(self, FormState::Idle | FormState::Started | FormState::Error)
    }
}

/// What a form tracker reports about
#[derive(Debug, Clone)]
pub struct FormOptions {
    pub form_name: String,
    pub program_code: Option<String>,
    /// Page the form is embedded in
    pub source_page: Option<String>,
    pub scope: TrackingScope,
    /// Funnel to report a drop-off against when the form is abandoned
    pub funnel_id: Option<String>,
}

impl FormOptions {
    pub fn new(form_name: impl Into<String>) -> Self {
        Self {
            form_name: form_name.into(),
            program_code: None,
            source_page: None,
            scope: TrackingScope::new(),
            funnel_id: None,
        }
    }

    pub fn with_program_code(mut self, program_code: impl Into<String>) -> Self {
        self.program_code = Some(program_code.into());
        self
    }

    pub fn with_source_page(mut self, source_page: impl Into<String>) -> Self {
        self.source_page = Some(source_page.into());
        self
    }

    pub fn with_scope(mut self, scope: TrackingScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_funnel(mut self, funnel_id: impl Into<String>) -> Self {
        self.funnel_id = Some(funnel_id.into());
        self
    }
}

#[derive(Debug)]
struct FormInner {
    options: FormOptions,
    dispatcher: EventDispatcher,
    state: FormState,
    completed: BTreeSet<String>,
    last_field: Option<String>,
    started_at: Option<DateTime<Utc>>,
    viewed: bool,
    personal_info_reported: bool,
    contact_info_reported: bool,
    stopped: bool,
}

impl FormInner {
    fn properties(&self) -> Properties {
        let mut properties = Properties::new();
        properties.insert(
            props::FORM_NAME.to_string(),
            PropertyValue::from(self.options.form_name.as_str()),
        );
        if let Some(code) = &self.options.program_code {
            properties.insert(props::PROGRAM_CODE.to_string(), code.as_str().into());
        }
        if let Some(page) = &self.options.source_page {
            properties.insert(props::SOURCE_PAGE.to_string(), page.as_str().into());
        }
        self.options.scope.enrich(&mut properties);
        properties
    }

    fn emit(&self, name: &str, extra: Properties) {
        let mut properties = self.properties();
        properties.extend(extra);
        self.dispatcher.track_event(name, properties);
    }

    fn seconds_since_start(&self) -> u64 {
        self.started_at
            .map(|start| elapsed_seconds(start, self.dispatcher.clock().now()))
            .unwrap_or(0)
    }

    fn view(&mut self) {
        if self.viewed || self.stopped {
            return;
        }
        self.viewed = true;
        self.emit(names::FORM_VIEW, Properties::new());
    }

    fn start(&mut self, field: &str) {
        if self.stopped {
            return;
        }
        if self.state != FormState::Idle {
            if self.state.is_in_progress() {
                self.last_field = Some(field.to_string());
            }
            return;
        }

        self.state = FormState::Started;
        self.started_at = Some(self.dispatcher.clock().now());
        self.last_field = Some(field.to_string());
        debug!(form = %self.options.form_name, field, "Form started");

        let mut extra = Properties::new();
        extra.insert(props::FIELD_NAME.to_string(), field.into());
        self.emit(names::FORM_START, extra);
    }

    fn complete_field(&mut self, field: &str) {
        if self.stopped || matches!(self.state, FormState::Submitting | FormState::Submitted) {
            return;
        }
        if !self.completed.insert(field.to_string()) {
            return;
        }
        self.last_field = Some(field.to_string());

        let mut extra = Properties::new();
        extra.insert(props::FIELD_NAME.to_string(), field.into());
        extra.insert(
            props::FIELDS_COMPLETED_COUNT.to_string(),
            self.completed.len().into(),
        );
        self.emit(names::FORM_FIELD_COMPLETED, extra);

        let count = self.completed.len();
        if !self.personal_info_reported
            && self.completed.contains(PERSONAL_INFO_FIELD)
            && count >= PERSONAL_INFO_MIN_FIELDS
        {
            self.personal_info_reported = true;
            self.emit(names::FORM_PERSONAL_INFO_COMPLETED, self.count_properties());
        }
        if !self.contact_info_reported
            && self.completed.contains(CONTACT_INFO_FIELD)
            && count >= CONTACT_INFO_MIN_FIELDS
        {
            self.contact_info_reported = true;
            self.emit(names::FORM_CONTACT_INFO_COMPLETED, self.count_properties());
        }
    }

    fn submit(&mut self) {
        if self.stopped || !self.state.accepts_submit() {
            return;
        }
        self.state = FormState::Submitting;

        let mut extra = self.count_properties();
        extra.insert(
            props::TIME_TO_COMPLETE_SECONDS.to_string(),
            self.seconds_since_start().into(),
        );
        self.emit(names::FORM_SUBMIT, extra);

        self.state = FormState::Submitted;
        debug!(form = %self.options.form_name, fields = self.completed.len(), "Form submitted");
    }

    fn error(&mut self, error_type: &str, field: Option<&str>) {
        if self.stopped {
            return;
        }
        if self.state == FormState::Started {
            self.state = FormState::Error;
        }

        let mut extra = Properties::new();
        extra.insert(props::ERROR_TYPE.to_string(), error_type.into());
        if let Some(field) = field {
            extra.insert(props::FIELD_NAME.to_string(), field.into());
        }
        self.emit(names::FORM_ERROR, extra);
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        if !self.state.is_in_progress() {
            return;
        }

        let mut extra = self.count_properties();
        extra.insert(
            props::TIME_SPENT_SECONDS.to_string(),
            self.seconds_since_start().into(),
        );
        if let Some(field) = &self.last_field {
            extra.insert(props::LAST_FIELD.to_string(), field.as_str().into());
        }
        debug!(form = %self.options.form_name, state = ?self.state, "Form abandoned");
        self.emit(names::FORM_ABANDON, extra);

        if let Some(funnel_id) = &self.options.funnel_id {
            self.dispatcher
                .track_funnel_drop_off(funnel_id, names::REASON_FORM_ABANDONED);
        }
    }

    fn count_properties(&self) -> Properties {
        let mut properties = Properties::new();
        properties.insert(
            props::FIELDS_COMPLETED_COUNT.to_string(),
            self.completed.len().into(),
        );
        properties
    }
}

/// Tracks the lifecycle of one form
///
/// Field and form handles share the tracker's state weakly: once the tracker
/// is stopped or dropped they do nothing. Dropping a tracker stops it.
#[derive(Debug)]
pub struct FormTracker {
    inner: Arc<Mutex<FormInner>>,
}

impl FormTracker {
    /// Host and clock come from the dispatcher
    pub fn new(options: FormOptions, dispatcher: EventDispatcher) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FormInner {
                options,
                dispatcher,
                state: FormState::Idle,
                completed: BTreeSet::new(),
                last_field: None,
                started_at: None,
                viewed: false,
                personal_info_reported: false,
                contact_info_reported: false,
                stopped: false,
            })),
        }
    }

    /// Fire `form_view`, once
    pub fn start(&self) {
        self.inner.lock().view();
    }

    /// First interaction with the form
    ///
    /// Only the first call fires `form_start`; later calls update the last
    /// touched field.
    pub fn track_form_start(&self, field: &str) {
        self.inner.lock().start(field);
    }

    /// A field was filled in; repeated completions of a field are ignored
    pub fn track_field_completed(&self, field: &str) {
        self.inner.lock().complete_field(field);
    }

    /// The form was submitted; only the first submission is reported
    pub fn track_form_submit(&self) {
        self.inner.lock().submit();
    }

    /// A validation or submission error was shown
    pub fn track_form_error(&self, error_type: &str, field: Option<&str>) {
        self.inner.lock().error(error_type, field);
    }

    /// Report abandonment if the form was left in progress
    pub fn stop(&self) {
        self.inner.lock().stop();
    }

    /// Handle for one input field
    pub fn field_props(&self, field: impl Into<String>) -> FieldProps {
        FieldProps {
            field: field.into(),
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Handle for the form element
    pub fn form_props(&self) -> FormProps {
        FormProps {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn state(&self) -> FormState {
        self.inner.lock().state
    }

    /// Completed fields, sorted
    pub fn fields_completed(&self) -> Vec<String> {
        self.inner.lock().completed.iter().cloned().collect()
    }

    pub fn last_field(&self) -> Option<String> {
        self.inner.lock().last_field.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.lock().stopped
    }
}

impl Drop for FormTracker {
    fn drop(&mut self) {
        self.inner.lock().stop();
    }
}

/// Event handlers for one input field
#[derive(Debug, Clone)]
pub struct FieldProps {
    field: String,
    inner: Weak<Mutex<FormInner>>,
}

impl FieldProps {
    pub fn name(&self) -> &str {
        &self.field
    }

    /// Field received focus
    pub fn on_focus(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().start(&self.field);
        }
    }

    /// Field lost focus holding `value`; blank values do not complete it
    pub fn on_blur(&self, value: &str) {
        if value.trim().is_empty() {
            return;
        }
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().complete_field(&self.field);
        }
    }
}

/// Event handlers for the form element
#[derive(Debug, Clone)]
pub struct FormProps {
    inner: Weak<Mutex<FormInner>>,
}

impl FormProps {
    pub fn on_submit(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().submit();
        }
    }
}
