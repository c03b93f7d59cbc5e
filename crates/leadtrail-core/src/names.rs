//! Canonical event and property names
//!
//! Pages and forms never spell event names themselves; they go through the
//! dispatcher and trackers, which take their names from here. Funnel stage
//! tables reference the same strings.

// --- Page events ---

/// Generic page view, used when no page context is in scope
pub const PAGE_VIEW: &str = "page_view";
/// Suffix appended to a page type to build its view event (`program_page_view`)
pub const PAGE_VIEW_SUFFIX: &str = "_view";
/// A scroll milestone was crossed
pub const SCROLL_DEPTH: &str = "scroll_depth";
/// Final dwell time report for a page
pub const TIME_ON_PAGE: &str = "time_on_page";
/// Call-to-action click
pub const CTA_CLICK: &str = "cta_click";
/// Business conversion reached
pub const CONVERSION: &str = "conversion";
/// A tracked sequence ended before reaching a later funnel stage
pub const FUNNEL_DROP_OFF: &str = "funnel_drop_off";

// --- Form events ---

/// Form became visible
pub const FORM_VIEW: &str = "form_view";
/// First field focused
pub const FORM_START: &str = "form_start";
/// A field was filled in
pub const FORM_FIELD_COMPLETED: &str = "form_field_completed";
/// Email plus at least one more field completed
pub const FORM_PERSONAL_INFO_COMPLETED: &str = "form_personal_info_completed";
/// Phone plus at least three more fields completed
pub const FORM_CONTACT_INFO_COMPLETED: &str = "form_contact_info_completed";
/// Form submitted
pub const FORM_SUBMIT: &str = "form_submit";
/// Validation or submission error shown to the user
pub const FORM_ERROR: &str = "form_error";
/// Form started but left without submitting
pub const FORM_ABANDON: &str = "form_abandon";

// --- Property keys ---

pub mod props {
    pub const PAGE_PATH: &str = "page_path";
    pub const PAGE_TYPE: &str = "page_type";
    pub const PAGE_NAME: &str = "page_name";
    pub const PROGRAM_CODE: &str = "program_code";
    pub const PROGRAM_NAME: &str = "program_name";
    pub const PROGRAM_TYPE: &str = "program_type";
    pub const SCROLL_PERCENTAGE: &str = "scroll_percentage";
    pub const MAX_SCROLL_DEPTH: &str = "max_scroll_depth";
    pub const TIME_SECONDS: &str = "time_seconds";
    pub const FUNNEL_ID: &str = "funnel_id";
    pub const REASON: &str = "reason";
    pub const CTA_NAME: &str = "cta_name";
    pub const DESTINATION: &str = "destination";
    pub const CONVERSION_VALUE: &str = "conversion_value";
    pub const FORM_NAME: &str = "form_name";
    pub const SOURCE_PAGE: &str = "source_page";
    pub const FIELD_NAME: &str = "field_name";
    pub const FIELDS_COMPLETED_COUNT: &str = "fields_completed_count";
    pub const TIME_TO_COMPLETE_SECONDS: &str = "time_to_complete_seconds";
    pub const TIME_SPENT_SECONDS: &str = "time_spent_seconds";
    pub const LAST_FIELD: &str = "last_field";
    pub const ERROR_TYPE: &str = "error_type";
}

// --- Drop-off reasons ---

/// Page left without reaching the first scroll milestone
pub const REASON_NO_ENGAGEMENT: &str = "no_engagement";
/// Form started and left unsubmitted
pub const REASON_FORM_ABANDONED: &str = "form_abandoned";

/// Build the view event name for a page type
pub fn page_view_event(page_type: &str) -> String {
    if page_type.is_empty() {
        PAGE_VIEW.to_string()
    } else {
        format!("{}{}", page_type, PAGE_VIEW_SUFFIX)
    }
}
