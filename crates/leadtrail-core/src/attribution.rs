//! Marketing attribution capture
//!
//! Reads campaign parameters from landing URLs and keeps first-touch and
//! last-touch records for a visitor session. The flattened properties are
//! merged into the first page view of the session only.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::event::{Properties, PropertyValue};

/// Campaign parameters read from a single landing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    pub term: Option<String>,
    pub content: Option<String>,
    pub gclid: Option<String>,
    pub fbclid: Option<String>,
    pub referrer: Option<String>,
    pub landing_page: Option<String>,
}

impl Attribution {
    /// Parse campaign parameters from a full URL
    ///
    /// Malformed URLs give an empty attribution.
    pub fn from_url(url: &str) -> Self {
        let Ok(parsed) = Url::parse(url) else {
            return Self::default();
        };

        let mut attribution = Self {
            landing_page: Some(parsed.path().to_string()),
            ..Self::default()
        };

        for (key, value) in parsed.query_pairs() {
            if value.is_empty() {
                continue;
            }
            let value = Some(value.into_owned());
            match key.as_ref() {
                "utm_source" => attribution.source = value,
                "utm_medium" => attribution.medium = value,
                "utm_campaign" => attribution.campaign = value,
                "utm_term" => attribution.term = value,
                "utm_content" => attribution.content = value,
                "gclid" => attribution.gclid = value,
                "fbclid" => attribution.fbclid = value,
                _ => {}
            }
        }

        attribution
    }

    /// Attach the document referrer, ignoring empty strings
    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        let referrer = referrer.into();
        if !referrer.is_empty() {
            self.referrer = Some(referrer);
        }
        self
    }

    /// True when the landing carried no campaign signal at all
    pub fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.medium.is_none()
            && self.campaign.is_none()
            && self.term.is_none()
            && self.content.is_none()
            && self.gclid.is_none()
            && self.fbclid.is_none()
            && self.referrer.is_none()
    }

    /// Flatten into properties named `<prefix><field>`
    pub fn to_properties(&self, prefix: &str) -> Properties {
        let fields = [
            ("source", &self.source),
            ("medium", &self.medium),
            ("campaign", &self.campaign),
            ("term", &self.term),
            ("content", &self.content),
            ("gclid", &self.gclid),
            ("fbclid", &self.fbclid),
            ("referrer", &self.referrer),
            ("landing_page", &self.landing_page),
        ];

        fields
            .into_iter()
            .filter_map(|(name, value)| {
                value
                    .as_ref()
                    .map(|v| (format!("{}{}", prefix, name), PropertyValue::from(v)))
            })
            .collect()
    }
}

/// First-touch and last-touch records for one visitor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionStore {
    first_touch: Option<Attribution>,
    last_touch: Option<Attribution>,
}

impl AttributionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a landing; landings without campaign signal are ignored
    pub fn record(&mut self, attribution: Attribution) {
        if attribution.is_empty() {
            return;
        }
        if self.first_touch.is_none() {
            self.first_touch = Some(attribution.clone());
        }
        self.last_touch = Some(attribution);
    }

    pub fn first_touch(&self) -> Option<&Attribution> {
        self.first_touch.as_ref()
    }

    pub fn last_touch(&self) -> Option<&Attribution> {
        self.last_touch.as_ref()
    }

    /// `first_touch_*` and `last_touch_*` properties
    pub fn properties(&self) -> Properties {
        let mut properties = Properties::new();
        if let Some(first) = &self.first_touch {
            properties.extend(first.to_properties("first_touch_"));
        }
        if let Some(last) = &self.last_touch {
            properties.extend(last.to_properties("last_touch_"));
        }
        properties
    }
}

/// Attribution for a visitor session, handed out once
#[derive(Debug, Default)]
pub struct SessionAttribution {
    store: Mutex<AttributionStore>,
    merged: AtomicBool,
}

impl SessionAttribution {
    pub fn new(store: AttributionStore) -> Self {
        Self {
            store: Mutex::new(store),
            merged: AtomicBool::new(false),
        }
    }

    /// Record a landing URL for this session
    pub fn capture(&self, url: &str, referrer: Option<&str>) {
        let mut attribution = Attribution::from_url(url);
        if let Some(referrer) = referrer {
            attribution = attribution.with_referrer(referrer);
        }
        self.store.lock().record(attribution);
    }

    /// Snapshot of the underlying store
    pub fn store(&self) -> AttributionStore {
        self.store.lock().clone()
    }

    /// Properties for the session's first page view; `None` afterwards
    pub fn take_for_page_view(&self) -> Option<Properties> {
        if self.merged.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(self.store.lock().properties())
    }
}
