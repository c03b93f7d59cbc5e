//! Core configuration types and data structures

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use leadtrail_core::{
    AnalyticsSink, ConsoleSink, EventDispatcher, HttpSink, HttpSinkConfig, NoopSink,
};
use leadtrail_tracking::PageOptions;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, Result};

/// Main tracking configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackingConfig {
    /// Echo every event through the log
    pub development: bool,
    /// Funnel authoring file replacing the embedded tables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funnels_path: Option<PathBuf>,
    /// Scroll milestones, as percentages
    pub scroll_milestones: Vec<u8>,
    /// Where events are delivered
    pub sink: SinkConfig,
}

/// Sink backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// Discard events
    #[default]
    None,
    /// Write events to the log
    Console,
    /// POST batches to a collector
    Http,
}

/// Sink configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SinkConfig {
    pub kind: SinkKind,
    /// Collector URL, required for `http`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub batch_size: usize,
    pub flush_interval_ms: u64,
    pub queue_capacity: usize,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            development: false,
            funnels_path: None,
            scroll_milestones: vec![25, 50, 75, 100],
            sink: SinkConfig::default(),
        }
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::None,
            endpoint: None,
            batch_size: 20,
            flush_interval_ms: 5000,
            queue_capacity: 1000,
        }
    }
}

impl TrackingConfig {
    /// Check the configuration for values the trackers cannot use
    pub fn validate(&self) -> Result<()> {
        if self.scroll_milestones.iter().any(|m| !(1..=100).contains(m)) {
            return Err(ConfigError::Validation(
                "Scroll milestones must be between 1 and 100".to_string(),
            ));
        }
        if self.scroll_milestones.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::Validation(
                "Scroll milestones must be strictly increasing".to_string(),
            ));
        }
        self.sink.validate()
    }

    /// Build the configured sink
    ///
    /// An HTTP sink is returned stopped; start it from inside a tokio runtime.
    pub fn build_sink(&self) -> Result<SinkHandle> {
        self.sink.validate()?;

        let handle = match self.sink.kind {
            SinkKind::None => SinkHandle::new(Arc::new(NoopSink)),
            SinkKind::Console => SinkHandle::new(Arc::new(ConsoleSink)),
            SinkKind::Http => {
                let http = Arc::new(HttpSink::new(self.sink.http_config()?)?);
                SinkHandle {
                    sink: http.clone(),
                    http: Some(http),
                }
            }
        };
        Ok(handle)
    }

    /// Dispatcher over `sink` honouring the development flag
    pub fn dispatcher(&self, sink: Arc<dyn AnalyticsSink>) -> EventDispatcher {
        EventDispatcher::new(sink).with_development(self.development)
    }

    /// Page tracker options using the configured scroll milestones
    pub fn page_options(&self, page_type: impl Into<String>) -> PageOptions {
        PageOptions::new(page_type).with_milestones(self.scroll_milestones.iter().copied())
    }
}

impl SinkConfig {
    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ConfigError::Validation(
                "Sink batch size must be greater than 0".to_string(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Validation(
                "Sink queue capacity must be greater than 0".to_string(),
            ));
        }
        if self.flush_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "Sink flush interval must be greater than 0".to_string(),
            ));
        }
        if self.kind == SinkKind::Http {
            self.endpoint_url()?;
        }
        Ok(())
    }

    fn endpoint_url(&self) -> Result<Url> {
        let endpoint = self.endpoint.as_deref().ok_or_else(|| {
            ConfigError::Validation("HTTP sink requires an endpoint".to_string())
        })?;
        let url = Url::parse(endpoint).map_err(|e| {
            ConfigError::Validation(format!("Invalid sink endpoint '{}': {}", endpoint, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "Sink endpoint must be http or https: {}",
                endpoint
            )));
        }
        Ok(url)
    }

    /// Settings for an HTTP sink
    pub fn http_config(&self) -> Result<HttpSinkConfig> {
        let endpoint = self.endpoint_url()?;
        Ok(HttpSinkConfig {
            endpoint: endpoint.to_string(),
            batch_size: self.batch_size,
            flush_interval: Duration::from_millis(self.flush_interval_ms),
            queue_capacity: self.queue_capacity,
            ..HttpSinkConfig::default()
        })
    }
}

/// A built sink, plus lifecycle access when it runs in the background
#[derive(Clone)]
pub struct SinkHandle {
    sink: Arc<dyn AnalyticsSink>,
    http: Option<Arc<HttpSink>>,
}

impl SinkHandle {
    fn new(sink: Arc<dyn AnalyticsSink>) -> Self {
        Self { sink, http: None }
    }

    pub fn sink(&self) -> Arc<dyn AnalyticsSink> {
        self.sink.clone()
    }

    /// True for sinks that need [`start`](Self::start) before use
    pub fn is_background(&self) -> bool {
        self.http.is_some()
    }

    /// Start background delivery; no-op for synchronous sinks
    pub fn start(&self) -> Result<()> {
        if let Some(http) = &self.http {
            http.start()?;
        }
        Ok(())
    }

    /// Flush and stop background delivery
    pub async fn shutdown(&self) {
        if let Some(http) = &self.http {
            http.stop().await;
        }
    }
}

impl std::fmt::Debug for SinkHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkHandle")
            .field("background", &self.is_background())
            .finish_non_exhaustive()
    }
}

/// Configuration loading contract
pub trait ConfigLoader {
    /// Load configuration
    fn load_config(&mut self) -> Result<TrackingConfig>;
    /// Save configuration
    fn save_config(&self, config: &TrackingConfig) -> Result<()>;
    /// Validate configuration
    fn validate_config(&self, config: &TrackingConfig) -> Result<()>;
}
