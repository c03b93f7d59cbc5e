//! Batched HTTP delivery to an analytics collector

use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    error::{SinkError, SinkResult},
    event::Event,
    sink::AnalyticsSink,
};

/// HTTP sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSinkConfig {
    /// Collector URL receiving JSON arrays of events
    pub endpoint: String,

    /// Events per POST
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum time an event waits in a partial batch
    #[serde(default = "default_flush_interval")]
    pub flush_interval: Duration,

    /// Events buffered before new ones are dropped
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Per-request timeout
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
}

impl Default for HttpSinkConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            batch_size: default_batch_size(),
            flush_interval: default_flush_interval(),
            queue_capacity: default_queue_capacity(),
            timeout: default_timeout(),
        }
    }
}

fn default_batch_size() -> usize {
    20
}

fn default_flush_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_queue_capacity() -> usize {
    1000
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Sink posting batches of events from a background task
///
/// `event` only enqueues. Call [`HttpSink::start`] inside a tokio runtime
/// before dispatching and [`HttpSink::stop`] to flush on shutdown. Lost
/// events are not retried.
pub struct HttpSink {
    config: HttpSinkConfig,
    endpoint: Url,
    client: reqwest::Client,
    sender: Mutex<Option<mpsc::Sender<Event>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl HttpSink {
    /// Create a sink; the endpoint must be an http(s) URL
    pub fn new(config: HttpSinkConfig) -> SinkResult<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            SinkError::InvalidConfiguration(format!("invalid endpoint '{}': {}", config.endpoint, e))
        })?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(SinkError::InvalidConfiguration(format!(
                "endpoint must use http or https, got '{}'",
                endpoint.scheme()
            )));
        }

        if config.batch_size == 0 || config.queue_capacity == 0 {
            return Err(SinkError::InvalidConfiguration(
                "batch_size and queue_capacity must be greater than 0".to_string(),
            ));
        }

        if config.flush_interval.is_zero() {
            return Err(SinkError::InvalidConfiguration(
                "flush_interval must be greater than 0".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SinkError::Transport(e.to_string()))?;

        Ok(Self {
            config,
            endpoint,
            client,
            sender: Mutex::new(None),
            task: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &HttpSinkConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.sender.lock().is_some()
    }

    /// Spawn the delivery task on the current tokio runtime
    pub fn start(&self) -> SinkResult<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SinkError::NotRunning(format!("no tokio runtime: {}", e)))?;

        let mut sender = self.sender.lock();
        if sender.is_some() {
            return Ok(());
        }

        let (tx, rx) = mpsc::channel(self.config.queue_capacity);
        let task = runtime.spawn(deliver(
            self.client.clone(),
            self.endpoint.clone(),
            rx,
            self.config.batch_size,
            self.config.flush_interval,
        ));

        *sender = Some(tx);
        *self.task.lock() = Some(task);

        info!(endpoint = %self.endpoint, "HTTP analytics sink started");
        Ok(())
    }

    /// Close the queue, flush what is buffered and wait for the task
    pub async fn stop(&self) {
        // Dropping the sender ends the task's receive loop
        let sender = self.sender.lock().take();
        drop(sender);

        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "HTTP analytics sink task ended abnormally");
            }
            info!("HTTP analytics sink stopped");
        }
    }
}

impl AnalyticsSink for HttpSink {
    fn event(&self, event: &Event) -> SinkResult<()> {
        let sender = self.sender.lock();
        let sender = sender
            .as_ref()
            .ok_or_else(|| SinkError::NotRunning("HTTP sink not started".to_string()))?;

        sender.try_send(event.clone()).map_err(|e| match e {
            TrySendError::Full(_) => SinkError::QueueFull {
                capacity: self.config.queue_capacity,
            },
            TrySendError::Closed(_) => SinkError::NotRunning("delivery task exited".to_string()),
        })
    }
}

async fn deliver(
    client: reqwest::Client,
    endpoint: Url,
    mut rx: mpsc::Receiver<Event>,
    batch_size: usize,
    flush_interval: Duration,
) {
    let mut interval = tokio::time::interval(flush_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut buffer: Vec<Event> = Vec::with_capacity(batch_size);

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(event) => {
                    buffer.push(event);
                    if buffer.len() >= batch_size {
                        flush(&client, &endpoint, &mut buffer).await;
                    }
                }
                None => {
                    flush(&client, &endpoint, &mut buffer).await;
                    break;
                }
            },
            _ = interval.tick() => {
                flush(&client, &endpoint, &mut buffer).await;
            }
        }
    }
}

async fn flush(client: &reqwest::Client, endpoint: &Url, buffer: &mut Vec<Event>) {
    if buffer.is_empty() {
        return;
    }

    let batch = std::mem::take(buffer);
    match post_batch(client, endpoint, &batch).await {
        Ok(()) => debug!(count = batch.len(), "Delivered analytics batch"),
        Err(e) => warn!(count = batch.len(), error = %e, "Dropping analytics batch"),
    }
}

async fn post_batch(client: &reqwest::Client, endpoint: &Url, batch: &[Event]) -> SinkResult<()> {
    let response = client
        .post(endpoint.clone())
        .json(batch)
        .send()
        .await
        .map_err(|e| SinkError::Transport(e.to_string()))?;

    if !response.status().is_success() {
        return Err(SinkError::Status {
            status: response.status().as_u16(),
        });
    }

    Ok(())
}
