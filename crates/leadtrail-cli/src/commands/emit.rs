// Emit a single event through the configured sink

use leadtrail_config::{SinkKind, TrackingConfig};
use leadtrail_core::{Properties, PropertyValue};
use tracing::{debug, info};

use crate::error::{CliError, CliResult};
use crate::output::{print_warning, OutputStyle};

/// Send one event, then flush the sink
pub struct EmitCommand {
    event: String,
    properties: Vec<String>,
}

impl EmitCommand {
    pub fn new(event: String, properties: Vec<String>) -> Self {
        Self { event, properties }
    }

    /// Parse every `key=value` argument
    pub fn properties(&self) -> CliResult<Properties> {
        let mut parsed = Properties::new();
        for raw in &self.properties {
            let (key, value) = parse_property(raw)?;
            parsed.insert(key, value);
        }
        Ok(parsed)
    }

    pub async fn execute(&self, config: &TrackingConfig) -> CliResult<()> {
        if self.event.trim().is_empty() {
            return Err(CliError::InvalidArgument {
                message: "event name must not be empty".to_string(),
            });
        }
        let properties = self.properties()?;

        if config.sink.kind == SinkKind::None {
            print_warning("No sink configured; the event will be discarded");
        }

        let handle = config.build_sink()?;
        handle.start()?;
        debug!(event = %self.event, background = handle.is_background(), "Emitting event");

        let dispatcher = config.dispatcher(handle.sink());
        dispatcher.track_event(&self.event, properties);
        handle.shutdown().await;

        info!(event = %self.event, "Event emitted");
        println!(
            "{}",
            OutputStyle::default().success(&format!("Emitted {}", self.event))
        );
        Ok(())
    }
}

/// Parse `key=value`, inferring booleans and numbers
pub fn parse_property(raw: &str) -> CliResult<(String, PropertyValue)> {
    let (key, value) = raw.split_once('=').ok_or_else(|| CliError::InvalidArgument {
        message: format!("property '{}' must look like key=value", raw),
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::InvalidArgument {
            message: format!("property '{}' has an empty key", raw),
        });
    }

    let value = if let Ok(b) = value.parse::<bool>() {
        PropertyValue::Bool(b)
    } else if let Ok(n) = value.parse::<i64>() {
        PropertyValue::Integer(n)
    } else if let Some(x) = value.parse::<f64>().ok().filter(|x| x.is_finite()) {
        PropertyValue::Float(x)
    } else {
        PropertyValue::String(value.to_string())
    };
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_property_types() {
        assert_eq!(
            parse_property("program_code=MSDS").unwrap(),
            ("program_code".to_string(), PropertyValue::String("MSDS".to_string()))
        );
        assert_eq!(
            parse_property("depth=75").unwrap().1,
            PropertyValue::Integer(75)
        );
        assert_eq!(
            parse_property("ratio=0.5").unwrap().1,
            PropertyValue::Float(0.5)
        );
        assert_eq!(
            parse_property("returning=true").unwrap().1,
            PropertyValue::Bool(true)
        );
        assert_eq!(
            parse_property("note=").unwrap().1,
            PropertyValue::String(String::new())
        );
        assert_eq!(
            parse_property("label=a=b").unwrap().1,
            PropertyValue::String("a=b".to_string())
        );
    }

    #[test]
    fn test_parse_property_rejects_malformed() {
        assert!(matches!(
            parse_property("no_separator"),
            Err(CliError::InvalidArgument { .. })
        ));
        assert!(matches!(
            parse_property("=value"),
            Err(CliError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_nan_stays_text() {
        assert_eq!(
            parse_property("value=NaN").unwrap().1,
            PropertyValue::String("NaN".to_string())
        );
    }

    #[tokio::test]
    async fn test_emit_with_console_sink() {
        let mut config = TrackingConfig::default();
        config.sink.kind = SinkKind::Console;
        let cmd = EmitCommand::new(
            "cta_click".to_string(),
            vec!["cta_name=apply".to_string()],
        );
        assert!(cmd.execute(&config).await.is_ok());
    }

    #[tokio::test]
    async fn test_emit_rejects_blank_event() {
        let cmd = EmitCommand::new("  ".to_string(), Vec::new());
        assert!(matches!(
            cmd.execute(&TrackingConfig::default()).await,
            Err(CliError::InvalidArgument { .. })
        ));
    }
}
