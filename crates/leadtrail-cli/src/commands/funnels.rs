//! Funnels command handler

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use leadtrail_config::TrackingConfig;
use leadtrail_funnels::{
    builtin_registry, format_funnel_json, format_funnel_table, format_funnels_json,
    format_funnels_table, Funnel, FunnelRegistry,
};
use tracing::debug;

use crate::error::{CliError, CliResult};
use crate::output::OutputStyle;
use crate::router::OutputFormat;

/// Where funnel tables come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunnelSource {
    /// Tables compiled into the binary
    Builtin,
    /// A JSON authoring file
    File(PathBuf),
}

impl FunnelSource {
    /// `--funnels` first, then the configured path, then the built-in tables
    pub fn resolve(flag: Option<&Path>, config: &TrackingConfig) -> Self {
        match flag.or(config.funnels_path.as_deref()) {
            Some(path) => FunnelSource::File(path.to_path_buf()),
            None => FunnelSource::Builtin,
        }
    }

    /// Load and validate the tables
    pub fn load(&self) -> CliResult<Cow<'static, FunnelRegistry>> {
        match self {
            FunnelSource::Builtin => builtin_registry()
                .map(Cow::Borrowed)
                .map_err(|e| CliError::Internal(format!("Embedded funnel tables are invalid: {}", e))),
            FunnelSource::File(path) => {
                debug!(path = %path.display(), "Loading funnel tables from file");
                Ok(Cow::Owned(FunnelRegistry::from_path(path)?))
            }
        }
    }
}

/// Funnels command action
#[derive(Debug, Clone)]
pub enum FunnelsAction {
    List { format: OutputFormat },
    Show { id: String, format: OutputFormat },
    Validate { path: PathBuf },
    Lookup { funnel: String, event: String },
}

/// Funnels command handler
pub struct FunnelsCommand {
    action: FunnelsAction,
    source: FunnelSource,
}

impl FunnelsCommand {
    pub fn new(action: FunnelsAction, source: FunnelSource) -> Self {
        Self { action, source }
    }

    /// Execute the command and print its output
    pub fn execute(&self) -> CliResult<()> {
        let output = self.run(&OutputStyle::default())?;
        println!("{}", output);
        Ok(())
    }

    /// Execute the command and return its output
    pub fn run(&self, style: &OutputStyle) -> CliResult<String> {
        match &self.action {
            FunnelsAction::List { format } => {
                let registry = self.source.load()?;
                let funnels: Vec<&Funnel> = registry.funnels().collect();
                match format {
                    OutputFormat::Table => Ok(format_funnels_table(&funnels)),
                    OutputFormat::Json => Ok(format_funnels_json(&funnels)?),
                }
            }
            FunnelsAction::Show { id, format } => {
                let registry = self.source.load()?;
                let funnel = registry
                    .get(id)
                    .ok_or_else(|| CliError::NotFound(format!("funnel '{}'", id)))?;
                match format {
                    OutputFormat::Table => Ok(format_funnel_table(funnel)),
                    OutputFormat::Json => Ok(format_funnel_json(funnel)?),
                }
            }
            FunnelsAction::Validate { path } => {
                let registry = FunnelRegistry::from_path(path)?;
                Ok(style.success(&format!(
                    "{}: {} funnel(s) valid ({})",
                    path.display(),
                    registry.len(),
                    registry.ids().join(", ")
                )))
            }
            FunnelsAction::Lookup { funnel, event } => {
                let registry = self.source.load()?;
                let found = registry
                    .get(funnel)
                    .ok_or_else(|| CliError::NotFound(format!("funnel '{}'", funnel)))?;
                let stage = found.stage_for_event(event).ok_or_else(|| {
                    CliError::NotFound(format!(
                        "event '{}' in funnel '{}'",
                        event, funnel
                    ))
                })?;

                let mut output = format!(
                    "{} -> {} stage {}: {}",
                    event,
                    found.id,
                    stage.stage,
                    style.header(&stage.name)
                );
                if let Some(value) = stage.conversion_value.as_deref() {
                    output.push_str(&format!(" (conversion: {})", value));
                } else if stage.is_conversion {
                    output.push_str(" (conversion)");
                }
                if stage.is_final_goal {
                    output.push_str(" [final goal]");
                }
                Ok(output)
            }
        }
    }
}
