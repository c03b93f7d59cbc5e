// Command routing and dispatch

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use leadtrail_config::{ConfigManager, TrackingConfig};

use crate::commands::*;
use crate::error::CliResult;

/// Leadtrail - funnel and event attribution tracking
#[derive(Parser, Debug)]
#[command(name = "leadtrail")]
#[command(bin_name = "leadtrail")]
#[command(about = "Inspect funnel tables and tracking configuration")]
#[command(version)]
#[command(author = "Leadtrail Contributors")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: <config dir>/leadtrail/config.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Funnel authoring file replacing the configured or embedded tables
    #[arg(long, global = true, value_name = "PATH")]
    pub funnels: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimize output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Inspect and validate funnel tables
    #[command(about = "Inspect and validate funnel tables")]
    Funnels {
        #[command(subcommand)]
        action: FunnelsSubcommand,
    },

    /// Show tracking configuration
    #[command(about = "Show the effective tracking configuration")]
    Config {
        #[command(subcommand)]
        action: Option<ConfigSubcommand>,
    },

    /// Send one event through the configured sink
    #[command(about = "Send one event through the configured sink")]
    Emit {
        /// Event name
        #[arg(value_name = "EVENT")]
        event: String,

        /// Event property as key=value (repeatable)
        #[arg(short, long = "property", value_name = "KEY=VALUE")]
        properties: Vec<String>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum FunnelsSubcommand {
    /// List all funnels
    #[command(about = "List all funnels")]
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show one funnel with its stages
    #[command(about = "Show one funnel with its stages")]
    Show {
        /// Funnel ID
        #[arg(value_name = "ID")]
        id: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Validate a funnel authoring file
    #[command(about = "Validate a funnel authoring file")]
    Validate {
        /// Path to the JSON file
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Find the stage an event satisfies
    #[command(about = "Find the stage of a funnel that an event satisfies")]
    Lookup {
        /// Funnel ID
        #[arg(value_name = "FUNNEL")]
        funnel: String,

        /// Raw event name
        #[arg(value_name = "EVENT")]
        event: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
}

/// Output format for listings
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Command router
pub struct CommandRouter;

impl CommandRouter {
    /// Parse CLI arguments and route to appropriate handler
    pub async fn route() -> CliResult<()> {
        let cli = Cli::parse();

        crate::logging::init_logging(cli.verbose, cli.quiet);

        Self::execute(&cli).await
    }

    /// Execute a command
    pub async fn execute(cli: &Cli) -> CliResult<()> {
        let mut manager = Self::config_manager(cli);

        match &cli.command {
            Commands::Funnels { action } => {
                // Validation reads its own file and needs no configuration
                let config = match action {
                    FunnelsSubcommand::Validate { .. } => TrackingConfig::default(),
                    _ => manager.load()?,
                };
                let source = FunnelSource::resolve(cli.funnels.as_deref(), &config);
                let funnels_action = match action {
                    FunnelsSubcommand::List { format } => FunnelsAction::List { format: *format },
                    FunnelsSubcommand::Show { id, format } => FunnelsAction::Show {
                        id: id.clone(),
                        format: *format,
                    },
                    FunnelsSubcommand::Validate { path } => {
                        FunnelsAction::Validate { path: path.clone() }
                    }
                    FunnelsSubcommand::Lookup { funnel, event } => FunnelsAction::Lookup {
                        funnel: funnel.clone(),
                        event: event.clone(),
                    },
                };
                FunnelsCommand::new(funnels_action, source).execute()
            }
            Commands::Config { action } => {
                let config_action = match action {
                    Some(ConfigSubcommand::Show) | None => ConfigAction::Show,
                    Some(ConfigSubcommand::Path) => ConfigAction::Path,
                };
                ConfigCommand::new(config_action).execute(&mut manager)
            }
            Commands::Emit { event, properties } => {
                let config = manager.load()?;
                let cmd = EmitCommand::new(event.clone(), properties.clone());
                cmd.execute(&config).await
            }
        }
    }

    fn config_manager(cli: &Cli) -> ConfigManager {
        match &cli.config {
            Some(path) => ConfigManager::with_path(path.clone()),
            None => ConfigManager::new(),
        }
    }
}
