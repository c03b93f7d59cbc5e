// Configuration inspection

use leadtrail_config::{ConfigError, ConfigManager};

use crate::error::CliResult;

/// Inspect the effective configuration
pub struct ConfigCommand {
    pub action: ConfigAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    Show,
    Path,
}

impl ConfigCommand {
    pub fn new(action: ConfigAction) -> Self {
        Self { action }
    }

    pub fn execute(&self, manager: &mut ConfigManager) -> CliResult<()> {
        let output = self.run(manager)?;
        println!("{}", output.trim_end());
        Ok(())
    }

    /// Render the action's output
    pub fn run(&self, manager: &mut ConfigManager) -> CliResult<String> {
        match self.action {
            ConfigAction::Show => {
                let config = manager.load()?;
                let rendered = toml::to_string_pretty(&config).map_err(ConfigError::from)?;
                Ok(rendered)
            }
            ConfigAction::Path => Ok(manager.config_path().display().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_action_reports_manager_path() {
        let mut manager = ConfigManager::with_path("/tmp/leadtrail-test/config.toml".into());
        let output = ConfigCommand::new(ConfigAction::Path)
            .run(&mut manager)
            .unwrap();
        assert_eq!(output, "/tmp/leadtrail-test/config.toml");
    }
}
