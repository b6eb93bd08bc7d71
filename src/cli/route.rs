//! CLI route: dispatch parsed commands to the harness.

use super::parse::{Commands, OutputFormat};
use super::presentation::{format_report_text, format_reports_json, format_scenario_list};
use super::scenarios::{self, Scenario};
use crate::config::CascadeConfig;
use crate::error::RenderError;
use tracing::debug;

/// Everything a command needs besides its own arguments
pub struct RunContext {
    config: CascadeConfig,
}

/// Output of a command and whether every scenario it ran passed
pub struct CommandOutput {
    pub text: String,
    pub success: bool,
}

impl RunContext {
    pub fn new(config: CascadeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    pub async fn execute(&self, command: &Commands) -> Result<CommandOutput, RenderError> {
        match command {
            Commands::Scenarios => Ok(CommandOutput {
                text: format_scenario_list(&scenarios::all()),
                success: true,
            }),
            Commands::Config => Ok(CommandOutput {
                text: self.config.to_toml()?,
                success: true,
            }),
            Commands::Run {
                scenario,
                all,
                format,
            } => {
                let selected: Vec<Scenario> = if *all {
                    scenarios::all()
                } else {
                    let name = scenario.as_deref().unwrap_or_default();
                    let found = scenarios::find(name).ok_or_else(|| {
                        RenderError::Config(format!("Unknown scenario: {}", name))
                    })?;
                    vec![found]
                };
                self.run_scenarios(&selected, *format).await
            }
        }
    }

    async fn run_scenarios(
        &self,
        selected: &[Scenario],
        format: OutputFormat,
    ) -> Result<CommandOutput, RenderError> {
        let mut reports = Vec::with_capacity(selected.len());
        for scenario in selected {
            debug!(scenario = scenario.name, "Running scenario");
            reports.push(scenarios::run(scenario, &self.config.renderer).await?);
        }
        let success = reports.iter().all(|report| report.passed);
        let text = match format {
            OutputFormat::Json => format_reports_json(&reports)?,
            OutputFormat::Text => reports
                .iter()
                .map(format_report_text)
                .collect::<Vec<_>>()
                .join("\n\n"),
        };
        Ok(CommandOutput { text, success })
    }
}
