//! Output formatting for funnel tables

use crate::error::Result;
use crate::types::{Funnel, Stage};

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() > width {
        let kept: String = value.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        value.to_string()
    }
}

fn stage_flags(stage: &Stage) -> String {
    let mut flags = Vec::new();
    if stage.is_conversion {
        match &stage.conversion_value {
            Some(value) => flags.push(format!("conversion ({})", value)),
            None => flags.push("conversion".to_string()),
        }
    }
    if stage.is_final_goal {
        flags.push("final goal".to_string());
    }
    flags.join(", ")
}

/// Format a single funnel with its stages
pub fn format_funnel_table(funnel: &Funnel) -> String {
    let mut output = String::new();
    output.push_str(&format!("ID:          {}\n", funnel.id));
    output.push_str(&format!("Name:        {}\n", funnel.name));
    if !funnel.description.is_empty() {
        output.push_str(&format!("Description: {}\n", funnel.description));
    }
    output.push_str(&format!("Stages:      {}\n", funnel.stages.len()));
    output.push_str(&format!("Expected:    {}s\n", funnel.expected_duration()));
    output.push('\n');

    output.push_str("#  | Stage                        | Events                                   | Flags\n");
    output.push_str("---|------------------------------|------------------------------------------|----------------\n");
    for stage in &funnel.stages {
        output.push_str(&format!(
            "{:<2} | {:<28} | {:<40} | {}\n",
            stage.stage,
            truncate(&stage.name, 28),
            truncate(&stage.events.join(", "), 40),
            stage_flags(stage)
        ));
    }

    if !funnel.benchmarks.is_empty() {
        output.push_str("\nBenchmarks:\n");
        for (key, rate) in &funnel.benchmarks {
            output.push_str(&format!("  {:<10} {:>5.1}%\n", key, rate * 100.0));
        }
    }

    output
}

/// Format a list of funnels as a summary table
pub fn format_funnels_table(funnels: &[&Funnel]) -> String {
    if funnels.is_empty() {
        return "No funnels found".to_string();
    }

    let mut output = String::new();
    output.push_str("ID                       | Name                           | Stages | Conversions\n");
    output.push_str("-------------------------|--------------------------------|--------|------------------------\n");

    for funnel in funnels {
        let conversions: Vec<&str> = funnel
            .conversion_stages()
            .filter_map(|s| s.conversion_value.as_deref())
            .collect();

        output.push_str(&format!(
            "{:<24} | {:<30} | {:<6} | {}\n",
            truncate(&funnel.id, 24),
            truncate(&funnel.name, 30),
            funnel.stages.len(),
            conversions.join(", ")
        ));
    }

    output
}

/// Format a single funnel as JSON, in the authoring format
pub fn format_funnel_json(funnel: &Funnel) -> Result<String> {
    Ok(serde_json::to_string_pretty(funnel)?)
}

/// Format a list of funnels as JSON
pub fn format_funnels_json(funnels: &[&Funnel]) -> Result<String> {
    Ok(serde_json::to_string_pretty(funnels)?)
}
