//! CLI presentation: tables and JSON for scenario reports.

use super::scenarios::{Scenario, ScenarioReport};
use crate::error::RenderError;
use comfy_table::Table;
use owo_colors::OwoColorize;

pub fn format_scenario_list(scenarios: &[Scenario]) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Scenario", "Steps", "Description"]);
    for scenario in scenarios {
        table.add_row(vec![
            scenario.name.to_string(),
            scenario.steps.len().to_string(),
            scenario.description.to_string(),
        ]);
    }
    table.to_string()
}

pub fn format_report_text(report: &ScenarioReport) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Batch", "Component", "Edits"]);
    for batch in &report.batches {
        for diff in &batch.diffs {
            let edits = if diff.edits.is_empty() {
                "(none)".to_string()
            } else {
                diff.edits.join("\n")
            };
            table.add_row(vec![batch.batch.to_string(), diff.component_id.to_string(), edits]);
        }
        if !batch.disposed.is_empty() {
            let disposed: Vec<String> = batch.disposed.iter().map(ToString::to_string).collect();
            table.add_row(vec![
                batch.batch.to_string(),
                "disposed".to_string(),
                disposed.join(", "),
            ]);
        }
    }

    let mark = if report.passed {
        format!("{}", "PASS".green().bold())
    } else {
        format!("{}", "FAIL".red().bold())
    };
    let mut out = format!("{} {}\n{}\n", mark, report.name.bold(), table);
    out.push_str(&format!("text:         {}\n", report.text));
    out.push_str(&format!("render count: {}", report.render_count));
    if !report.passed {
        out.push_str(&format!(
            "\nexpected:     {:?} rendered {} time(s)",
            report.expected_text, report.expected_render_count
        ));
    }
    out
}

pub fn format_reports_json(reports: &[ScenarioReport]) -> Result<String, RenderError> {
    serde_json::to_string_pretty(reports).map_err(|e| RenderError::Host(e.to_string()))
}
