use std::collections::BTreeMap;

use clap::Args;
use serde::Serialize;

use crate::context::{MigrationContext, Settings};
use crate::error::UpdateError;
use crate::impact::{ImpactAnalysis, RiskLevel};
use crate::io;

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[arg(
        value_name = "FILE",
        num_args = 0..,
        help = "Input scripts or glob patterns; reads stdin when omitted"
    )]
    pub files: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub lines: Vec<AnalyzedLine>,
    pub summary: AnalyzeSummary,
}

#[derive(Debug, Serialize)]
pub struct AnalyzedLine {
    pub file: String,
    pub line_number: usize,
    /// The line after conversion.
    pub command: String,
    #[serde(flatten)]
    pub impact: ImpactAnalysis,
}

#[derive(Debug, Default, Serialize)]
pub struct AnalyzeSummary {
    pub files: usize,
    pub commands: usize,
    pub by_risk: BTreeMap<RiskLevel, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_risk: Option<RiskLevel>,
    pub max_complexity: u32,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<AnalyzeResponse, UpdateError> {
    let context = MigrationContext::new(Settings::default());
    let inputs = io::read_inputs(&args.files)?;

    let mut lines = Vec::new();
    let mut summary = AnalyzeSummary::default();
    for input in &inputs {
        summary.files += 1;
        let report = context.process_script(input.text());
        for line in report.lines {
            let Some(impact) = line.impact else {
                continue;
            };
            summary.commands += 1;
            *summary.by_risk.entry(impact.risk).or_default() += 1;
            summary.highest_risk = summary.highest_risk.max(Some(impact.risk));
            summary.max_complexity = summary.max_complexity.max(impact.complexity);
            lines.push(AnalyzedLine {
                file: input.display_name(),
                line_number: line.line_number,
                command: line.transform.transformed_line,
                impact,
            });
        }
    }

    Ok(AnalyzeResponse { lines, summary })
}
