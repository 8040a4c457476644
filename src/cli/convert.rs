use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::context::{MigrationContext, ScriptReport, Settings};
use crate::error::UpdateError;
use crate::io::{self, WriteOutcome};

#[derive(Debug, Args)]
pub struct ConvertArgs {
    #[arg(long, help = "Emit a JSON report per input instead of the rewritten script")]
    pub json: bool,
    #[arg(
        long,
        conflicts_with = "json",
        help = "Rewrite FILE arguments in place and print a JSON summary"
    )]
    pub write: bool,
    #[arg(
        value_name = "FILE",
        num_args = 0..,
        help = "Input scripts or glob patterns; reads stdin when omitted"
    )]
    pub files: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub files: Vec<ConvertedFile>,
    pub summary: ConvertSummary,
}

#[derive(Debug, Serialize)]
pub struct ConvertedFile {
    pub file: String,
    pub source_hash: String,
    #[serde(flatten)]
    pub report: ScriptReport,
}

#[derive(Debug, Default, Serialize)]
pub struct ConvertSummary {
    pub files: usize,
    pub changed_files: usize,
    pub total_changes: usize,
}

#[derive(Debug, Serialize)]
pub struct WriteResponse {
    pub files: Vec<WrittenFile>,
    pub summary: WriteSummary,
}

#[derive(Debug, Serialize)]
pub struct WrittenFile {
    pub file: String,
    pub outcome: WriteOutcome,
    pub changed_lines: usize,
    pub total_changes: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct WriteSummary {
    pub files_written: usize,
    pub files_unchanged: usize,
}

pub enum ConvertCommandOutput {
    Text(String),
    Report(ConvertResponse),
    Write(WriteResponse),
}

pub fn run_convert(args: ConvertArgs) -> Result<ConvertCommandOutput, UpdateError> {
    if args.write && args.files.is_empty() {
        return Err(UpdateError::InvalidRequest {
            message: "--write requires at least one FILE argument".to_string(),
        });
    }

    let context = MigrationContext::new(Settings::default());
    let inputs = io::read_inputs(&args.files)?;

    if args.write {
        let reports = inputs
            .iter()
            .map(|input| context.process_script(input.text()))
            .collect::<Vec<_>>();

        let mut response = WriteResponse {
            files: Vec::with_capacity(inputs.len()),
            summary: WriteSummary::default(),
        };
        for (input, report) in inputs.iter().zip(reports) {
            let outcome = io::write_script(input, &report.transformed_text())?;
            match outcome {
                WriteOutcome::Written => response.summary.files_written += 1,
                WriteOutcome::Unchanged => response.summary.files_unchanged += 1,
            }
            response.files.push(WrittenFile {
                file: input.display_name(),
                outcome,
                changed_lines: report.summary.changed_lines,
                total_changes: report.summary.total_changes,
            });
        }
        info!(
            written = response.summary.files_written,
            unchanged = response.summary.files_unchanged,
            "convert --write finished"
        );
        return Ok(ConvertCommandOutput::Write(response));
    }

    if !args.json {
        let text = inputs
            .iter()
            .map(|input| context.process_script(input.text()).transformed_text())
            .collect::<String>();
        return Ok(ConvertCommandOutput::Text(text));
    }

    let mut summary = ConvertSummary::default();
    let files = inputs
        .iter()
        .map(|input| {
            let report = context.process_script(input.text());
            summary.files += 1;
            if report.changed() {
                summary.changed_files += 1;
            }
            summary.total_changes += report.summary.total_changes;
            ConvertedFile {
                file: input.display_name(),
                source_hash: input.source_hash(),
                report,
            }
        })
        .collect();

    Ok(ConvertCommandOutput::Report(ConvertResponse { files, summary }))
}
