use clap::Args;
use serde::Serialize;

use crate::context::{CommandCheck, MigrationContext, Settings};
use crate::error::UpdateError;
use crate::io;
use crate::similarity::DEFAULT_MAX_SUGGESTIONS;

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[arg(long, help = "Validate the input as written instead of after conversion")]
    pub raw: bool,
    #[arg(long, help = "Exit non-zero when any invocation is invalid")]
    pub strict: bool,
    #[arg(
        long,
        value_name = "N",
        default_value_t = DEFAULT_MAX_SUGGESTIONS,
        help = "Maximum suggestions per invalid command"
    )]
    pub max_suggestions: usize,
    #[arg(
        value_name = "FILE",
        num_args = 0..,
        help = "Input scripts or glob patterns; reads stdin when omitted"
    )]
    pub files: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub issues: Vec<CheckIssue>,
    pub summary: CheckSummary,
}

impl CheckResponse {
    /// Only `--strict` turns issues into a failing exit.
    pub fn passed(&self) -> bool {
        !self.summary.strict || self.issues.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct CheckIssue {
    pub file: String,
    pub line_number: usize,
    pub command: String,
    pub error_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub available: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct CheckSummary {
    pub files_checked: usize,
    pub commands_checked: usize,
    pub invalid_commands: usize,
    pub strict: bool,
}

pub fn run_check(args: CheckArgs) -> Result<CheckResponse, UpdateError> {
    let context = MigrationContext::new(Settings {
        max_suggestions: args.max_suggestions,
        validate_transformed: !args.raw,
        ..Settings::default()
    });
    let inputs = io::read_inputs(&args.files)?;

    let mut issues = Vec::new();
    let mut summary = CheckSummary {
        strict: args.strict,
        ..CheckSummary::default()
    };
    for input in &inputs {
        summary.files_checked += 1;
        let report = context.process_script(input.text());
        for line in &report.lines {
            summary.commands_checked += line.checks.len();
            issues.extend(
                line.invalid_checks()
                    .map(|check| issue(input.display_name(), line.line_number, check)),
            );
        }
    }
    summary.invalid_commands = issues.len();

    Ok(CheckResponse { issues, summary })
}

fn issue(file: String, line_number: usize, check: &CommandCheck) -> CheckIssue {
    let mut issue = CheckIssue {
        file,
        line_number,
        command: check.command.clone(),
        error_type: "parse_error".to_string(),
        message: check.parse_error.clone(),
        suggestions: Vec::new(),
        available: Vec::new(),
    };
    if let Some(validation) = &check.validation {
        if let Some(error_type) = validation.error_type {
            issue.error_type = error_type.as_str().to_string();
        }
        issue.suggestions = validation.suggestions.clone();
        issue.available = validation.available.clone();
    }
    issue
}
