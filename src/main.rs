use std::process::ExitCode;

use clap::Parser;
use usacloud_update::cli::convert::ConvertCommandOutput;
use usacloud_update::cli::{Cli, Commands};
use usacloud_update::error::UpdateError;

/// Exit status of `check --strict` when an invocation is invalid; 1 is kept for errors.
const CHECK_FAILED: u8 = 2;

struct Output {
    text: String,
    status: ExitCode,
}

impl Output {
    fn json<T: serde::Serialize>(response: &T) -> Result<Self, UpdateError> {
        let text = serde_json::to_string_pretty(response)
            .map_err(|source| UpdateError::ResponseSerialization { source })?;
        Ok(Self {
            text: format!("{text}\n"),
            status: ExitCode::SUCCESS,
        })
    }
}

fn main() -> ExitCode {
    usacloud_update::logging::init();

    match run() {
        Ok(output) => {
            print!("{}", output.text);
            output.status
        }
        Err(error) => {
            let serialized = serde_json::to_string_pretty(&error.to_error_response()).unwrap_or_else(
                |_| {
                    "{\"error\":{\"type\":\"serialization_error\",\"message\":\"Failed to serialize error response\"}}"
                        .to_string()
                },
            );
            println!("{serialized}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<Output, UpdateError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert(args) => match usacloud_update::cli::convert::run_convert(args)? {
            ConvertCommandOutput::Text(text) => Ok(Output {
                text,
                status: ExitCode::SUCCESS,
            }),
            ConvertCommandOutput::Report(response) => Output::json(&response),
            ConvertCommandOutput::Write(response) => Output::json(&response),
        },
        Commands::Check(args) => {
            let response = usacloud_update::cli::check::run_check(args)?;
            let mut output = Output::json(&response)?;
            if !response.passed() {
                output.status = ExitCode::from(CHECK_FAILED);
            }
            Ok(output)
        }
        Commands::Suggest(args) => {
            let response = usacloud_update::cli::suggest::run_suggest(args)?;
            Output::json(&response)
        }
        Commands::Analyze(args) => {
            let response = usacloud_update::cli::analyze::run_analyze(args)?;
            Output::json(&response)
        }
        Commands::ListCommands(args) => {
            let response = usacloud_update::cli::commands::run_commands(args)?;
            Output::json(&response)
        }
    }
}
