use clap::Args;
use serde::Serialize;

use crate::dictionary::CommandDictionary;
use crate::error::UpdateError;
use crate::similarity::{DEFAULT_MAX_SUGGESTIONS, SimilarityMatcher};
use crate::validate::CommandValidator;

#[derive(Debug, Args)]
pub struct SuggestArgs {
    #[arg(value_name = "TOKEN", help = "Command or subcommand name to look up")]
    pub token: String,
    #[arg(
        long,
        value_name = "COMMAND",
        help = "Treat TOKEN as a subcommand of COMMAND"
    )]
    pub command: Option<String>,
    #[arg(
        long,
        value_name = "N",
        default_value_t = DEFAULT_MAX_SUGGESTIONS,
        help = "Maximum number of suggestions"
    )]
    pub max: usize,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    pub known: bool,
    pub suggestions: Vec<String>,
}

pub fn run_suggest(args: SuggestArgs) -> Result<SuggestResponse, UpdateError> {
    let dictionary = CommandDictionary::builtin();
    let matcher = SimilarityMatcher::new();

    let Some(command) = args.command else {
        return Ok(SuggestResponse {
            known: dictionary.exists(&args.token),
            suggestions: matcher.suggest(&args.token, &dictionary.all_commands(), args.max),
            token: args.token,
            command: None,
        });
    };

    let Some(subcommands) = dictionary.subcommands_of(&command) else {
        let closest = CommandValidator::with_max_suggestions(&dictionary, args.max)
            .validate_main(&command)
            .suggestions;
        let hint = if closest.is_empty() {
            String::new()
        } else {
            format!(" Did you mean: {}?", closest.join(", "))
        };
        return Err(UpdateError::InvalidRequest {
            message: format!("Unknown command '{command}'.{hint}"),
        });
    };

    Ok(SuggestResponse {
        known: dictionary.is_valid_subcommand(&command, &args.token),
        suggestions: matcher.suggest(&args.token, subcommands, args.max),
        token: args.token,
        command: Some(command),
    })
}
