use clap::Args;
use serde::Serialize;

use crate::dictionary::{CommandCategory, CommandDictionary};
use crate::error::UpdateError;

#[derive(Debug, Args)]
pub struct CommandsArgs {
    #[arg(
        long,
        value_name = "CATEGORY",
        help = "Only list commands in CATEGORY (compute|storage|network|appliance|security|global|billing|misc)"
    )]
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommandsResponse {
    pub commands: Vec<CommandListing>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct CommandListing {
    pub command: String,
    pub category: CommandCategory,
    pub description: String,
    pub subcommands: Vec<String>,
    pub standalone: bool,
}

pub fn run_commands(args: CommandsArgs) -> Result<CommandsResponse, UpdateError> {
    let category = args
        .category
        .as_deref()
        .map(|name| {
            CommandCategory::from_name(name).ok_or_else(|| UpdateError::InvalidRequest {
                message: format!(
                    "Unknown category '{name}'. Expected one of: compute, storage, network, appliance, security, global, billing, misc"
                ),
            })
        })
        .transpose()?;

    let dictionary = CommandDictionary::builtin();
    let commands = dictionary
        .entries()
        .filter(|entry| category.is_none_or(|category| entry.category == category))
        .map(|entry| CommandListing {
            command: entry.command.clone(),
            category: entry.category,
            description: entry.description.clone(),
            subcommands: entry.subcommands.clone(),
            standalone: dictionary.is_standalone(&entry.command),
        })
        .collect::<Vec<_>>();

    Ok(CommandsResponse {
        total: commands.len(),
        commands,
    })
}
