use clap::{Parser, Subcommand};

pub mod analyze;
pub mod check;
pub mod commands;
pub mod convert;
pub mod suggest;

#[derive(Debug, Parser)]
#[command(name = "usacloud-update")]
#[command(version)]
#[command(about = "Rewrite usacloud v0 invocations in shell scripts to v1 syntax")]
#[command(
    long_about = "Rewrite usacloud v0 invocations in shell scripts to v1 syntax. Canonical flow: check -> convert -> convert --write. Logs go to stderr; set USACLOUD_UPDATE_LOG to change the filter."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Rewrite scripts to current syntax")]
    Convert(convert::ConvertArgs),
    #[command(about = "Report invalid usacloud invocations with suggestions")]
    Check(check::CheckArgs),
    #[command(about = "Suggest command or subcommand names close to a token")]
    Suggest(suggest::SuggestArgs),
    #[command(about = "Estimate risk and complexity of each invocation")]
    Analyze(analyze::AnalyzeArgs),
    #[command(name = "commands", about = "List known commands and subcommands")]
    ListCommands(commands::CommandsArgs),
}
