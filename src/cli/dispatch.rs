use super::classify::cmd_classify;
use super::config::cmd_config;
use super::draft::cmd_draft;
use super::env::CliArgs;
use super::images::cmd_images;
use super::run::cmd_run;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Run(args) => cmd_run(args, ctx).await,
        Commands::Classify(args) => cmd_classify(args, ctx),
        Commands::Draft(args) => cmd_draft(args, ctx).await,
        Commands::Images(args) => cmd_images(args, ctx).await,
        Commands::Config(args) => cmd_config(args, ctx),
    }
}
