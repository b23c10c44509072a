use clap::Subcommand;

use super::classify::ClassifyArgs;
use super::config::ConfigArgs;
use super::draft::DraftArgs;
use super::images::ImagesArgs;
use super::run::RunArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Attach to a browser tab and automate the page it shows
    Run(RunArgs),

    /// Print the page kind a URL is classified as
    Classify(ClassifyArgs),

    /// Inspect and edit the listing draft in the handoff store
    Draft(DraftArgs),

    /// Fetch, compose and store listing images
    Images(ImagesArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}
