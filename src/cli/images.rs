use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use image_pipeline::{load_watermark, prepare_image, ComposeOptions};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::context::CliContext;

const USER_AGENT: &str = concat!("listing-relay/", env!("CARGO_PKG_VERSION"));

#[derive(Args, Clone, Debug)]
pub struct ImagesArgs {
    #[command(subcommand)]
    pub action: ImagesAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ImagesAction {
    /// Fetch source images, compose them and append them to the draft
    Add {
        /// Source image URLs
        #[arg(required = true)]
        urls: Vec<String>,

        /// Watermark image, overriding the configured one
        #[arg(long, value_name = "FILE")]
        watermark: Option<PathBuf>,
    },

    /// Drop every stored image
    Clear,
}

#[derive(Serialize)]
struct AddReport {
    added: Vec<String>,
    rejected: Vec<Rejected>,
    stored: usize,
}

#[derive(Serialize)]
struct Rejected {
    url: String,
    reason: String,
}

fn render(report: &AddReport) -> String {
    let mut lines = vec![format!(
        "added {} image(s), {} stored",
        report.added.len(),
        report.stored
    )];
    for rejected in &report.rejected {
        lines.push(format!("  skipped {}: {}", rejected.url, rejected.reason));
    }
    lines.join("\n")
}

pub async fn cmd_images(args: ImagesArgs, ctx: &CliContext) -> Result<()> {
    let drafts = ctx.drafts().await?;
    match args.action {
        ImagesAction::Add { urls, watermark } => {
            let config = &ctx.config().images;
            let mut opts = ComposeOptions::default().with_canvas(config.canvas);
            if let Some(path) = watermark.or_else(|| config.watermark.clone()) {
                let mark = load_watermark(&path)
                    .with_context(|| format!("loading watermark {}", path.display()))?;
                opts = opts.with_watermark(mark);
            }
            let client = reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(30))
                .build()
                .context("building http client")?;

            let mut report = AddReport {
                added: Vec::new(),
                rejected: Vec::new(),
                stored: 0,
            };
            for url in urls {
                match prepare_image(&client, &url, config.min_asset_bytes, &opts).await {
                    Ok((asset, data_uri)) => {
                        report.stored = drafts.append_image(data_uri).await?;
                        info!(url = %asset.hires_url, size = asset.size, "image stored");
                        report.added.push(asset.hires_url);
                    }
                    Err(err) => {
                        warn!(%url, "image skipped: {}", err);
                        report.rejected.push(Rejected {
                            url,
                            reason: err.to_string(),
                        });
                    }
                }
            }
            if report.added.is_empty() {
                report.stored = drafts.images().await?.len();
            }
            ctx.output().emit(&report, render)?;
            if report.added.is_empty() {
                bail!("no image could be added");
            }
        }
        ImagesAction::Clear => {
            drafts.clear_images().await?;
            println!("Images cleared");
        }
    }
    Ok(())
}
