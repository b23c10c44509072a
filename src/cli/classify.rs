use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::context::CliContext;
use crate::pages::{classify_url, PageKind};

#[derive(Args, Clone, Debug)]
pub struct ClassifyArgs {
    /// Page URL
    pub url: String,
}

#[derive(Serialize)]
struct Classification {
    url: String,
    kind: PageKind,
}

pub fn cmd_classify(args: ClassifyArgs, ctx: &CliContext) -> Result<()> {
    let kind = classify_url(&args.url);
    ctx.output().emit(
        &Classification {
            url: args.url,
            kind,
        },
        |c| c.kind.to_string(),
    )
}
