use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use handoff_store::{DraftError, ListingDraft};
use relay_core_types::ConditionCode;
use serde::Serialize;
use tracing::info;

use crate::cli::context::CliContext;

/// Where the listing flow continues once a draft is finalized.
pub const PRELIST_URL: &str = "https://www.ebay.com/sl/prelist/suggest";

#[derive(Args, Clone, Debug)]
pub struct DraftArgs {
    #[command(subcommand)]
    pub action: DraftAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum DraftAction {
    /// Show the stored draft
    Show,

    /// Set draft fields
    Set(DraftFields),

    /// Remove every draft key from the store
    Clear,

    /// Check the draft can be handed to the listing pages
    Finalize,
}

#[derive(Args, Clone, Debug, Default)]
pub struct DraftFields {
    #[arg(long)]
    pub title: Option<String>,

    /// Decimal amount, e.g. 19.99
    #[arg(long)]
    pub price: Option<String>,

    #[arg(long)]
    pub sku: Option<String>,

    /// Numeric condition code (1000 new, 3000 used, ...)
    #[arg(long)]
    pub condition: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Serialize)]
struct DraftView {
    title: String,
    price: String,
    sku: String,
    condition: u32,
    images: usize,
    description: Option<String>,
    source_url: Option<String>,
}

fn render(view: &DraftView) -> String {
    let blank = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };
    let mut out = vec![
        format!("title:       {}", blank(&view.title)),
        format!("price:       {}", blank(&view.price)),
        format!("sku:         {}", blank(&view.sku)),
        format!("condition:   {}", view.condition),
        format!("images:      {}", view.images),
    ];
    if let Some(description) = &view.description {
        out.push(format!("description: {}", description));
    }
    if let Some(url) = &view.source_url {
        out.push(format!("source:      {}", url));
    }
    out.join("\n")
}

/// Applies the given fields; returns how many were set.
pub fn apply_fields(draft: &mut ListingDraft, fields: DraftFields) -> usize {
    let mut changed = 0;
    if let Some(title) = fields.title {
        draft.title = title.trim().to_string();
        changed += 1;
    }
    if let Some(price) = fields.price {
        draft.price = price.trim().to_string();
        changed += 1;
    }
    if let Some(sku) = fields.sku {
        draft.sku = sku.trim().to_string();
        changed += 1;
    }
    if let Some(code) = fields.condition {
        draft.condition = ConditionCode::parse_lenient(&code);
        changed += 1;
    }
    if let Some(description) = fields.description {
        let description = description.trim().to_string();
        draft.description = (!description.is_empty()).then_some(description);
        changed += 1;
    }
    changed
}

pub async fn cmd_draft(args: DraftArgs, ctx: &CliContext) -> Result<()> {
    let drafts = ctx.drafts().await?;
    match args.action {
        DraftAction::Show => {
            let draft = drafts.load_for_dispatch().await?;
            let (source_url, _) = drafts.source().await?;
            let view = DraftView {
                title: draft.title,
                price: draft.price,
                sku: draft.sku,
                condition: draft.condition.code(),
                images: draft.images.len(),
                description: draft.description,
                source_url,
            };
            ctx.output().emit(&view, render)?;
        }
        DraftAction::Set(fields) => {
            let mut draft = drafts.load().await?;
            if apply_fields(&mut draft, fields) == 0 {
                bail!("nothing to set; pass at least one field");
            }
            drafts.save(&draft).await?;
            info!(title = %draft.title, "draft updated");
            println!("Draft saved");
        }
        DraftAction::Clear => {
            drafts.clear().await?;
            println!("Draft cleared");
        }
        DraftAction::Finalize => {
            let draft = drafts.load_for_dispatch().await?;
            match draft.validate_dispatchable() {
                Ok(()) => {
                    info!(sku = %draft.sku, images = draft.images.len(), "draft ready");
                    println!("Draft ready. Continue at {}", PRELIST_URL);
                }
                Err(DraftError::MissingPrice) => {
                    println!("{}", DraftError::MissingPrice);
                    bail!("draft is missing a price");
                }
                Err(err) => bail!("draft not ready: {}", err),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_overwrite_only_what_was_given() {
        let mut draft = ListingDraft {
            title: "Old".into(),
            price: "10".into(),
            ..ListingDraft::default()
        };
        let changed = apply_fields(
            &mut draft,
            DraftFields {
                price: Some(" 12.50 ".into()),
                condition: Some("3000".into()),
                description: Some("  ".into()),
                ..DraftFields::default()
            },
        );
        assert_eq!(changed, 3);
        assert_eq!(draft.title, "Old");
        assert_eq!(draft.price, "12.50");
        assert_eq!(draft.condition, ConditionCode::Used);
        assert_eq!(draft.description, None);
    }

    #[test]
    fn unknown_condition_code_reads_as_new() {
        let mut draft = ListingDraft::default();
        apply_fields(
            &mut draft,
            DraftFields {
                condition: Some("9999".into()),
                ..DraftFields::default()
            },
        );
        assert_eq!(draft.condition, ConditionCode::New);
    }
}
