use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    listing_relay::cli::run().await
}
