use clap::Parser;
use fandom_authors::{Args, HarvestConfig, Harvester, HtmlExtractor, ReqwestFetcher, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let config = HarvestConfig::try_from(Args::parse())?;
    let fetcher = ReqwestFetcher::new(config.user_agent.clone());
    let harvester = Harvester::new(config, fetcher, HtmlExtractor::new()?);
    harvester.run().await?;

    Ok(())
}
