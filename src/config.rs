use std::time::Duration;

use clap::Parser;

use crate::{Error, Result};

pub const DEFAULT_STORE_NAME: &str = "author_ids";
pub const DEFAULT_COUNT: usize = 20;
/// Politeness delay before every page request.
pub const PAGE_DELAY: Duration = Duration::from_secs(5);
/// Wait before re-requesting a page answered with 429.
pub const RATE_LIMIT_DELAY: Duration = Duration::from_secs(10);

/// Scrape AO3 authors given a people search URL
#[derive(Debug, Parser)]
#[command(name = "fandom_authors")]
pub struct Args {
    /// A single URL pointing to an AO3 people search page
    pub url: String,

    /// Csv output file name, without extension
    #[arg(long, default_value = DEFAULT_STORE_NAME)]
    pub out_csv: String,

    /// User-agent header sent with every request
    #[arg(long, default_value = "")]
    pub header: String,

    /// Pick up where the csv file left off
    #[arg(long)]
    pub continue_csv: bool,

    /// How many author ids you want, -1 for no limit
    #[arg(long, default_value_t = DEFAULT_COUNT as i64, allow_negative_numbers = true)]
    pub num_to_retrieve: i64,
}

#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub url: String,
    pub store_name: String,
    pub user_agent: Option<String>,
    pub resume: bool,
    /// `None` harvests until an empty page.
    pub target: Option<usize>,
    pub page_delay: Duration,
    pub rate_limit_delay: Duration,
}

impl HarvestConfig {
    pub fn new(url: impl Into<String>, store_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            store_name: store_name.into(),
            user_agent: None,
            resume: false,
            target: Some(DEFAULT_COUNT),
            page_delay: PAGE_DELAY,
            rate_limit_delay: RATE_LIMIT_DELAY,
        }
    }
}

impl TryFrom<Args> for HarvestConfig {
    type Error = Error;

    fn try_from(args: Args) -> Result<Self> {
        let target = match args.num_to_retrieve {
            -1 => None,
            n => Some(usize::try_from(n).map_err(|_| Error::InvalidCount(n))?),
        };
        let user_agent = Some(args.header).filter(|h| !h.is_empty());

        Ok(Self {
            user_agent,
            resume: args.continue_csv,
            target,
            ..Self::new(args.url, args.out_csv)
        })
    }
}
