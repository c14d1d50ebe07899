use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;

use chrono::Local;
use tokio::{task::spawn_blocking, time::sleep};

use crate::config::HarvestConfig;
use crate::identity::{AuthorRecord, IdentityKey, IdentityResolver};
use crate::paginate::advance;
use crate::parse::{RawCandidate, RecordExtractor};
use crate::request::{Page, PageFetcher};
use crate::store::AuthorStore;
use crate::{info_time, warn_time, Error, Result};

/// Mutable state of one run. Only the store outlives it.
#[derive(Debug, Clone)]
pub struct HarvestState {
    pub current_url: String,
    pub seen_keys: HashSet<IdentityKey>,
    /// Rows appended by this run only.
    pub recorded_count: usize,
    pub target: Option<usize>,
    pub page_was_empty: bool,
}

impl HarvestState {
    pub fn new(url: impl Into<String>, target: Option<usize>, seen_keys: HashSet<IdentityKey>) -> Self {
        Self {
            current_url: url.into(),
            seen_keys,
            recorded_count: 0,
            target,
            page_was_empty: false,
        }
    }

    /// Checked once per page, so the last page may overshoot the target.
    pub fn should_continue(&self) -> bool {
        !self.page_was_empty && self.target.map_or(true, |t| self.recorded_count < t)
    }
}

/// Drives fetch -> extract -> resolve -> persist -> advance, one page at a time.
pub struct Harvester<F, E> {
    config: HarvestConfig,
    fetcher: F,
    extractor: Arc<E>,
    resolver: IdentityResolver,
    store: AuthorStore,
}

impl<F, E> Harvester<F, E>
where
    F: PageFetcher,
    E: RecordExtractor + 'static,
{
    pub fn new(config: HarvestConfig, fetcher: F, extractor: E) -> Self {
        let store = AuthorStore::new(&config.store_name);
        Self {
            config,
            fetcher,
            extractor: Arc::new(extractor),
            resolver: IdentityResolver::new(),
            store,
        }
    }

    pub fn store(&self) -> &AuthorStore {
        &self.store
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Writes the run log, loads prior identities and harvests until the
    /// target is reached or a page comes back empty.
    pub async fn run(&self) -> Result<HarvestState> {
        let start_time = Local::now();
        let cfg = &self.config;

        self.store.write_run_log(cfg.target, &cfg.url, cfg.resume)?;
        info_time!("Loading existing file... (continue: {})", cfg.resume);
        let seen = self.store.load_prior_keys()?;
        info_time!("{} authors already recorded", seen.len());

        let mut state = HarvestState::new(cfg.url.clone(), cfg.target, seen);
        info_time!("Processing...");
        while state.should_continue() {
            self.harvest_page(&mut state).await?;
        }
        println!();
        info_time!(
            start_time,
            "Done. Recorded {} new authors.",
            state.recorded_count
        );
        Ok(state)
    }

    /// One full iteration of the loop for `state.current_url`.
    pub async fn harvest_page(&self, state: &mut HarvestState) -> Result<()> {
        sleep(self.config.page_delay).await;
        let page = self.fetch_page(&state.current_url).await?;
        progress_marker()?;

        let candidates = self.extract(page.body).await?;
        if candidates.is_empty() {
            state.page_was_empty = true;
        }

        let records: Vec<AuthorRecord> = candidates
            .iter()
            .filter_map(|c| self.resolver.resolve(c, &mut state.seen_keys))
            .collect();
        state.recorded_count += self.store.append(&records)?;

        state.current_url = advance(&state.current_url)?;
        Ok(())
    }

    /// Retries the same url for as long as it is answered with 429.
    async fn fetch_page(&self, url: &str) -> Result<Page> {
        loop {
            let page = self.fetcher.fetch(url).await?;
            if page.is_rate_limited() {
                warn_time!("Request answered with Status-Code 429, waiting before retrying... Info: {}", url);
                sleep(self.config.rate_limit_delay).await;
                continue;
            }
            if !page.is_success() {
                return Err(Error::UnexpectedStatus {
                    status: page.status,
                    url: url.into(),
                });
            }
            return Ok(page);
        }
    }

    async fn extract(&self, body: String) -> Result<Vec<RawCandidate>> {
        let extractor = Arc::clone(&self.extractor);
        spawn_blocking(move || extractor.extract(&body)).await?
    }
}

fn progress_marker() -> Result<()> {
    let mut out = std::io::stdout();
    out.write_all(b".")?;
    out.flush()?;
    Ok(())
}
