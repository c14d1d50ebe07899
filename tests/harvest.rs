use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use fandom_authors::{
    Error, HarvestConfig, Harvester, HtmlExtractor, Page, PageFetcher, Result,
};

/// Answers requests from a queue; once drained every page is an empty listing.
struct ScriptedFetcher {
    pages: Mutex<VecDeque<Page>>,
    requested: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    fn new(pages: Vec<Page>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            requested: Mutex::new(Vec::new()),
        }
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<Page> {
        self.requested.lock().unwrap().push(url.to_string());
        let page = self.pages.lock().unwrap().pop_front();
        Ok(page.unwrap_or_else(|| ok(listing(&[]))))
    }
}

fn ok(body: String) -> Page {
    Page { status: 200, body }
}

fn status(status: u16) -> Page {
    Page {
        status,
        body: String::new(),
    }
}

fn blurb(author: &str, pseud: Option<&str>) -> String {
    let links = match pseud {
        Some(p) => format!(
            r#"<a href="/users/{author}/pseuds/{p}">{p}</a> (<a href="/users/{author}">{author}</a>)"#
        ),
        None => format!(r#"<a href="/users/{author}/pseuds/{author}">{author}</a>"#),
    };
    format!(
        r#"<li class="user pseud picture blurb group"><div class="header module">
<h4 class="heading">{links}</h4>
<h5 class="heading"><a href="/w">5 works</a>, <a href="/w?f=1">2 works in Glee</a>, <a href="/b">1 bookmark</a></h5>
</div></li>"#
    )
}

fn listing(authors: &[&str]) -> String {
    let blurbs: String = authors.iter().map(|a| blurb(a, None)).collect();
    format!(r#"<html><body><ol class="user pseud group">{blurbs}</ol></body></html>"#)
}

fn config(dir: &tempfile::TempDir, url: &str, target: Option<usize>) -> HarvestConfig {
    let name = dir.path().join("authors");
    HarvestConfig {
        target,
        page_delay: Duration::ZERO,
        rate_limit_delay: Duration::ZERO,
        ..HarvestConfig::new(url, name.to_str().unwrap())
    }
}

fn rows(path: &Path) -> Vec<Vec<String>> {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    rdr.records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect()
}

struct Outcome {
    recorded: usize,
    rows: Vec<Vec<String>>,
    requested: Vec<String>,
}

async fn harvest(cfg: HarvestConfig, pages: Vec<Page>) -> Result<Outcome> {
    let harvester = Harvester::new(cfg, ScriptedFetcher::new(pages), HtmlExtractor::new()?);
    let state = harvester.run().await?;
    Ok(Outcome {
        recorded: state.recorded_count,
        rows: rows(harvester.store().csv_path()),
        requested: harvester.fetcher().requested(),
    })
}

#[tokio::test]
async fn stops_after_the_page_that_reaches_the_target() {
    let dir = tempfile::tempdir().unwrap();
    let pages = vec![
        ok(listing(&["a1", "a2", "a3"])),
        ok(listing(&["b1", "b2", "b3"])),
        ok(listing(&["c1", "c2", "c3"])),
    ];

    let cfg = config(&dir, "https://x/people/search?query=glee", Some(5));
    let out = harvest(cfg, pages).await.unwrap();

    assert_eq!(out.recorded, 6);
    assert_eq!(out.rows.len(), 6);
    assert_eq!(
        out.requested,
        vec![
            "https://x/people/search?query=glee",
            "https://x/people/search?query=glee&page=2",
        ]
    );
}

#[tokio::test]
async fn empty_first_page_finishes_cleanly() {
    let dir = tempfile::tempdir().unwrap();

    let out = harvest(config(&dir, "https://x", Some(20)), vec![ok(listing(&[]))])
        .await
        .unwrap();

    assert_eq!(out.recorded, 0);
    assert!(out.rows.is_empty());
    assert_eq!(out.requested, vec!["https://x"]);
}

#[tokio::test]
async fn rate_limited_page_is_retried_and_extracted_once() {
    let dir = tempfile::tempdir().unwrap();
    let pages = vec![status(429), ok(listing(&["alice", "bob"])), ok(listing(&[]))];

    let out = harvest(config(&dir, "https://x/?page=1", None), pages)
        .await
        .unwrap();

    assert_eq!(out.recorded, 2);
    assert_eq!(out.rows.len(), 2);
    assert_eq!(
        out.requested,
        vec!["https://x/?page=1", "https://x/?page=1", "https://x/?page=2"]
    );
}

#[tokio::test]
async fn rows_are_unique_and_in_encounter_order() {
    let dir = tempfile::tempdir().unwrap();
    let pages = vec![
        ok(listing(&["a", "b", "a"])),
        ok(format!(
            r#"<html><body><ol>{}{}{}</ol></body></html>"#,
            blurb("b", None),
            blurb("c", None),
            blurb("b", Some("pen")),
        )),
    ];

    let out = harvest(config(&dir, "https://x", None), pages).await.unwrap();

    assert_eq!(out.recorded, 4);
    let keys: Vec<(&str, &str)> = out
        .rows
        .iter()
        .map(|r| (r[0].as_str(), r[1].as_str()))
        .collect();
    assert_eq!(keys, vec![("a", ""), ("b", ""), ("c", ""), ("b", "pen")]);
    assert_eq!(
        out.rows[3],
        vec![
            "b",
            "pen",
            "https://archiveofourown.org/users/b",
            "https://archiveofourown.org/users/b/pseuds/pen",
            "5",
            "2",
            "1",
        ]
    );
}

#[tokio::test]
async fn resumed_run_appends_nothing_new() {
    let dir = tempfile::tempdir().unwrap();
    let script = || {
        vec![
            ok(listing(&["a", "b", "c"])),
            ok(listing(&["d", "e"])),
            ok(listing(&[])),
        ]
    };

    let first = harvest(config(&dir, "https://x", None), script())
        .await
        .unwrap();
    assert_eq!(first.recorded, 5);
    assert_eq!(first.rows.len(), 5);

    let cfg = HarvestConfig {
        resume: true,
        ..config(&dir, "https://x", None)
    };
    let second = harvest(cfg, script()).await.unwrap();
    assert_eq!(second.recorded, 0);
    assert_eq!(second.rows, first.rows);

    let log = std::fs::read_to_string(dir.path().join("authors_readme.txt")).unwrap();
    assert_eq!(log.matches("url: https://x\n").count(), 2);
}

#[tokio::test]
async fn unexpected_status_is_fatal() {
    let dir = tempfile::tempdir().unwrap();

    let res = harvest(config(&dir, "https://x", Some(20)), vec![status(503)]).await;
    let Err(err) = res else {
        panic!("503 must end the run");
    };
    assert!(matches!(err, Error::UnexpectedStatus { status: 503, .. }));
    assert!(err.to_string().contains("only 429 is retried"));
}

#[tokio::test]
async fn malformed_page_number_fails_after_persisting_the_page() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(&dir, "https://x/?page=two", Some(20));

    let res = harvest(cfg, vec![ok(listing(&["a", "b"]))]).await;
    assert!(matches!(res, Err(Error::MalformedPageParam { .. })));
    assert_eq!(rows(&dir.path().join("authors.csv")).len(), 2);
}
