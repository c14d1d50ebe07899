use scraper::{ElementRef, Html, Selector};

use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLink {
    pub text: String,
    pub href: String,
}

/// One author blurb as found on the page, fields still free text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCandidate {
    pub links: Vec<RawLink>,
    pub works: Option<String>,
    pub works_in_scope: Option<String>,
    pub bookmarks: Option<String>,
}

/// Turns the raw body of a listing page into author blurbs, in page order.
pub trait RecordExtractor: Send + Sync {
    fn extract(&self, html: &str) -> Result<Vec<RawCandidate>>;
}

/// Extractor for the archive's people-search markup.
pub struct HtmlExtractor {
    blurb: Selector,
    name_link: Selector,
    count_link: Selector,
}

impl HtmlExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            blurb: create_selector("li.user > .header:first-child")?,
            name_link: create_selector("h4 a")?,
            count_link: create_selector("h5 a")?,
        })
    }

    fn extract_blurb(&self, blurb: ElementRef<'_>) -> RawCandidate {
        let links = blurb
            .select(&self.name_link)
            .filter_map(|a| {
                let href = a.value().attr("href")?;
                Some(RawLink {
                    text: element_text(a),
                    href: href.to_string(),
                })
            })
            .collect();

        let mut candidate = RawCandidate {
            links,
            ..Default::default()
        };
        // "12 works in Glee" / "3 bookmarks" / "40 works"
        for a in blurb.select(&self.count_link) {
            let text = element_text(a);
            if text.contains(" in ") {
                candidate.works_in_scope = Some(text);
            } else if text.contains("bookmark") {
                candidate.bookmarks = Some(text);
            } else {
                candidate.works = Some(text);
            }
        }
        candidate
    }
}

impl RecordExtractor for HtmlExtractor {
    fn extract(&self, html: &str) -> Result<Vec<RawCandidate>> {
        let doc = Html::parse_document(html);
        // A listing page holds at most 50 people.
        let mut candidates = Vec::with_capacity(50);
        for blurb in doc.select(&self.blurb) {
            candidates.push(self.extract_blurb(blurb));
        }
        Ok(candidates)
    }
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::ParseMissingSelector(sel_str.into()))
}

#[inline]
fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}
