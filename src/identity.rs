use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::parse::{RawCandidate, RawLink};
use crate::warn_time;

pub const SITE_ORIGIN: &str = "https://archiveofourown.org";
const PSEUD_PATH_MARKER: &str = "/pseuds/";

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("digit regex is valid"));

/// Dedup discriminant: `"{author}/{pseud}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn new(author: &str, pseud: &str) -> Self {
        Self(format!("{author}/{pseud}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRecord {
    pub author: String,
    pub author_link: String,
    pub pseud: String,
    pub pseud_link: String,
    pub works: u64,
    pub works_in_scope: u64,
    pub bookmarks: u64,
}

impl AuthorRecord {
    pub fn key(&self) -> IdentityKey {
        IdentityKey::new(&self.author, &self.pseud)
    }

    /// Column order of the store: author, pseud, author link, pseud link, works, works in fandom, bookmarks.
    pub fn to_row(&self) -> [String; 7] {
        [
            self.author.clone(),
            self.pseud.clone(),
            self.author_link.clone(),
            self.pseud_link.clone(),
            self.works.to_string(),
            self.works_in_scope.to_string(),
            self.bookmarks.to_string(),
        ]
    }
}

/// Returns the first run of decimal digits in `text`, if any.
/// A run too large for `u64` yields `None`.
pub fn first_number(text: &str) -> Option<u64> {
    DIGITS.find(text).and_then(|m| m.as_str().parse().ok())
}

/// Missing field counts as zero.
#[inline]
fn count(field: Option<&str>) -> u64 {
    field.and_then(first_number).unwrap_or(0)
}

/// Rewrites a site-relative link against the site origin. Absolute links pass through.
pub fn absolute_link(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{SITE_ORIGIN}{href}")
    }
}

/// Turns raw blurbs into canonical records, dropping identities seen before.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityResolver;

impl IdentityResolver {
    pub fn new() -> Self {
        Self
    }

    /// Returns `None` for duplicates and for blurbs without any name link.
    /// A fresh key is inserted into `seen` before the record is returned.
    pub fn resolve(
        &self,
        candidate: &RawCandidate,
        seen: &mut HashSet<IdentityKey>,
    ) -> Option<AuthorRecord> {
        let (author, pseud) = split_links(&candidate.links);
        let Some(author) = author else {
            warn_time!("skipping author blurb without any name link");
            return None;
        };

        let (pseud, pseud_link) = match pseud {
            Some(link) => (link.text.clone(), absolute_link(&link.href)),
            None => (String::new(), String::new()),
        };

        let record = AuthorRecord {
            author: author.text.clone(),
            author_link: absolute_link(&author.href),
            pseud,
            pseud_link,
            works: count(candidate.works.as_deref()),
            works_in_scope: count(candidate.works_in_scope.as_deref()),
            bookmarks: count(candidate.bookmarks.as_deref()),
        };

        if seen.insert(record.key()) {
            Some(record)
        } else {
            None
        }
    }
}

/// Picks (author, pseud) out of the name links. The last link of each kind wins.
/// A lone pseud link is promoted to the author slot.
fn split_links(links: &[RawLink]) -> (Option<&RawLink>, Option<&RawLink>) {
    let mut author = None;
    let mut pseud = None;
    for link in links {
        if link.href.contains(PSEUD_PATH_MARKER) {
            pseud = Some(link);
        } else {
            author = Some(link);
        }
    }

    match author {
        Some(author) => (Some(author), pseud),
        None => (pseud, None),
    }
}
