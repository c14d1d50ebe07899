use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::identity::{AuthorRecord, IdentityKey};
use crate::Result;

pub const HEADER: [&str; 7] = [
    "author",
    "pseud",
    "author link",
    "pseud link",
    "works",
    "works in fandom",
    "bookmarks",
];

/// Append-only csv of recorded authors plus its `_readme.txt` run log.
#[derive(Debug, Clone)]
pub struct AuthorStore {
    csv_path: PathBuf,
    log_path: PathBuf,
}

impl AuthorStore {
    /// `name` is the base name, `author_ids` gives `author_ids.csv` and `author_ids_readme.txt`.
    pub fn new(name: &str) -> Self {
        Self {
            csv_path: PathBuf::from(format!("{name}.csv")),
            log_path: PathBuf::from(format!("{name}_readme.txt")),
        }
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Reads the identity of every recorded row. Writes the header row when the
    /// file is missing or empty. A leading header row is skipped, a headerless file
    /// is read from its first row.
    pub fn load_prior_keys(&self) -> Result<HashSet<IdentityKey>> {
        let mut keys = HashSet::new();

        let is_empty = match std::fs::metadata(&self.csv_path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };
        if is_empty {
            crate::info_time!("No existing file found; creating new file...");
            let mut wr = csv::Writer::from_path(&self.csv_path)?;
            wr.write_record(HEADER)?;
            wr.flush()?;
            return Ok(keys);
        }

        crate::info_time!("Loading existing IDs to avoid duplicates...");
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.csv_path)?;
        for (i, row) in rdr.records().enumerate() {
            let row = row?;
            if i == 0 && row.iter().eq(HEADER) {
                continue;
            }
            let author = row.get(0).unwrap_or_default();
            let pseud = row.get(1).unwrap_or_default();
            keys.insert(IdentityKey::new(author, pseud));
        }
        Ok(keys)
    }

    /// Appends one row per record, in order. Returns the number of rows written.
    pub fn append(&self, records: &[AuthorRecord]) -> Result<usize> {
        let file = OpenOptions::new().append(true).create(true).open(&self.csv_path)?;
        let mut wr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        for record in records {
            wr.write_record(record.to_row())?;
        }
        wr.flush()?;
        Ok(records.len())
    }

    /// Adds a block to the run log. `target` of `None` is logged as `-1`.
    pub fn write_run_log(&self, target: Option<usize>, url: &str, resume: bool) -> Result<()> {
        let requested = target.map_or(-1, |n| n as i64);
        let mut file = OpenOptions::new().append(true).create(true).open(&self.log_path)?;
        write!(
            file,
            "\nretrieved on: {}\nnum_requested_authors: {requested}\nurl: {url}\ncontinue: {resume}\n",
            Local::now()
        )?;
        Ok(())
    }
}
