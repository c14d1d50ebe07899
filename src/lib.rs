//! Harvests author records from an AO3 people-search listing into an
//! append-only csv, page by page, skipping authors recorded before.

mod error;
mod macros;

pub mod config;
pub mod identity;
pub mod paginate;
pub mod parse;
pub mod process;
pub mod request;
pub mod store;

pub use config::{Args, HarvestConfig};
pub use error::{Error, Result};
pub use identity::{AuthorRecord, IdentityKey, IdentityResolver};
pub use parse::{HtmlExtractor, RawCandidate, RawLink, RecordExtractor};
pub use process::{HarvestState, Harvester};
pub use request::{Page, PageFetcher, ReqwestFetcher};
pub use store::AuthorStore;
