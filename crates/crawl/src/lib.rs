//! Crawl YANG source trees into the module catalog.
//!
//! A crawl runs in three steps:
//!
//! 1. [`crawl`] walks the source trees, gives every `.yang` file its
//!    canonical URL (from the part of the published tree it lives in), and
//!    parses the header of every module.
//! 2. [`populate`] turns a parsed module into a catalog document, resolving
//!    submodule URLs through the crawl's [`UrlIndex`].
//! 3. [`ingest`] inserts the documents, skipping any `(name, version)` that
//!    is already cataloged: re-crawling an older commit must never replace
//!    what is there.

mod crawl;
pub mod error;
mod ingest;
mod populate;
mod walk;
pub mod yang;

pub use crate::crawl::{Crawl, UrlIndex, crawl};
pub use crate::ingest::{Ingest, IngestReport, ingest, ingest_module};
pub use crate::populate::populate;
pub use crate::walk::Zone;
pub use crate::yang::SourceModule;

/// Organization crawled modules are cataloged under unless told otherwise.
pub const DEFAULT_ORG: &str = "openconfig";
