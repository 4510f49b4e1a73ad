//! Comment import from third-party export formats
//!
//! Importers convert an export into [`Comment`](crate::comment::Comment)
//! values and commit them through [`DataStore::create`](crate::service::DataStore::create),
//! so imported comments get the same ID, sanitizing and IP hashing rules as
//! comments posted directly.

mod disqus;

pub use disqus::{Disqus, DisqusComments};

use crate::error::Result;
use std::io::BufRead;

/// Trait for export importers
pub trait Importer {
    /// Import all comments from `reader` into `site_id`, returning how many were stored
    fn import(&self, reader: &mut dyn BufRead, site_id: &str) -> Result<usize>;

    /// Name of the export format
    fn format_name(&self) -> &str;
}
