//! solr-template: typed, async access to a Solr search engine
//!
//! Domain queries are turned into engine parameters by a registry of query
//! parsers, executed through a single call wrapper that translates every
//! failure, and reassembled into typed pages (scored, facet, group,
//! highlight, stats, terms) or a lazy cursor.

pub mod client;
pub mod config;
pub mod convert;
pub mod cursor;
pub mod error;
pub mod query;
pub mod results;
pub mod template;

pub use config::Settings;
pub use convert::{MappingSolrConverter, SolrConverter, SolrEntity};
pub use cursor::Cursor;
pub use error::{Result, SolrError};
pub use query::{Criteria, DataQuery, FacetQuery, HighlightQuery, Query, QueryKind, TermsQuery};
pub use results::{Page, ResultPage, TermsPage};
pub use template::{SolrTemplate, SolrTemplateBuilder};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
