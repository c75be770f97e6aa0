//! Template module
//!
//! [`SolrTemplate`] is the entry point: it dispatches queries to the parser
//! registry, runs every remote call through [`SolrTemplate::execute`] and
//! turns responses into typed pages or cursors.

mod builder;
mod executor;
mod translator;

pub use builder::SolrTemplateBuilder;
pub use executor::{SolrTemplate, TemplateCursorLoader};
pub use translator::{ExceptionTranslator, SolrExceptionTranslator};
