//! Query model and query parsing
//!
//! Callers describe what they want with [`Query`] and its facet, highlight
//! and terms wrappers. A [`QueryParsers`] registry turns a [`DataQuery`] into
//! the engine's [`NativeQuery`] parameters, naming facet, group and highlight
//! sub-queries in a [`NamedObjects`] association along the way.

mod criteria;
mod facet;
mod highlight;
mod models;
mod named;
mod native;
mod parser;
mod registry;
mod terms;

pub use criteria::*;
pub use facet::*;
pub use highlight::*;
pub use models::*;
pub use named::*;
pub use native::*;
pub use parser::*;
pub use registry::*;
pub use terms::*;
