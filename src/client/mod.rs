//! Wire client module
//!
//! HTTP transport to the engine, the request/response models it speaks, and
//! the factory the template obtains clients from.

mod error;
mod factory;
mod http;
mod request;
mod response;

pub use error::ClientError;
pub use factory::{HttpSolrClientFactory, SolrClientFactory};
pub use http::SolrClient;
pub use request::{HttpMethod, SolrRequest};
pub use response::*;
