//! Typed result pages and their assembly from engine responses

mod assembler;
mod page;
mod types;

pub use assembler::{create_page, create_terms_page};
pub use page::*;
pub use types::*;
