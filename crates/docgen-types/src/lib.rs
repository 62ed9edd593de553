//! Core types and traits for docgen: job lifecycle, document model, generation contract.

mod context;
mod document;
mod error;
mod job;
mod layout;
mod traits;

pub use context::*;
pub use document::*;
pub use error::*;
pub use job::*;
pub use layout::*;
pub use traits::*;
