//! docgen REST API: document submission, job status polling, and SSE job events.

pub mod config;
pub mod server;
