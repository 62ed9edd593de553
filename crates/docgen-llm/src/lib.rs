//! Section generators: OpenAI-compatible client and, behind `test-util`, a mock.

#[cfg(any(test, feature = "test-util"))]
pub mod mock;
mod openai;
mod prompt;

pub use docgen_types::{GenerationError, Generator};
pub use openai::OpenAiGenerator;
pub use prompt::{build_messages, Message};

#[cfg(any(test, feature = "test-util"))]
pub use mock::MockGenerator;
