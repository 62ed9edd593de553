//! Chat messages for one section call.

use docgen_types::SectionRequest;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// "system", "user", or "assistant"
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// System + user message for a section request. Earlier sections only contribute their
/// summaries, which keeps the prompt size flat as the document grows.
pub fn build_messages(req: &SectionRequest) -> Vec<Message> {
    let system = format!(
        "You write one section of a multi-section {} document. \
         Write only the body of the requested section, without a preamble.",
        req.document_type.replace('_', " ")
    );

    let mut user = String::new();
    if let Some(subject) = req.context.subject.as_deref() {
        let _ = writeln!(user, "Subject: {}", subject.trim());
    }
    if !req.context.parameters.is_empty() {
        user.push_str("Details:\n");
        for (k, v) in &req.context.parameters {
            let _ = writeln!(user, "- {}: {}", k, v);
        }
    }
    if !req.prior_summaries.is_empty() {
        user.push_str("\nSections written so far:\n");
        for s in &req.prior_summaries {
            let _ = writeln!(user, "{}. {}: {}", s.index + 1, s.title, s.summary);
        }
    }
    let _ = write!(
        user,
        "\nWrite section {} of {}: {}\n{}",
        req.index + 1,
        req.total,
        req.section.title,
        req.section.directive
    );
    if req.is_first() {
        user.push_str("\nThis section opens the document.");
    } else if req.is_last() {
        user.push_str("\nThis section closes the document; do not repeat earlier sections.");
    }

    vec![Message::system(system), Message::user(user)]
}
