//! Building sections, summaries, and the final DocumentResult.

use chrono::Utc;
use docgen_types::{
    canonical_section_id, success_rate, DocumentMetadata, DocumentResult, DocumentTypeSpec,
    GenerationError, Section, SectionOutcome, SectionSpec, SplitDocument, FAILURE_MARKER,
};
use std::collections::BTreeMap;
use std::time::Duration;

pub(crate) fn generated_section(index: usize, spec: &SectionSpec, content: String) -> Section {
    Section {
        index,
        id: spec.id.clone(),
        canonical_id: canonical_section_id(index),
        title: spec.title.clone(),
        content,
        outcome: SectionOutcome::Generated,
        error: None,
    }
}

/// Marked placeholder for a section whose call failed.
pub(crate) fn fallback_section(index: usize, spec: &SectionSpec, err: &GenerationError) -> Section {
    let message = err.to_string();
    Section {
        index,
        id: spec.id.clone(),
        canonical_id: canonical_section_id(index),
        title: format!("{} {}", spec.title, FAILURE_MARKER),
        content: format!(
            "The \"{}\" section could not be generated ({}). \
             The rest of the document was generated normally; regenerate the document \
             or write this section by hand.",
            spec.title, message
        ),
        outcome: SectionOutcome::Fallback,
        error: Some(message),
    }
}

/// Whitespace-collapsed prefix of at most `max_chars` characters, with `…` when cut.
pub(crate) fn summarize(content: &str, max_chars: usize) -> String {
    let collapsed = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let chars: Vec<char> = collapsed.chars().take(max_chars).collect();
    let keep = match chars.iter().rposition(|c| *c == ' ') {
        Some(pos) if pos > max_chars / 2 => pos,
        _ => chars.len(),
    };
    let mut cut: String = chars[..keep].iter().collect();
    cut.push('…');
    cut
}

pub(crate) fn fallback_summary(err: &GenerationError) -> String {
    format!("(not generated: {})", err)
}

fn render_block(heading: &str, sections: &[Section]) -> String {
    let mut out = format!("# {}", heading);
    for s in sections {
        out.push_str("\n\n## ");
        out.push_str(&s.title);
        out.push_str("\n\n");
        out.push_str(&s.content);
    }
    out
}

pub(crate) fn assemble(
    layout: &DocumentTypeSpec,
    sections: Vec<Section>,
    elapsed: Duration,
) -> DocumentResult {
    let content_by_id: BTreeMap<String, String> = sections
        .iter()
        .map(|s| (s.canonical_id.clone(), s.content.clone()))
        .collect();

    let split = layout.split.as_ref().map(|split| {
        let k = split.first_count.min(sections.len());
        SplitDocument {
            primary: render_block(&split.primary_heading, &sections[..k]),
            secondary: render_block(&split.secondary_heading, &sections[k..]),
        }
    });

    let total = sections.len();
    let failed = sections.iter().filter(|s| s.is_fallback()).count();
    let successful = total - failed;
    let metadata = DocumentMetadata {
        document_type: layout.document_type.clone(),
        total_sections: total,
        successful_generations: successful,
        failed_generations: failed,
        success_rate: success_rate(successful, total),
        generated_at: Utc::now(),
        duration_ms: elapsed.as_millis() as u64,
    };

    DocumentResult {
        sections,
        content_by_id,
        split,
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgen_types::{GenerationProfile, SplitSpec};

    fn spec(id: &str) -> SectionSpec {
        SectionSpec {
            id: id.into(),
            title: id.to_uppercase(),
            directive: "d".into(),
            max_tokens: None,
        }
    }

    #[test]
    fn summary_is_bounded_and_collapsed() {
        assert_eq!(summarize("  a \n b  ", 10), "a b");
        let long = "word ".repeat(100);
        let s = summarize(&long, 40);
        assert!(s.chars().count() <= 41);
        assert!(s.ends_with('…'));
        let unicode = "é".repeat(50);
        assert_eq!(summarize(&unicode, 10).chars().count(), 11);
    }

    #[test]
    fn word_boundary_counts_characters_not_bytes() {
        // Space at char 4 of a 12-char cut: too early to cut at, keep all 12 chars.
        let s = summarize("éééé ééééééééééééé", 12);
        assert_eq!(s, format!("éééé {}…", "é".repeat(7)));
        let s = summarize("ééééééé éé ééééééééé", 12);
        assert_eq!(s, "ééééééé éé…");
    }

    #[test]
    fn fallback_is_marked_and_explained() {
        let s = fallback_section(2, &spec("risks"), &GenerationError::Other("timeout".into()));
        assert_eq!(s.title, "RISKS (GENERATION FAILED)");
        assert!(s.content.contains("timeout"));
        assert!(s.is_fallback());
        assert_eq!(s.canonical_id, "section_03");
        assert_eq!(s.error.as_deref(), Some("generation error: timeout"));
    }

    #[test]
    fn split_and_canonical_map() {
        let layout = DocumentTypeSpec {
            document_type: "t".into(),
            display_name: String::new(),
            profile: GenerationProfile::default(),
            sections: vec![spec("a"), spec("b"), spec("c")],
            split: Some(SplitSpec {
                first_count: 1,
                primary_heading: "Part I".into(),
                secondary_heading: "Part II".into(),
            }),
        };
        let sections = vec![
            generated_section(0, &layout.sections[0], "alpha".into()),
            fallback_section(1, &layout.sections[1], &GenerationError::EmptyResponse),
            generated_section(2, &layout.sections[2], "gamma".into()),
        ];
        let doc = assemble(&layout, sections, Duration::from_millis(5));

        assert_eq!(doc.section("section_01"), Some("alpha"));
        assert_eq!(doc.content_by_id.len(), 3);
        let split = doc.split.unwrap();
        assert!(split.primary.starts_with("# Part I"));
        assert!(split.primary.contains("## A\n\nalpha"));
        assert!(!split.primary.contains("gamma"));
        assert!(split.secondary.starts_with("# Part II"));
        assert!(split.secondary.contains("gamma"));
        assert_eq!(doc.metadata.failed_generations, 1);
        assert_eq!(doc.metadata.success_rate, "67%");
        assert_eq!(doc.metadata.duration_ms, 5);
    }
}
