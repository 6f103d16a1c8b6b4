//! Augmented prompt construction.

use crate::config::prompts::{CONTEXT_CLOSE, CONTEXT_OPEN, PASSAGE_SEPARATOR, QUESTION_HEADER};

/// Wrap retrieved passages and the user's question in the fixed template.
///
/// The layout is byte-exact: opening delimiter, passages joined by the
/// separator, closing delimiter, then the question section.
pub fn build_augmented_prompt<S: AsRef<str>>(contexts: &[S], query: &str) -> String {
    let passages = contexts
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<&str>>()
        .join(PASSAGE_SEPARATOR);

    let mut prompt = String::with_capacity(
        CONTEXT_OPEN.len() + passages.len() + CONTEXT_CLOSE.len() + QUESTION_HEADER.len() + query.len(),
    );
    prompt.push_str(CONTEXT_OPEN);
    prompt.push_str(&passages);
    prompt.push_str(CONTEXT_CLOSE);
    prompt.push_str(QUESTION_HEADER);
    prompt.push_str(query);
    prompt
}
