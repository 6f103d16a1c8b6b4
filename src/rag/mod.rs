//! Retrieval and prompt assembly for question answering.

mod prompt;
mod retriever;

pub use prompt::build_augmented_prompt;
pub use retriever::Retriever;
