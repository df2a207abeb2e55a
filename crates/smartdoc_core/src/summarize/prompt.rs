//! Prompt text shared by the LLM-backed providers.

use crate::domain::SummaryLength;

/// Sampling temperature used by every LLM provider.
pub const TEMPERATURE: f32 = 0.3;

pub const SYSTEM_PROMPT: &str = "You are a professional document summarization assistant. \
Provide clear, accurate, and well-structured summaries.";

/// Builds the user prompt asking for a summary of `document_text` at the given length.
pub fn build_prompt(document_text: &str, length: SummaryLength) -> String {
    format!(
        "Please analyze and summarize the following document. {instruction}\n\n\
         Focus on:\n\
         - Main topics and themes\n\
         - Key findings or conclusions\n\
         - Important details and data\n\
         - Overall purpose and context\n\n\
         Document Text:\n{document_text}\n\n\
         Please provide a clear, well-structured summary:",
        instruction = length.instruction(),
    )
}

/// Prompt for summarizing one chunk of a longer document within a word window.
pub fn build_chunk_prompt(chunk: &str, min_words: usize, max_words: usize) -> String {
    format!(
        "Summarize the following passage in between {min_words} and {max_words} words. \
         Respond with the summary only.\n\n{chunk}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_instruction_and_text() {
        let prompt = build_prompt("Quarterly revenue grew.", SummaryLength::Short);
        assert!(prompt.contains("2-3 sentences"));
        assert!(prompt.contains("Document Text:\nQuarterly revenue grew."));
        assert!(prompt.ends_with("well-structured summary:"));
    }

    #[test]
    fn chunk_prompt_states_word_window() {
        let prompt = build_chunk_prompt("passage", 30, 100);
        assert!(prompt.contains("between 30 and 100 words"));
    }
}
