//! Prompt construction for speech-token generation.

use crate::config::SpecialTokenIds;
use crate::TokenId;

/// Flattens one (text, reference speech) request into a single prompt
/// sequence the generation engine can consume directly.
#[derive(Debug, Clone)]
pub struct PromptEncoder {
    tokens: SpecialTokenIds,
}

impl PromptEncoder {
    pub fn new(tokens: SpecialTokenIds) -> Self {
        Self { tokens }
    }

    /// Encode one request:
    /// `[text_start] ++ text ++ [speech_start] ++ ref speech shifted into the
    /// speech id range`.
    ///
    /// Pure concatenation with no failure path; reference ids are expected to
    /// lie in `[0, speech_vocab_size)` so the shifted ids stay inside the
    /// model vocabulary. Context-length violations are reported by the
    /// engine, not here.
    pub fn encode(&self, text: &[TokenId], ref_speech: &[TokenId]) -> Vec<TokenId> {
        let mut prompt = Vec::with_capacity(2 + text.len() + ref_speech.len());
        prompt.push(self.tokens.text_start_id);
        prompt.extend_from_slice(text);
        prompt.push(self.tokens.speech_start_id);
        prompt.extend(
            ref_speech
                .iter()
                .map(|&t| t + self.tokens.speech_id_offset),
        );
        prompt
    }

    pub fn special_tokens(&self) -> &SpecialTokenIds {
        &self.tokens
    }
}
