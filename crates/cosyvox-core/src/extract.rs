//! Speech-token extraction from decoded engine output.
//!
//! The generated continuation is decoded text in which each speech token
//! appears as a `<|speech-N|>` marker. The marker format and the stop marker
//! are the wire contract with the decoding alphabet and must not change
//! independently of the paired encoder and bias asset.

use regex::Regex;
use std::sync::LazyLock;

/// Stop marker whose emission ends decoding for a sequence.
pub const STOP_MARKER: &str = "<|cos_eos|>";

/// Lexical form of one generated speech token.
static SPEECH_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\|speech-(\d+)\|>").expect("valid speech token regex"));

/// Extract generated speech-token ids from decoded text, collecting markers
/// in order of occurrence up to (and excluding) the first stop marker.
///
/// Text with no markers yields an empty list. A marker cut off at the
/// max-token boundary (e.g. a trailing `<|speech-12`) never completes the
/// pattern and is dropped.
pub fn extract_speech_tokens(text: &str) -> Vec<u32> {
    let generated = match text.find(STOP_MARKER) {
        Some(idx) => &text[..idx],
        None => text,
    };

    SPEECH_TOKEN_RE
        .captures_iter(generated)
        .filter_map(|cap| cap[1].parse::<u32>().ok())
        .collect()
}
