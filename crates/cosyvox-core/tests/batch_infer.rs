//! Integration tests for the batch inference driver against scripted engines.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cosyvox_core::{
    BiasVector, CandidateOutput, DecodingConfig, EngineOutput, Error, FinishReason,
    GenerationEngine, LogitsProcessor, OfflineInference, Result, SpecialTokenIds, TokenId,
};

fn test_tokens() -> SpecialTokenIds {
    SpecialTokenIds {
        text_start_id: 1000,
        speech_start_id: 1001,
        speech_id_offset: 1002,
        speech_vocab_size: 100,
    }
}

fn flat_bias() -> BiasVector {
    BiasVector::from_values(vec![0.0; test_tokens().model_vocab_size()])
}

/// Engine double that derives each decoded text from its prompt content, so
/// result alignment is observable regardless of internal processing order.
///
/// Prompts are walked in reverse to mimic an engine that reorders work
/// internally; outputs are still returned index-aligned, which is the
/// contract the driver relies on.
struct ScriptedEngine {
    calls: AtomicUsize,
    prompts_seen: Mutex<Vec<Vec<Vec<TokenId>>>>,
}

impl ScriptedEngine {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            prompts_seen: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn decode(prompt: &[TokenId]) -> String {
        let tokens = test_tokens();
        // Echo back each shifted reference speech token, then stop.
        let mut text = String::new();
        for &id in prompt.iter().filter(|&&id| id >= tokens.speech_id_offset) {
            text.push_str(&format!("<|speech-{}|>", id - tokens.speech_id_offset));
        }
        text.push_str("<|cos_eos|>ignored tail");
        text
    }
}

impl GenerationEngine for ScriptedEngine {
    fn generate(
        &self,
        prompts: &[Vec<TokenId>],
        config: &DecodingConfig,
        logits_processor: &dyn LogitsProcessor,
    ) -> Result<Vec<EngineOutput>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts_seen.lock().unwrap().push(prompts.to_vec());

        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.best_of, 1);

        // Exercise the per-step hook convention once per prompt.
        let mut outputs = vec![None; prompts.len()];
        for (idx, prompt) in prompts.iter().enumerate().rev() {
            let mut logits = vec![0.0f32; test_tokens().model_vocab_size()];
            logits_processor.apply(&mut logits, prompt)?;

            outputs[idx] = Some(EngineOutput::single(CandidateOutput::new(
                Self::decode(prompt),
                FinishReason::StopSequence,
            )));
        }
        Ok(outputs.into_iter().map(|o| o.unwrap()).collect())
    }
}

/// Engine double that always fails, standing in for context overflow or OOM.
struct FailingEngine;

impl GenerationEngine for FailingEngine {
    fn generate(
        &self,
        _prompts: &[Vec<TokenId>],
        _config: &DecodingConfig,
        _logits_processor: &dyn LogitsProcessor,
    ) -> Result<Vec<EngineOutput>> {
        Err(Error::Engine("KV cache exhausted".to_string()))
    }
}

fn driver_with(engine: Arc<dyn GenerationEngine>) -> OfflineInference {
    OfflineInference::new(engine, flat_bias(), test_tokens(), DecodingConfig::default()).unwrap()
}

#[test]
fn test_batch_results_are_index_aligned() {
    let engine = Arc::new(ScriptedEngine::new());
    let driver = driver_with(engine.clone());

    let text_lists = vec![vec![1], vec![2, 3], vec![4]];
    let ref_speech_lists = vec![vec![10, 11], vec![20], vec![30, 31, 32]];

    let results = driver.batch_infer(&text_lists, &ref_speech_lists).unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0], vec![10, 11]);
    assert_eq!(results[1], vec![20]);
    assert_eq!(results[2], vec![30, 31, 32]);
    assert_eq!(engine.call_count(), 1);
}

#[test]
fn test_prompts_reach_engine_encoded() {
    let engine = Arc::new(ScriptedEngine::new());
    let driver = driver_with(engine.clone());

    driver
        .batch_infer(&[vec![7, 8]], &[vec![0, 99]])
        .unwrap();

    let seen = engine.prompts_seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0][0], vec![1000, 7, 8, 1001, 1002, 1101]);
}

#[test]
fn test_length_mismatch_fails_before_engine_call() {
    let engine = Arc::new(ScriptedEngine::new());
    let driver = driver_with(engine.clone());

    let text_lists = vec![vec![1], vec![2], vec![3]];
    let ref_speech_lists = vec![vec![1], vec![2], vec![3], vec![4]];

    let err = driver
        .batch_infer(&text_lists, &ref_speech_lists)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InputLengthMismatch {
            text_lists: 3,
            speech_lists: 4
        }
    ));
    assert_eq!(engine.call_count(), 0);
}

#[test]
fn test_empty_batch_skips_engine() {
    let engine = Arc::new(ScriptedEngine::new());
    let driver = driver_with(engine.clone());

    let results = driver.batch_infer(&[], &[]).unwrap();
    assert!(results.is_empty());
    assert_eq!(engine.call_count(), 0);
}

#[test]
fn test_identical_inputs_yield_identical_outputs() {
    let driver = driver_with(Arc::new(ScriptedEngine::new()));

    let text_lists = vec![vec![5, 6], vec![7]];
    let ref_speech_lists = vec![vec![1, 2, 3], vec![4]];

    let first = driver.batch_infer(&text_lists, &ref_speech_lists).unwrap();
    let second = driver.batch_infer(&text_lists, &ref_speech_lists).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_engine_failure_fails_whole_batch() {
    let driver = driver_with(Arc::new(FailingEngine));

    let err = driver
        .batch_infer(&[vec![1], vec![2]], &[vec![1], vec![2]])
        .unwrap_err();
    assert!(matches!(err, Error::Engine(_)));
    assert!(err.to_string().contains("KV cache exhausted"));
}

#[test]
fn test_missing_candidate_is_an_engine_failure() {
    struct EmptyOutputEngine;

    impl GenerationEngine for EmptyOutputEngine {
        fn generate(
            &self,
            prompts: &[Vec<TokenId>],
            _config: &DecodingConfig,
            _logits_processor: &dyn LogitsProcessor,
        ) -> Result<Vec<EngineOutput>> {
            Ok(prompts
                .iter()
                .map(|_| EngineOutput { candidates: vec![] })
                .collect())
        }
    }

    let driver = driver_with(Arc::new(EmptyOutputEngine));
    let err = driver.batch_infer(&[vec![1]], &[vec![2]]).unwrap_err();
    assert!(matches!(err, Error::Engine(_)));
}

#[test]
fn test_output_count_mismatch_is_an_engine_failure() {
    struct ShortOutputEngine;

    impl GenerationEngine for ShortOutputEngine {
        fn generate(
            &self,
            _prompts: &[Vec<TokenId>],
            _config: &DecodingConfig,
            _logits_processor: &dyn LogitsProcessor,
        ) -> Result<Vec<EngineOutput>> {
            Ok(vec![EngineOutput::single(CandidateOutput::new(
                "<|cos_eos|>",
                FinishReason::StopSequence,
            ))])
        }
    }

    let driver = driver_with(Arc::new(ShortOutputEngine));
    let err = driver
        .batch_infer(&[vec![1], vec![2]], &[vec![1], vec![2]])
        .unwrap_err();
    assert!(matches!(err, Error::Engine(_)));
}

#[test]
fn test_truncated_generation_yields_complete_markers_only() {
    struct TruncatingEngine;

    impl GenerationEngine for TruncatingEngine {
        fn generate(
            &self,
            prompts: &[Vec<TokenId>],
            _config: &DecodingConfig,
            _logits_processor: &dyn LogitsProcessor,
        ) -> Result<Vec<EngineOutput>> {
            // Decode hit max_tokens mid-marker; no stop marker emitted.
            Ok(prompts
                .iter()
                .map(|_| {
                    EngineOutput::single(CandidateOutput::new(
                        "<|speech-42|><|speech-17|><|speech-9",
                        FinishReason::MaxTokens,
                    ))
                })
                .collect())
        }
    }

    let driver = driver_with(Arc::new(TruncatingEngine));
    let results = driver.batch_infer(&[vec![1]], &[vec![2]]).unwrap();
    assert_eq!(results, vec![vec![42, 17]]);
}
