//! Analysis Orchestrator
//!
//! Runs the full cracking pipeline on a background tokio task:
//! key-length estimation, per-period frequency analysis, then candidate
//! refinement. The caller talks to the run exclusively through messages:
//! an [`AnalysisRequest`] in, a stream of [`AnalysisEvent`]s out, with
//! exactly one terminal event per run. Cancellation is a shared flag
//! checked at every stage top and suspension point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

use crate::alphabet::Alphabet;
use crate::columns::ColumnAnalyzer;
use crate::config::AnalysisConfig;
use crate::kasiski::{KasiskiScan, KeyLengthEstimator};
use crate::known_plaintext::{KeyCandidate, Provenance};
use crate::scoring::KeyScorer;
use crate::{Error, ErrorKind, Result};

/// Grams examined per Kasiski chunk before yielding back to the scheduler.
const SCAN_CHUNK: usize = 2048;

/// Progress share of each stage, out of 100.
const KEY_LENGTH_SHARE: usize = 40;
const FREQUENCY_SHARE: usize = 40;
const REFINEMENT_SHARE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnalysisStage {
    Idle,
    KeyLengthEstimation,
    FrequencyAnalysis,
    Refinement,
    Completed,
    Cancelled,
    Failed,
}

/// Request half of the caller ↔ orchestrator protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum AnalysisRequest {
    Analyze { ciphertext: String, alphabet: String },
    Terminate,
}

/// Response half of the protocol. Exactly one of `Result`, `Error`, or
/// `Cancelled` terminates a run; nothing follows the terminal event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum AnalysisEvent {
    Progress {
        stage: AnalysisStage,
        percent: u8,
        message: String,
    },
    Result {
        result: AnalysisResult,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
    Cancelled,
}

/// Terminal artifact of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub key: String,
    pub confidence: f64,
    pub decrypted_text: String,
}

/// Summary a caller gets from [`AnalysisHandle::wait`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Completed(AnalysisResult),
    Failed { kind: ErrorKind, message: String },
    Cancelled,
}

/// Caller-side handle to one in-flight analysis.
#[derive(Debug)]
pub struct AnalysisHandle {
    events: mpsc::UnboundedReceiver<AnalysisEvent>,
    stop: Arc<AtomicBool>,
}

impl AnalysisHandle {
    /// Next event from the run, `None` once the terminal event has been
    /// consumed and the run's task has finished.
    pub async fn recv(&mut self) -> Option<AnalysisEvent> {
        self.events.recv().await
    }

    /// Request cooperative cancellation. Observed at the next stage top or
    /// suspension point; not guaranteed to interrupt a synchronous chunk.
    pub fn terminate(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Drain events until the terminal one, enforcing `deadline` on the
    /// whole run. On expiry the run is terminated and the wait reports
    /// `AnalysisTimedOut`.
    pub async fn wait(mut self, deadline: Duration) -> Result<AnalysisOutcome> {
        let timer = tokio::time::Instant::now() + deadline;
        loop {
            match tokio::time::timeout_at(timer, self.events.recv()).await {
                Err(_) => {
                    self.terminate();
                    return Err(Error::AnalysisTimedOut(deadline.as_millis() as u64));
                }
                Ok(None) => return Ok(AnalysisOutcome::Cancelled),
                Ok(Some(AnalysisEvent::Progress { .. })) => continue,
                Ok(Some(AnalysisEvent::Result { result })) => {
                    return Ok(AnalysisOutcome::Completed(result))
                }
                Ok(Some(AnalysisEvent::Error { kind, message })) => {
                    return Ok(AnalysisOutcome::Failed { kind, message })
                }
                Ok(Some(AnalysisEvent::Cancelled)) => return Ok(AnalysisOutcome::Cancelled),
            }
        }
    }
}

/// One analysis in flight at a time; a second `Analyze` while busy is
/// rejected, not queued.
pub struct AnalysisOrchestrator {
    config: AnalysisConfig,
    busy: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
}

impl AnalysisOrchestrator {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            busy: Arc::new(AtomicBool::new(false)),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Map a protocol request onto the orchestrator. `Analyze` yields a
    /// handle for the new run; `Terminate` cancels the active one.
    pub fn dispatch(&mut self, request: AnalysisRequest) -> Result<Option<AnalysisHandle>> {
        match request {
            AnalysisRequest::Analyze { ciphertext, alphabet } => {
                self.analyze(&ciphertext, &alphabet).map(Some)
            }
            AnalysisRequest::Terminate => {
                self.terminate();
                Ok(None)
            }
        }
    }

    /// Spawn a run for `ciphertext` over `alphabet`. All validation
    /// happens inside the run and surfaces as a terminal `Error` event.
    pub fn analyze(&mut self, ciphertext: &str, alphabet: &str) -> Result<AnalysisHandle> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::AnalysisInProgress);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));
        self.stop = stop.clone();

        let config = self.config.clone();
        let busy = self.busy.clone();
        let ciphertext = ciphertext.to_string();
        let alphabet = alphabet.to_string();
        let run_stop = stop.clone();

        tokio::spawn(async move {
            let terminal = match run_stages(&config, &ciphertext, &alphabet, &tx, &run_stop).await {
                Ok(StageEnd::Done(result)) => {
                    info!(key = %result.key, confidence = result.confidence, "analysis complete");
                    AnalysisEvent::Result { result }
                }
                Ok(StageEnd::Cancelled) => {
                    info!("analysis cancelled");
                    AnalysisEvent::Cancelled
                }
                Err(err) => {
                    info!(error = %err, "analysis failed");
                    AnalysisEvent::Error {
                        kind: err.kind(),
                        message: err.to_string(),
                    }
                }
            };
            let _ = tx.send(terminal);
            busy.store(false, Ordering::SeqCst);
        });

        Ok(AnalysisHandle { events: rx, stop })
    }

    /// Cancel the active run, if any.
    pub fn terminate(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}

enum StageEnd {
    Done(AnalysisResult),
    Cancelled,
}

fn progress(
    tx: &mpsc::UnboundedSender<AnalysisEvent>,
    stage: AnalysisStage,
    percent: usize,
    message: String,
) {
    let _ = tx.send(AnalysisEvent::Progress {
        stage,
        percent: percent.min(100) as u8,
        message,
    });
}

fn cancelled(stop: &AtomicBool) -> bool {
    stop.load(Ordering::SeqCst)
}

async fn run_stages(
    config: &AnalysisConfig,
    ciphertext: &str,
    alphabet: &str,
    tx: &mpsc::UnboundedSender<AnalysisEvent>,
    stop: &AtomicBool,
) -> Result<StageEnd> {
    config.validate()?;
    let alphabet = Alphabet::new(alphabet)?;
    let indices = alphabet.indices(ciphertext);
    if indices.len() < config.min_ciphertext_len {
        return Err(Error::InsufficientCiphertext {
            got: indices.len(),
            need: config.min_ciphertext_len,
        });
    }

    // Stage 1: key-length estimation, 0..40.
    if cancelled(stop) {
        return Ok(StageEnd::Cancelled);
    }
    info!(symbols = indices.len(), "key-length estimation started");
    progress(
        tx,
        AnalysisStage::KeyLengthEstimation,
        0,
        "scanning for repeated sequences".into(),
    );

    let total_grams = KasiskiScan::total_grams(&indices, config.seed_len);
    let mut scan = KasiskiScan::new(config.seed_len);
    loop {
        if cancelled(stop) {
            return Ok(StageEnd::Cancelled);
        }
        let done = scan.advance(&indices, SCAN_CHUNK);
        let percent = if total_grams == 0 {
            KEY_LENGTH_SHARE
        } else {
            KEY_LENGTH_SHARE * scan.cursor() / total_grams
        };
        progress(
            tx,
            AnalysisStage::KeyLengthEstimation,
            percent,
            format!("scanned {}/{} sequences", scan.cursor(), total_grams),
        );
        if done {
            break;
        }
        tokio::task::yield_now().await;
    }

    let support = scan.into_support(config.min_key_length, config.max_key_length);
    let lengths = KeyLengthEstimator::rank_support(support, &indices, alphabet.len(), config);
    info!(candidates = lengths.len(), "key-length estimation finished");

    // Stage 2: frequency analysis per candidate period, 40..80.
    if cancelled(stop) {
        return Ok(StageEnd::Cancelled);
    }
    let reference = config.language.reference_table(&alphabet);
    let mut candidates: Vec<KeyCandidate> = Vec::with_capacity(lengths.len());
    for (i, length) in lengths.iter().enumerate() {
        if cancelled(stop) {
            return Ok(StageEnd::Cancelled);
        }
        let key =
            ColumnAnalyzer::recover_key_indices(&indices, length.length, &alphabet, &reference);
        progress(
            tx,
            AnalysisStage::FrequencyAnalysis,
            KEY_LENGTH_SHARE + FREQUENCY_SHARE * (i + 1) / lengths.len(),
            format!("period {} suggests key {}", length.length, key),
        );
        candidates.push(KeyCandidate {
            key,
            provenance: Provenance::FrequencyAnalysis { period: length.length },
            support: 1,
        });
        tokio::task::yield_now().await;
    }

    // Stage 3: refinement, 80..100.
    let mut scored = Vec::with_capacity(candidates.len());
    for (i, candidate) in candidates.iter().enumerate() {
        if cancelled(stop) {
            return Ok(StageEnd::Cancelled);
        }
        if let Ok(s) = KeyScorer::score(ciphertext, candidate, &alphabet, config.language, &[]) {
            scored.push(s);
        }
        progress(
            tx,
            AnalysisStage::Refinement,
            KEY_LENGTH_SHARE + FREQUENCY_SHARE + REFINEMENT_SHARE * (i + 1) / candidates.len(),
            format!("evaluated candidate {}", candidate.key),
        );
        tokio::task::yield_now().await;
    }

    scored.sort_by(KeyScorer::rank);
    let best = scored.into_iter().next().ok_or(Error::NoValidKey)?;
    let confidence = KeyScorer::confidence(best.score, &alphabet);

    Ok(StageEnd::Done(AnalysisResult {
        key: best.candidate.key,
        confidence,
        decrypted_text: best.decrypted,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::CipherTransform;

    fn lemon_ciphertext() -> String {
        let alphabet = Alphabet::latin();
        CipherTransform::encrypt(crate::testdata::DICKENS, "LEMON", &alphabet).unwrap()
    }

    #[tokio::test]
    async fn test_full_analysis_recovers_the_key() {
        let mut orchestrator = AnalysisOrchestrator::new(AnalysisConfig::default());
        let handle = orchestrator
            .analyze(&lemon_ciphertext(), &AnalysisConfig::default().alphabet)
            .unwrap();

        let outcome = handle.wait(Duration::from_secs(60)).await.unwrap();
        match outcome {
            AnalysisOutcome::Completed(result) => {
                assert_eq!(result.key, "LEMON");
                assert!(result.confidence > 0.0 && result.confidence <= 1.0);
                assert!(result.decrypted_text.starts_with("ITWASTHEBEST"));
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_idempotent_across_fresh_instances() {
        let ciphertext = lemon_ciphertext();
        let alphabet = AnalysisConfig::default().alphabet;
        let mut results = Vec::new();
        for _ in 0..2 {
            let mut orchestrator = AnalysisOrchestrator::new(AnalysisConfig::default());
            let handle = orchestrator.analyze(&ciphertext, &alphabet).unwrap();
            match handle.wait(Duration::from_secs(60)).await.unwrap() {
                AnalysisOutcome::Completed(result) => results.push(result),
                other => panic!("expected completion, got {:?}", other),
            }
        }
        assert_eq!(results[0], results[1]);
    }

    #[tokio::test]
    async fn test_insufficient_ciphertext_yields_error_before_progress() {
        let mut orchestrator = AnalysisOrchestrator::new(AnalysisConfig::default());
        let mut handle = orchestrator
            .analyze("TOOSHORT", &AnalysisConfig::default().alphabet)
            .unwrap();

        let first = handle.recv().await.unwrap();
        assert!(
            matches!(
                first,
                AnalysisEvent::Error {
                    kind: ErrorKind::InsufficientCiphertext,
                    ..
                }
            ),
            "first event was {:?}",
            first
        );
        assert!(handle.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_terminate_yields_cancelled_and_nothing_after() {
        let long: String = lemon_ciphertext().repeat(20);
        let mut orchestrator = AnalysisOrchestrator::new(AnalysisConfig::default());
        let mut handle = orchestrator
            .analyze(&long, &AnalysisConfig::default().alphabet)
            .unwrap();
        handle.terminate();

        let mut saw_cancelled = false;
        while let Some(event) = handle.recv().await {
            assert!(!saw_cancelled, "event {:?} after Cancelled", event);
            match event {
                AnalysisEvent::Cancelled => saw_cancelled = true,
                AnalysisEvent::Progress { .. } => {}
                other => panic!("unexpected terminal {:?}", other),
            }
        }
        assert!(saw_cancelled);
    }

    #[tokio::test]
    async fn test_second_analyze_while_busy_is_rejected() {
        let ciphertext = lemon_ciphertext();
        let alphabet = AnalysisConfig::default().alphabet;
        let mut orchestrator = AnalysisOrchestrator::new(AnalysisConfig::default());
        let handle = orchestrator.analyze(&ciphertext, &alphabet).unwrap();
        assert!(orchestrator.is_busy());

        let err = orchestrator.analyze(&ciphertext, &alphabet).unwrap_err();
        assert!(matches!(err, Error::AnalysisInProgress));

        // After the first run finishes, the orchestrator accepts again.
        handle.wait(Duration::from_secs(60)).await.unwrap();
        assert!(orchestrator.analyze(&ciphertext, &alphabet).is_ok());
    }

    #[tokio::test]
    async fn test_wait_enforces_the_deadline() {
        let mut orchestrator = AnalysisOrchestrator::new(AnalysisConfig::default());
        let handle = orchestrator
            .analyze(&lemon_ciphertext(), &AnalysisConfig::default().alphabet)
            .unwrap();

        let err = handle.wait(Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, Error::AnalysisTimedOut(0)));
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_staged() {
        let mut orchestrator = AnalysisOrchestrator::new(AnalysisConfig::default());
        let mut handle = orchestrator
            .analyze(&lemon_ciphertext(), &AnalysisConfig::default().alphabet)
            .unwrap();

        let mut last_percent = 0u8;
        let mut terminal = None;
        while let Some(event) = handle.recv().await {
            match event {
                AnalysisEvent::Progress { percent, .. } => {
                    assert!(percent >= last_percent, "{} < {}", percent, last_percent);
                    assert!(percent <= 100);
                    last_percent = percent;
                }
                other => {
                    assert!(terminal.is_none(), "second terminal {:?}", other);
                    terminal = Some(other);
                }
            }
        }
        assert!(matches!(terminal, Some(AnalysisEvent::Result { .. })));
    }

    #[tokio::test]
    async fn test_dispatch_maps_the_protocol() {
        let mut orchestrator = AnalysisOrchestrator::new(AnalysisConfig::default());
        let handle = orchestrator
            .dispatch(AnalysisRequest::Analyze {
                ciphertext: lemon_ciphertext(),
                alphabet: AnalysisConfig::default().alphabet,
            })
            .unwrap()
            .expect("analyze yields a handle");

        assert!(orchestrator
            .dispatch(AnalysisRequest::Terminate)
            .unwrap()
            .is_none());

        let outcome = handle.wait(Duration::from_secs(10)).await.unwrap();
        assert_eq!(outcome, AnalysisOutcome::Cancelled);
    }

    #[test]
    fn test_protocol_serialization() {
        let request = AnalysisRequest::Analyze {
            ciphertext: "LXFOPVEFRNHR".into(),
            alphabet: "ABCDEFGHIJKLMNOPQRSTUVWXYZ".into(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"type\":\"analyze\""));
        assert!(json.contains("\"ciphertext\""));
        let back: AnalysisRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, request);

        let event = AnalysisEvent::Progress {
            stage: AnalysisStage::KeyLengthEstimation,
            percent: 40,
            message: "scanning".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"stage\":\"keyLengthEstimation\""));

        let result = AnalysisEvent::Result {
            result: AnalysisResult {
                key: "LEMON".into(),
                confidence: 0.75,
                decrypted_text: "ATTACKATDAWN".into(),
            },
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"decryptedText\""));
    }
}
