//! Analysis state machine.
//!
//! ```text
//! Idle --arm--> Ready --begin--> Analyzing --resolve(current)--> Succeeded | Failed
//!   ^             |                  |  \--resolve(stale)--> (ignored)
//!   +----clear----+------------------+
//! ```
//!
//! Every issued request gets a fresh sequence number. A response is applied
//! only when its number is still the current one, so a slow reply can never
//! overwrite the result of a newer request or resurrect a cleared session.

use tracing::{debug, info, warn};

use super::diagnosis::DiagnosisResult;
use super::upload::ImageHandle;
use crate::error::{FailureReason, InferenceError};

pub type RequestSeq = u64;

/// A classification request. Fixed at the moment it is issued.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    sequence: RequestSeq,
    image: ImageHandle,
}

impl AnalysisRequest {
    pub fn sequence(&self) -> RequestSeq {
        self.sequence
    }

    pub fn image(&self) -> &ImageHandle {
        &self.image
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisState {
    Idle,
    Ready,
    Analyzing,
    Succeeded(DiagnosisResult),
    Failed(FailureReason),
}

impl AnalysisState {
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisState::Idle => "idle",
            AnalysisState::Ready => "ready",
            AnalysisState::Analyzing => "analyzing",
            AnalysisState::Succeeded(_) => "succeeded",
            AnalysisState::Failed(_) => "failed",
        }
    }
}

/// What happened to a delivered response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Stale,
}

#[derive(Debug)]
pub struct AnalysisController {
    state: AnalysisState,
    armed: Option<ImageHandle>,
    last_issued: RequestSeq,
    current: Option<RequestSeq>,
}

impl Default for AnalysisController {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisController {
    pub fn new() -> Self {
        Self {
            state: AnalysisState::Idle,
            armed: None,
            last_issued: 0,
            current: None,
        }
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn armed(&self) -> Option<&ImageHandle> {
        self.armed.as_ref()
    }

    /// Whether an analyze trigger should be offered to the user.
    pub fn can_analyze(&self) -> bool {
        self.armed.is_some() && self.state != AnalysisState::Analyzing
    }

    /// Arm a validated image. Any request still in flight is superseded.
    pub fn arm(&mut self, image: ImageHandle) {
        if let Some(seq) = self.current.take() {
            debug!("Request #{} superseded by new upload", seq);
        }
        debug!("Armed {} ({})", image.name(), image.media_type());
        self.armed = Some(image);
        self.transition(AnalysisState::Ready);
    }

    /// Drop the armed image and return to `Idle`. Returns `false` when
    /// already idle.
    pub fn clear(&mut self) -> bool {
        if self.state == AnalysisState::Idle && self.armed.is_none() {
            return false;
        }
        if let Some(seq) = self.current.take() {
            debug!("Request #{} superseded by clear", seq);
        }
        self.armed = None;
        self.transition(AnalysisState::Idle);
        true
    }

    /// Issue a new request for the armed image and move to `Analyzing`.
    ///
    /// Returns `None` when nothing is armed. Calling this while a request is
    /// in flight supersedes that request.
    pub fn begin(&mut self) -> Option<AnalysisRequest> {
        let image = match &self.armed {
            Some(image) => image.clone(),
            None => {
                debug!("Analyze ignored: no image armed");
                return None;
            }
        };

        if let Some(prev) = self.current {
            debug!("Request #{} superseded by a newer analyze", prev);
        }

        self.last_issued += 1;
        let sequence = self.last_issued;
        self.current = Some(sequence);
        self.transition(AnalysisState::Analyzing);

        info!("Issuing analysis request #{} for {}", sequence, image.name());
        Some(AnalysisRequest { sequence, image })
    }

    /// Deliver the outcome of request `sequence`.
    pub fn resolve(
        &mut self,
        sequence: RequestSeq,
        outcome: Result<DiagnosisResult, InferenceError>,
    ) -> Resolution {
        if self.current != Some(sequence) {
            debug!(
                "Discarding stale response #{} (current: {:?})",
                sequence, self.current
            );
            return Resolution::Stale;
        }
        self.current = None;

        let next = match outcome {
            Ok(result) => {
                info!(
                    "Request #{} classified {:?} at {}",
                    sequence,
                    result.status(),
                    result.confidence
                );
                AnalysisState::Succeeded(result)
            }
            Err(err) => {
                match &err {
                    InferenceError::Malformed(detail) => {
                        warn!("Inference service broke its response contract: {}", detail)
                    }
                    other => warn!("Request #{} failed: {}", sequence, other),
                }
                AnalysisState::Failed(err.reason())
            }
        };
        self.transition(next);
        Resolution::Applied
    }

    fn transition(&mut self, next: AnalysisState) {
        debug!("Analysis state {} -> {}", self.state.label(), next.label());
        self.state = next;
    }
}
