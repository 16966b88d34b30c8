//! Upload → analysis → result pipeline shared by both renderers.

pub mod controller;
pub mod diagnosis;
pub mod inference;
pub mod presenter;
pub mod preview;
pub mod session;
pub mod simulated;
pub mod upload;

pub use controller::{AnalysisController, AnalysisRequest, AnalysisState, RequestSeq, Resolution};
pub use diagnosis::{Confidence, DiagnosisResult, DiseaseDetail, Finding, Status};
pub use inference::{HttpInference, InferenceService};
pub use presenter::{present, DisplayModel, Phase};
pub use preview::{ObjectUrlAllocator, PreviewAllocator, PreviewManager};
pub use session::{DashboardFrame, PendingAnalysis, Spawner, TriageObserver, TriageSession};
pub use simulated::SimulatedInference;
pub use upload::{ImageHandle, ImagePayload, RawFile};

use std::time::Duration;

use crate::config::{InferenceMode, TriageConfig};

/// Build a session wired to the configured inference service and blob-URL
/// previews. Simulated sessions analyse on upload unless configured not to.
pub fn session_from_config(config: &TriageConfig) -> TriageSession {
    let session = match config.inference.mode {
        InferenceMode::Live => TriageSession::new(
            HttpInference::new(&config.inference.endpoint, &config.inference.field_name),
            ObjectUrlAllocator,
        ),
        InferenceMode::Simulated => TriageSession::new(
            SimulatedInference::new(
                Duration::from_millis(config.simulated.delay_ms),
                config.simulated.healthy_probability,
            ),
            ObjectUrlAllocator,
        ),
    };
    session.with_auto_analyze(config.auto_analyze())
}
