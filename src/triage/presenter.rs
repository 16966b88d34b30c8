//! Maps analysis state to what the dashboard shows. Pure: no I/O, no DOM.

use super::controller::AnalysisState;
use super::diagnosis::{DiagnosisResult, Finding};
use crate::error::FailureReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Caution,
}

impl Tone {
    pub fn css_class(self) -> &'static str {
        match self {
            Tone::Positive => "normal",
            Tone::Caution => "pneumonia",
        }
    }

    pub fn gauge_color(self) -> &'static str {
        match self {
            Tone::Positive => "#4CAF50",
            Tone::Caution => "#F44336",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub label: &'static str,
    pub tone: Tone,
}

/// Confidence ring/bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gauge {
    /// Whole percent, `0..=100`
    pub percent: u8,
    pub label: String,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedItem {
    pub number: usize,
    pub text: String,
}

/// Coarse display phase, used to toggle panel visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Ready,
    Progress,
    Result,
    Failure,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayModel {
    Empty {
        message: &'static str,
    },
    Ready {
        message: &'static str,
    },
    Progress {
        message: &'static str,
        hint: &'static str,
    },
    Healthy {
        badge: Badge,
        headline: &'static str,
        gauge: Gauge,
        summary: &'static str,
    },
    Finding {
        badge: Badge,
        headline: &'static str,
        gauge: Gauge,
        disease_name: String,
        pathogen: String,
        causes: Vec<String>,
        symptoms: Vec<String>,
        recommendations: Vec<NumberedItem>,
    },
    Failure {
        title: &'static str,
        message: &'static str,
        retry_label: &'static str,
    },
}

impl DisplayModel {
    pub fn phase(&self) -> Phase {
        match self {
            DisplayModel::Empty { .. } => Phase::Empty,
            DisplayModel::Ready { .. } => Phase::Ready,
            DisplayModel::Progress { .. } => Phase::Progress,
            DisplayModel::Healthy { .. } | DisplayModel::Finding { .. } => Phase::Result,
            DisplayModel::Failure { .. } => Phase::Failure,
        }
    }

    pub fn badge(&self) -> Option<Badge> {
        match self {
            DisplayModel::Healthy { badge, .. } | DisplayModel::Finding { badge, .. } => Some(*badge),
            _ => None,
        }
    }

    pub fn gauge(&self) -> Option<&Gauge> {
        match self {
            DisplayModel::Healthy { gauge, .. } | DisplayModel::Finding { gauge, .. } => Some(gauge),
            _ => None,
        }
    }
}

pub fn present(state: &AnalysisState) -> DisplayModel {
    match state {
        AnalysisState::Idle => DisplayModel::Empty {
            message: "Upload a chest X-ray image to start the AI-based diagnostic process.",
        },
        AnalysisState::Ready => DisplayModel::Ready {
            message: "Scan loaded. Run the analysis when ready.",
        },
        AnalysisState::Analyzing => DisplayModel::Progress {
            message: "Analyzing scan...",
            hint: "This usually takes a few seconds",
        },
        AnalysisState::Succeeded(result) => present_result(result),
        AnalysisState::Failed(reason) => DisplayModel::Failure {
            title: "Analysis Failed",
            message: failure_message(*reason),
            retry_label: "Try Again",
        },
    }
}

fn present_result(result: &DiagnosisResult) -> DisplayModel {
    match &result.finding {
        Finding::Normal => {
            let tone = Tone::Positive;
            DisplayModel::Healthy {
                badge: Badge {
                    label: "NORMAL (HEALTHY)",
                    tone,
                },
                headline: "No Disease Detected",
                gauge: gauge(result, tone),
                summary: "The AI analysis shows no significant pathological markers for pneumonia in this chest X-ray.",
            }
        }
        Finding::Diseased(detail) => {
            let tone = Tone::Caution;
            DisplayModel::Finding {
                badge: Badge {
                    label: "PNEUMONIA DETECTED",
                    tone,
                },
                headline: "Disease Detected",
                gauge: gauge(result, tone),
                disease_name: detail.disease_name().to_string(),
                pathogen: detail.causes()[0].clone(),
                causes: detail.causes().to_vec(),
                symptoms: detail.symptoms().to_vec(),
                recommendations: detail
                    .recommendations()
                    .iter()
                    .enumerate()
                    .map(|(i, text)| NumberedItem {
                        number: i + 1,
                        text: text.clone(),
                    })
                    .collect(),
            }
        }
    }
}

fn gauge(result: &DiagnosisResult, tone: Tone) -> Gauge {
    let percent = result.confidence.rounded();
    Gauge {
        percent,
        label: format!("{}%", percent),
        color: tone.gauge_color(),
    }
}

/// User-facing text per failure kind. Never includes collaborator detail.
pub fn failure_message(reason: FailureReason) -> &'static str {
    match reason {
        FailureReason::NetworkError => {
            "Could not reach the analysis service. Check your connection and try again."
        }
        FailureReason::CollaboratorError => {
            "The analysis service could not process this scan. Try again or upload a different image."
        }
        FailureReason::MalformedResponse => {
            "The analysis service returned an unexpected result. Please try again."
        }
    }
}
