//! Renderer for the server-rendered dashboard markup.
//!
//! [`DomRenderer`] knows which slot shows what; the [`RenderTarget`] it is
//! given knows how to touch the page. Nothing here looks up elements itself.

use crate::triage::presenter::{DisplayModel, Phase, Tone};
use crate::triage::session::{DashboardFrame, TriageObserver};

/// Named places in the scripted dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    DropZone,
    FileInput,
    UploadPrompt,
    PreviewContainer,
    PreviewImage,
    FileName,
    RemoveButton,
    AnalyzeButton,
    Notice,
    EmptyState,
    EmptyMessage,
    Loading,
    LoadingText,
    LoadingHint,
    ResultContent,
    StatusBadge,
    Headline,
    ConfidenceText,
    ConfidenceStroke,
    SummaryText,
    DiseaseSection,
    ConditionText,
    PathogenText,
    CausesList,
    SymptomsList,
    RecommendationsList,
    ErrorState,
    ErrorTitle,
    ErrorText,
    RetryButton,
}

impl Slot {
    pub const ALL: [Slot; 30] = [
        Slot::DropZone,
        Slot::FileInput,
        Slot::UploadPrompt,
        Slot::PreviewContainer,
        Slot::PreviewImage,
        Slot::FileName,
        Slot::RemoveButton,
        Slot::AnalyzeButton,
        Slot::Notice,
        Slot::EmptyState,
        Slot::EmptyMessage,
        Slot::Loading,
        Slot::LoadingText,
        Slot::LoadingHint,
        Slot::ResultContent,
        Slot::StatusBadge,
        Slot::Headline,
        Slot::ConfidenceText,
        Slot::ConfidenceStroke,
        Slot::SummaryText,
        Slot::DiseaseSection,
        Slot::ConditionText,
        Slot::PathogenText,
        Slot::CausesList,
        Slot::SymptomsList,
        Slot::RecommendationsList,
        Slot::ErrorState,
        Slot::ErrorTitle,
        Slot::ErrorText,
        Slot::RetryButton,
    ];

    pub fn element_id(self) -> &'static str {
        match self {
            Slot::DropZone => "drop-zone",
            Slot::FileInput => "file-input",
            Slot::UploadPrompt => "upload-content",
            Slot::PreviewContainer => "preview-container",
            Slot::PreviewImage => "image-preview",
            Slot::FileName => "file-name",
            Slot::RemoveButton => "remove-btn",
            Slot::AnalyzeButton => "analyze-btn",
            Slot::Notice => "upload-notice",
            Slot::EmptyState => "empty-state",
            Slot::EmptyMessage => "empty-message",
            Slot::Loading => "loading",
            Slot::LoadingText => "loading-text",
            Slot::LoadingHint => "loading-hint",
            Slot::ResultContent => "result-content",
            Slot::StatusBadge => "status-badge",
            Slot::Headline => "headline-text",
            Slot::ConfidenceText => "confidence-text",
            Slot::ConfidenceStroke => "confidence-stroke",
            Slot::SummaryText => "summary-text",
            Slot::DiseaseSection => "disease-section",
            Slot::ConditionText => "condition-text",
            Slot::PathogenText => "pathogen-text",
            Slot::CausesList => "causes-list",
            Slot::SymptomsList => "symptoms-list",
            Slot::RecommendationsList => "recommendations-list",
            Slot::ErrorState => "error-state",
            Slot::ErrorTitle => "error-title",
            Slot::ErrorText => "error-text",
            Slot::RetryButton => "retry-btn",
        }
    }
}

/// Page operations the scripted renderer needs.
pub trait RenderTarget {
    fn set_visible(&self, slot: Slot, visible: bool);
    fn set_text(&self, slot: Slot, text: &str);
    /// Replace the children of a list slot, one entry per item, in order.
    fn set_items(&self, slot: Slot, items: &[String]);
    fn set_enabled(&self, slot: Slot, enabled: bool);
    fn set_tone(&self, slot: Slot, tone: Option<Tone>);
    fn set_gauge(&self, slot: Slot, percent: u8, color: &str);
    fn set_image(&self, slot: Slot, src: Option<&str>);
}

pub struct DomRenderer<T: RenderTarget> {
    target: T,
}

impl<T: RenderTarget> DomRenderer<T> {
    pub fn new(target: T) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    fn render_upload(&self, frame: &DashboardFrame) {
        let t = &self.target;
        let has_preview = frame.preview_url.is_some();

        t.set_visible(Slot::UploadPrompt, !has_preview);
        t.set_visible(Slot::PreviewContainer, has_preview);
        t.set_image(Slot::PreviewImage, frame.preview_url.as_deref());
        t.set_text(Slot::FileName, frame.file_name.as_deref().unwrap_or_default());
        t.set_enabled(Slot::AnalyzeButton, frame.can_analyze);
        t.set_enabled(Slot::RemoveButton, frame.can_clear);

        t.set_visible(Slot::Notice, frame.notice.is_some());
        t.set_text(Slot::Notice, frame.notice.unwrap_or_default());
    }

    fn render_result(&self, view: &DisplayModel) {
        let t = &self.target;
        let phase = view.phase();

        t.set_visible(Slot::EmptyState, matches!(phase, Phase::Empty | Phase::Ready));
        t.set_visible(Slot::Loading, phase == Phase::Progress);
        t.set_visible(Slot::ResultContent, phase == Phase::Result);
        t.set_visible(Slot::ErrorState, phase == Phase::Failure);
        t.set_visible(Slot::DiseaseSection, matches!(view, DisplayModel::Finding { .. }));
        t.set_visible(Slot::SummaryText, matches!(view, DisplayModel::Healthy { .. }));

        match view {
            DisplayModel::Empty { message } | DisplayModel::Ready { message } => {
                t.set_text(Slot::EmptyMessage, message);
            }
            DisplayModel::Progress { message, hint } => {
                t.set_text(Slot::LoadingText, message);
                t.set_text(Slot::LoadingHint, hint);
            }
            DisplayModel::Healthy {
                badge,
                headline,
                gauge,
                summary,
            } => {
                t.set_tone(Slot::StatusBadge, Some(badge.tone));
                t.set_text(Slot::StatusBadge, badge.label);
                t.set_text(Slot::Headline, headline);
                t.set_text(Slot::ConfidenceText, &gauge.label);
                t.set_gauge(Slot::ConfidenceStroke, gauge.percent, gauge.color);
                t.set_text(Slot::SummaryText, summary);
            }
            DisplayModel::Finding {
                badge,
                headline,
                gauge,
                disease_name,
                pathogen,
                causes,
                symptoms,
                recommendations,
            } => {
                t.set_tone(Slot::StatusBadge, Some(badge.tone));
                t.set_text(Slot::StatusBadge, badge.label);
                t.set_text(Slot::Headline, headline);
                t.set_text(Slot::ConfidenceText, &gauge.label);
                t.set_gauge(Slot::ConfidenceStroke, gauge.percent, gauge.color);
                t.set_text(Slot::ConditionText, disease_name);
                t.set_text(Slot::PathogenText, pathogen);
                t.set_items(Slot::CausesList, causes);
                t.set_items(Slot::SymptomsList, symptoms);
                let numbered: Vec<String> =
                    recommendations.iter().map(|r| r.text.clone()).collect();
                t.set_items(Slot::RecommendationsList, &numbered);
            }
            DisplayModel::Failure {
                title,
                message,
                retry_label,
            } => {
                t.set_text(Slot::ErrorTitle, title);
                t.set_text(Slot::ErrorText, message);
                t.set_text(Slot::RetryButton, retry_label);
            }
        }

        if view.badge().is_none() {
            t.set_tone(Slot::StatusBadge, None);
        }
    }
}

impl<T: RenderTarget> TriageObserver for DomRenderer<T> {
    fn render(&self, frame: &DashboardFrame) {
        self.render_upload(frame);
        self.render_result(&frame.view);
    }
}
