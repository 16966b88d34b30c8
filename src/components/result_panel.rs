//! Diagnosis display.
//!
//! Draws one [`DisplayModel`]: placeholder, progress, healthy result,
//! finding with clinical detail, or failure with a retry action.

use leptos::prelude::*;

use crate::components::status_badge::DiagnosisBadge;
use crate::triage::presenter::{DisplayModel, Gauge, NumberedItem};

const RING_PATH: &str = "M18 2.0845 a 15.9155 15.9155 0 0 1 0 31.831 a 15.9155 15.9155 0 0 1 0 -31.831";

#[component]
pub fn ResultPanel(model: DisplayModel, on_retry: Callback<()>) -> impl IntoView {
    let body = match model {
        DisplayModel::Empty { message } | DisplayModel::Ready { message } => view! {
            <div class="empty-state">
                <div class="empty-icon">"[scan]"</div>
                <p>{message}</p>
            </div>
        }
        .into_any(),

        DisplayModel::Progress { message, hint } => view! {
            <div class="loading-indicator">
                <div class="spinner"></div>
                <p>{message}</p>
                <p class="hint">{hint}</p>
            </div>
        }
        .into_any(),

        DisplayModel::Healthy {
            badge,
            headline,
            gauge,
            summary,
        } => view! {
            <div class="result-content">
                <DiagnosisBadge badge=badge />
                <h3 class="result-headline">{headline}</h3>
                <ConfidenceGauge gauge=gauge />
                <p class="result-summary">{summary}</p>
            </div>
        }
        .into_any(),

        DisplayModel::Finding {
            badge,
            headline,
            gauge,
            disease_name,
            pathogen,
            causes,
            symptoms,
            recommendations,
        } => view! {
            <div class="result-content">
                <DiagnosisBadge badge=badge />
                <h3 class="result-headline">{headline}</h3>
                <ConfidenceGauge gauge=gauge />

                <div class="disease-section">
                    <h4 class="condition-name">{disease_name}</h4>
                    <p class="pathogen">{pathogen}</p>

                    <DetailList title="Possible Causes" items=causes />
                    <DetailList title="Observed Symptoms" items=symptoms />
                    <Recommendations items=recommendations />
                </div>
            </div>
        }
        .into_any(),

        DisplayModel::Failure {
            title,
            message,
            retry_label,
        } => view! {
            <div class="error-state">
                <div class="error-message">
                    <h3>{title}</h3>
                    <p>{message}</p>
                </div>
                <button class="btn btn-secondary" on:click=move |_| on_retry.run(())>
                    {retry_label}
                </button>
            </div>
        }
        .into_any(),
    };

    view! {
        <div class="result-panel">
            <style>{include_str!("result_panel.css")}</style>
            {body}
        </div>
    }
}

/// Circular confidence ring.
#[component]
fn ConfidenceGauge(gauge: Gauge) -> impl IntoView {
    view! {
        <div class="confidence-gauge">
            <svg viewBox="0 0 36 36" class="circular-chart">
                <path class="circle-bg" d=RING_PATH />
                <path
                    class="circle"
                    stroke-dasharray=format!("{}, 100", gauge.percent)
                    style=format!("stroke: {}", gauge.color)
                    d=RING_PATH
                />
            </svg>
            <span class="confidence-value">{gauge.label}</span>
            <span class="confidence-caption">"Confidence"</span>
        </div>
    }
}

#[component]
fn DetailList(title: &'static str, items: Vec<String>) -> impl IntoView {
    view! {
        <div class="detail-block">
            <h5>{title}</h5>
            <ul>
                {items.into_iter().map(|item| view! { <li>{item}</li> }).collect::<Vec<_>>()}
            </ul>
        </div>
    }
}

#[component]
fn Recommendations(items: Vec<NumberedItem>) -> impl IntoView {
    view! {
        <div class="detail-block recommendations">
            <h5>"Recommended Actions"</h5>
            <div class="recommendations-list">
                {items.into_iter().map(|item| view! {
                    <div class="recommendation-card">
                        <span class="rec-number">{item.number}</span>
                        <span class="rec-text">{item.text}</span>
                    </div>
                }).collect::<Vec<_>>()}
            </div>
        </div>
    }
}
