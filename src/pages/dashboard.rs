//! Triage dashboard: upload a chest X-ray, run the analysis, read the result.

use std::rc::Rc;

use leptos::prelude::*;

use crate::components::drop_zone::ScanDropZone;
use crate::components::result_panel::ResultPanel;
use crate::config::TriageConfig;
use crate::triage::session::{DashboardFrame, TriageObserver};
use crate::triage::session_from_config;

/// Pushes every session frame into a signal.
struct SignalObserver {
    set_frame: WriteSignal<DashboardFrame>,
}

impl TriageObserver for SignalObserver {
    fn render(&self, frame: &DashboardFrame) {
        // The page may already be gone when a late response lands.
        let _ = self.set_frame.try_set(frame.clone());
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let config = use_context::<TriageConfig>().unwrap_or_default();
    let triage = session_from_config(&config);

    let (frame, set_frame) = signal(triage.frame());
    triage.subscribe(Rc::new(SignalObserver { set_frame }));
    let session = StoredValue::new_local(triage);

    // Give the preview URL back when navigating away.
    on_cleanup(move || {
        session.try_with_value(|s| s.clear());
    });

    let model = Memo::new(move |_| frame.with(|f| f.view.clone()));
    let run_analysis = move || session.with_value(|s| s.trigger_analysis());
    let on_retry = Callback::new(move |_: ()| run_analysis());

    view! {
        <div class="page dashboard-page">
            <style>{include_str!("dashboard.css")}</style>

            <h2>"Chest X-Ray Analysis"</h2>
            <p class="page-description">
                "Upload a chest X-ray to screen for pneumonia. Results are advisory and must be reviewed by a clinician."
            </p>

            <div class="dashboard-grid">
                <section class="dashboard-card">
                    <h3>"Scan"</h3>
                    <ScanDropZone frame=frame session=session />
                    <div class="action-buttons">
                        <button
                            class="btn btn-primary"
                            disabled=move || !frame.with(|f| f.can_analyze)
                            on:click=move |_| run_analysis()
                        >
                            "Analyze Scan"
                        </button>
                    </div>
                </section>

                <section class="dashboard-card">
                    <h3>"Diagnosis"</h3>
                    {move || view! { <ResultPanel model=model.get() on_retry=on_retry /> }}
                </section>
            </div>
        </div>
    }
}
