//! Browser dashboard for AI-assisted chest X-ray triage.
//!
//! One [`triage::TriageSession`] drives either the routed Leptos app or, on
//! pages that ship their own dashboard markup, the [`scripted`] binding.

pub mod app;
pub mod commands;
pub mod components;
pub mod config;
pub mod error;
pub mod logging;
pub mod pages;
pub mod scripted;
pub mod triage;

use leptos::prelude::*;

use app::App;
use config::TriageConfig;

/// Entry point: read page config, start logging, mount the UI.
pub fn start() {
    let (config, problem) = match TriageConfig::from_window() {
        Ok(found) => (found.unwrap_or_default(), None),
        Err(e) => (TriageConfig::default(), Some(e)),
    };
    logging::init(config.log_level.into());
    if let Some(e) = problem {
        tracing::warn!("Ignoring invalid page config: {}", e);
    }

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        tracing::error!("No document to mount into");
        return;
    };

    if scripted::is_present(&document) {
        let session = triage::session_from_config(&config);
        if let Err(e) = scripted::install(&document, session) {
            tracing::error!("Could not bind dashboard markup: {:?}", e);
        }
    } else {
        leptos::mount::mount_to_body(move || view! { <App config=config /> });
    }
}
