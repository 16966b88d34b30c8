use leptos::prelude::*;

use crate::triage::presenter::{Badge, Tone};

#[component]
pub fn DiagnosisBadge(badge: Badge) -> impl IntoView {
    let icon = match badge.tone {
        Tone::Positive => "\u{2713}",
        Tone::Caution => "!",
    };
    let class = format!("status-badge {}", badge.tone.css_class());

    view! {
        <span class=class>
            <span class="status-icon">{icon}</span>
            <span class="status-text">{badge.label}</span>
        </span>
    }
}
