use leptos::prelude::*;

use crate::config::TriageConfig;

#[component]
pub fn Sidebar() -> impl IntoView {
    let logout = use_context::<TriageConfig>().unwrap_or_default().auth.logout_endpoint;

    view! {
        <nav class="sidebar">
            <div class="sidebar-header">
                <h1 class="sidebar-title">"X-Ray Triage"</h1>
                <p class="sidebar-subtitle">"Pneumonia Screening"</p>
            </div>
            <ul class="nav-list">
                <li class="nav-item">
                    <a href="/dashboard" class="nav-link">"Dashboard"</a>
                </li>
                <li class="nav-item">
                    <a href="/" class="nav-link">"Sign In"</a>
                </li>
                <li class="nav-item">
                    // Served by the auth service, not the client router.
                    <a href=logout class="nav-link" rel="external">"Sign Out"</a>
                </li>
            </ul>
        </nav>
    }
}
