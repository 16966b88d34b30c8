use leptos::prelude::*;
use leptos_router::components::*;
use leptos_router::path;

use crate::components::sidebar::Sidebar;
use crate::config::TriageConfig;
use crate::pages::dashboard::DashboardPage;
use crate::pages::login::LoginPage;

/// Paths with a `<Route>` below.
pub const APP_ROUTES: &[&str] = &["/", "/dashboard"];

#[component]
pub fn App(config: TriageConfig) -> impl IntoView {
    provide_context(config);

    view! {
        <Router>
            <div class="app-layout">
                <Sidebar />
                <main class="content">
                    <Routes fallback=|| view! { <p>"Page not found"</p> }>
                        <Route path=path!("/") view=LoginPage />
                        <Route path=path!("/dashboard") view=DashboardPage />
                    </Routes>
                </main>
            </div>
        </Router>
    }
}
