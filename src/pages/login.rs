//! Sign-in and account registration.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use leptos_router::NavigateOptions;
use wasm_bindgen_futures::spawn_local;

use crate::app::APP_ROUTES;
use crate::commands::{self, Registration, MIN_PASSWORD_LEN};
use crate::config::TriageConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    SignIn,
    Register,
}

#[derive(Debug, Clone, PartialEq)]
enum Message {
    Error(String),
    Success(String),
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_context::<TriageConfig>().unwrap_or_default().auth;
    let navigate = use_navigate();

    let (mode, set_mode) = signal(Mode::SignIn);
    let (message, set_message) = signal::<Option<Message>>(None);
    let (busy, set_busy) = signal(false);

    let (name, set_name) = signal(String::new());
    let (username, set_username) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (role, set_role) = signal(String::from("radiologist"));

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        set_message.set(None);
        set_busy.set(true);

        let auth = auth.clone();
        let navigate = navigate.clone();
        match mode.get_untracked() {
            Mode::SignIn => {
                let user = username.get_untracked();
                let pass = password.get_untracked();
                spawn_local(async move {
                    match commands::login(&auth, &user, &pass).await {
                        Ok(target) => {
                            let target = commands::resolve_redirect(&target, &auth.landing, APP_ROUTES);
                            navigate(target, NavigateOptions::default());
                        }
                        Err(e) => set_message.set(Some(Message::Error(e.to_string()))),
                    }
                    set_busy.set(false);
                });
            }
            Mode::Register => {
                let registration = Registration {
                    name: name.get_untracked(),
                    username: username.get_untracked(),
                    password: password.get_untracked(),
                    role: role.get_untracked(),
                };
                spawn_local(async move {
                    match commands::register(&auth, &registration).await {
                        Ok(text) => {
                            set_message.set(Some(Message::Success(text)));
                            set_password.set(String::new());
                            set_mode.set(Mode::SignIn);
                        }
                        Err(e) => set_message.set(Some(Message::Error(e.to_string()))),
                    }
                    set_busy.set(false);
                });
            }
        }
    };

    let toggle = move |_| {
        set_message.set(None);
        set_mode.update(|m| {
            *m = match m {
                Mode::SignIn => Mode::Register,
                Mode::Register => Mode::SignIn,
            }
        });
    };

    let registering = move || mode.get() == Mode::Register;

    view! {
        <div class="page login-page">
            <style>{include_str!("login.css")}</style>

            <div class="auth-card">
                <h2>{move || if registering() { "Create Account" } else { "Sign In" }}</h2>

                {move || message.get().map(|msg| match msg {
                    Message::Error(text) => view! { <div class="auth-message error">{text}</div> }.into_any(),
                    Message::Success(text) => view! { <div class="auth-message success">{text}</div> }.into_any(),
                })}

                <form on:submit=on_submit>
                    <Show when=registering>
                        <input
                            class="input"
                            type="text"
                            placeholder="Full name"
                            prop:value=name
                            on:input=move |ev| set_name.set(event_target_value(&ev))
                        />
                    </Show>
                    <input
                        class="input"
                        type="text"
                        placeholder="Username"
                        autocomplete="username"
                        prop:value=username
                        on:input=move |ev| set_username.set(event_target_value(&ev))
                    />
                    <input
                        class="input"
                        type="password"
                        placeholder=format!("Password (min {} characters)", MIN_PASSWORD_LEN)
                        prop:value=password
                        on:input=move |ev| set_password.set(event_target_value(&ev))
                    />
                    <Show when=registering>
                        <select
                            class="input"
                            prop:value=role
                            on:change=move |ev| set_role.set(event_target_value(&ev))
                        >
                            <option value="radiologist">"Radiologist"</option>
                            <option value="physician">"Physician"</option>
                            <option value="technician">"Technician"</option>
                        </select>
                    </Show>
                    <button class="btn btn-primary" type="submit" disabled=move || busy.get()>
                        {move || match (registering(), busy.get()) {
                            (_, true) => "Please wait...",
                            (true, false) => "Register",
                            (false, false) => "Sign In",
                        }}
                    </button>
                </form>

                <p class="auth-toggle">
                    {move || if registering() { "Already have an account? " } else { "New here? " }}
                    <a href="#" on:click=move |ev: web_sys::MouseEvent| {
                        ev.prevent_default();
                        toggle(());
                    }>
                        {move || if registering() { "Sign in" } else { "Create an account" }}
                    </a>
                </p>
            </div>
        </div>
    }
}
