//! Typed client for the auth service used by the login screens.

use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::config::AuthConfig;
use crate::error::ApiError;

pub const MIN_PASSWORD_LEN: usize = 4;

// -- Request bodies --

#[derive(Serialize)]
struct LoginArgs<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Registration {
    pub name: String,
    pub username: String,
    pub password: String,
    pub role: String,
}

impl Registration {
    /// Checks the auth service would otherwise reject.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty()
            || self.username.trim().is_empty()
            || self.password.trim().is_empty()
        {
            return Err(ApiError::Rejected("All fields are required.".to_string()));
        }
        if self.password.trim().chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::Rejected(format!(
                "Password must be at least {} characters.",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

// -- Response body --

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthOutcome {
    #[serde(default)]
    pub success: bool,
    pub redirect: Option<String>,
    pub message: Option<String>,
}

impl AuthOutcome {
    /// Turn a refusal into an error carrying the service's message.
    pub fn accepted(self, fallback: &str) -> Result<Self, ApiError> {
        if self.success {
            Ok(self)
        } else {
            Err(ApiError::Rejected(
                self.message.unwrap_or_else(|| fallback.to_string()),
            ))
        }
    }
}

pub fn decode_outcome(body: &str) -> Result<AuthOutcome, ApiError> {
    Ok(serde_json::from_str(body)?)
}

// -- Typed helpers --

/// Log in and return where the browser should go next.
pub async fn login(config: &AuthConfig, username: &str, password: &str) -> Result<String, ApiError> {
    let outcome = post_json(&config.login_endpoint, &LoginArgs { username, password })
        .await?
        .accepted("Login failed")?;

    Ok(outcome.redirect.unwrap_or_else(|| config.landing.clone()))
}

/// Where to send the browser after sign-in. Targets the app has no route for
/// fall back to `landing`.
pub fn resolve_redirect<'a>(target: &'a str, landing: &'a str, routes: &[&str]) -> &'a str {
    if routes.contains(&target) {
        target
    } else {
        tracing::info!("No route for {}, going to {}", target, landing);
        landing
    }
}

/// Create an account and return the service's confirmation text.
pub async fn register(config: &AuthConfig, registration: &Registration) -> Result<String, ApiError> {
    registration.validate()?;

    let outcome = post_json(&config.register_endpoint, registration)
        .await?
        .accepted("Registration failed")?;

    Ok(outcome
        .message
        .unwrap_or_else(|| format!("Account created for {}! You can now log in.", registration.name)))
}

async fn post_json<T: Serialize>(endpoint: &str, body: &T) -> Result<AuthOutcome, ApiError> {
    let payload = serde_json::to_string(body)?;

    let headers = web_sys::Headers::new().map_err(transport)?;
    headers
        .set("Content-Type", "application/json")
        .map_err(transport)?;

    let init = web_sys::RequestInit::new();
    init.set_method("POST");
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(&payload));
    init.set_credentials(web_sys::RequestCredentials::SameOrigin);

    let request = web_sys::Request::new_with_str_and_init(endpoint, &init).map_err(transport)?;
    let window = web_sys::window().ok_or_else(|| ApiError::Transport("no browser window".into()))?;

    let response: web_sys::Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(transport)?
        .dyn_into()
        .map_err(|_| ApiError::Transport("fetch did not yield a Response".into()))?;

    let text = JsFuture::from(response.text().map_err(transport)?)
        .await
        .map_err(transport)?
        .as_string()
        .unwrap_or_default();

    tracing::debug!("POST {} -> {}", endpoint, response.status());
    decode_outcome(&text)
}

fn transport(err: JsValue) -> ApiError {
    ApiError::Transport(format!("{:?}", err))
}
