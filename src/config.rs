//! Runtime configuration.
//!
//! The host page may define `window.__TRIAGE_CONFIG__` before the bundle
//! loads; any field it omits takes its default.

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::error::ConfigError;

const GLOBAL_NAME: &str = "__TRIAGE_CONFIG__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriageConfig {
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub simulated: SimulatedConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferenceMode {
    #[default]
    Live,
    Simulated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default)]
    pub mode: InferenceMode,
    #[serde(default = "default_predict_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_field_name")]
    pub field_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedConfig {
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default = "default_healthy_probability")]
    pub healthy_probability: f64,
    /// Start analysing as soon as a scan is uploaded
    #[serde(default = "default_true")]
    pub auto_analyze: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_login_endpoint")]
    pub login_endpoint: String,
    #[serde(default = "default_register_endpoint")]
    pub register_endpoint: String,
    #[serde(default = "default_landing")]
    pub landing: String,
    #[serde(default = "default_logout_endpoint")]
    pub logout_endpoint: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

fn default_predict_endpoint() -> String { "/predict".to_string() }
fn default_field_name() -> String { "file".to_string() }
fn default_delay_ms() -> u64 { 2500 }
fn default_healthy_probability() -> f64 { 0.6 }
fn default_true() -> bool { true }
fn default_login_endpoint() -> String { "/login".to_string() }
fn default_register_endpoint() -> String { "/register".to_string() }
fn default_landing() -> String { "/dashboard".to_string() }
fn default_logout_endpoint() -> String { "/logout".to_string() }

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            mode: InferenceMode::default(),
            endpoint: default_predict_endpoint(),
            field_name: default_field_name(),
        }
    }
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            healthy_probability: default_healthy_probability(),
            auto_analyze: default_true(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_endpoint: default_login_endpoint(),
            register_endpoint: default_register_endpoint(),
            landing: default_landing(),
            logout_endpoint: default_logout_endpoint(),
        }
    }
}

impl TriageConfig {
    /// Uploads start an analysis by themselves only with the simulated
    /// service; the live service waits for an explicit trigger.
    pub fn auto_analyze(&self) -> bool {
        self.inference.mode == InferenceMode::Simulated && self.simulated.auto_analyze
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read the page-global config object, if the host page defined one.
    pub fn from_window() -> Result<Option<Self>, ConfigError> {
        let Some(window) = web_sys::window() else {
            return Ok(None);
        };
        let value = js_sys::Reflect::get(&window, &wasm_bindgen::JsValue::from_str(GLOBAL_NAME))
            .map_err(|e| ConfigError::Decode(format!("{:?}", e)))?;
        if value.is_undefined() || value.is_null() {
            return Ok(None);
        }
        serde_wasm_bindgen::from_value(value)
            .map(Some)
            .map_err(|e| ConfigError::Decode(e.to_string()))
    }
}
