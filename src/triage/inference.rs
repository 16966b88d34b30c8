//! Inference collaborator contract.
//!
//! The classification service receives the image as a multipart upload and
//! answers with a JSON object. [`decode_reply`] turns the transport status and
//! body into a [`DiagnosisResult`] or an [`InferenceError`]; every service
//! implementation goes through it.

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use super::diagnosis::{Confidence, DiagnosisResult, DiseaseDetail};
use super::preview::bytes_to_blob;
use super::upload::{ImageHandle, ImagePayload};
use crate::error::InferenceError;

pub type ClassifyFuture = Pin<Box<dyn Future<Output = Result<DiagnosisResult, InferenceError>>>>;

/// Anything that can classify an armed image.
///
/// The controller only ever sees this trait, so the live service and the
/// simulated one are interchangeable.
pub trait InferenceService {
    fn name(&self) -> &'static str;

    /// Start classifying `image`. Dispatch happens when the future is first
    /// polled.
    fn classify(&self, image: &ImageHandle) -> ClassifyFuture;
}

impl<T: InferenceService + ?Sized> InferenceService for Rc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn classify(&self, image: &ImageHandle) -> ClassifyFuture {
        (**self).classify(image)
    }
}

impl<T: InferenceService + ?Sized> InferenceService for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn classify(&self, image: &ImageHandle) -> ClassifyFuture {
        (**self).classify(image)
    }
}

// -- Wire schema --

/// Reply body of the classification endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InferenceReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_diseased: Option<bool>,
    /// Score in `[0, 1]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ReplyDetails>,
    /// Present when the service refused to classify
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplyDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disease_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pathogen_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub causes: Option<CauseList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatments: Option<Treatments>,
}

/// `causes` arrives as one sentence from the live service and as a list
/// from richer sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CauseList {
    One(String),
    Many(Vec<String>),
}

impl CauseList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            CauseList::One(cause) => vec![cause],
            CauseList::Many(causes) => causes,
        }
    }
}

/// Treatment options: conventional care first, then alternative remedies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Treatments {
    #[serde(default, rename = "antibiotics")]
    pub conventional: Vec<String>,
    #[serde(default, rename = "ayurvedic")]
    pub alternative: Vec<String>,
}

impl InferenceReply {
    pub fn into_diagnosis(self) -> Result<DiagnosisResult, InferenceError> {
        if let Some(message) = self.error {
            return Err(InferenceError::Collaborator(message));
        }

        let is_diseased = self
            .is_diseased
            .ok_or_else(|| InferenceError::Malformed("missing `is_diseased`".into()))?;
        let raw_confidence = self
            .confidence
            .ok_or_else(|| InferenceError::Malformed("missing `confidence`".into()))?;
        let confidence = Confidence::from_fraction(raw_confidence).ok_or_else(|| {
            InferenceError::Malformed(format!("confidence {} outside [0, 1]", raw_confidence))
        })?;

        if !is_diseased {
            // The service sends placeholder details for healthy scans; they
            // have no place in a normal result.
            return Ok(DiagnosisResult::normal(confidence));
        }

        let details = self
            .details
            .ok_or_else(|| InferenceError::Malformed("diseased reply without `details`".into()))?;
        let disease_name = details
            .disease_name
            .ok_or_else(|| InferenceError::Malformed("missing `details.disease_name`".into()))?;

        let causes: Vec<String> = details
            .pathogen_type
            .into_iter()
            .chain(details.causes.into_iter().flat_map(CauseList::into_vec))
            .collect();

        let symptoms = match details.symptoms {
            Some(symptoms) if !symptoms.is_empty() => symptoms,
            _ => details.description.into_iter().collect(),
        };

        let treatments = details
            .treatments
            .ok_or_else(|| InferenceError::Malformed("missing `details.treatments`".into()))?;
        let recommendations: Vec<String> = treatments
            .conventional
            .into_iter()
            .chain(treatments.alternative)
            .collect();

        let detail = DiseaseDetail::new(disease_name, causes, symptoms, recommendations)?;
        Ok(DiagnosisResult::diseased(confidence, detail))
    }
}

/// Classify a completed HTTP exchange.
///
/// Non-success status is a transport failure; a success status with a body
/// that does not fit the schema is a contract violation.
pub fn decode_reply(status: u16, body: &str) -> Result<DiagnosisResult, InferenceError> {
    if !(200..300).contains(&status) {
        return Err(InferenceError::Network(format!("inference service returned HTTP {}", status)));
    }

    let reply: InferenceReply = serde_json::from_str(body)?;
    reply.into_diagnosis()
}

// -- Live service --

/// Posts the image to the classification endpoint with `fetch`.
#[derive(Debug, Clone)]
pub struct HttpInference {
    endpoint: String,
    field_name: String,
}

impl HttpInference {
    pub fn new(endpoint: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            field_name: field_name.into(),
        }
    }
}

impl InferenceService for HttpInference {
    fn name(&self) -> &'static str {
        "http"
    }

    fn classify(&self, image: &ImageHandle) -> ClassifyFuture {
        let endpoint = self.endpoint.clone();
        let field_name = self.field_name.clone();
        let image = image.clone();
        Box::pin(async move { post_image(&endpoint, &field_name, &image).await })
    }
}

async fn post_image(
    endpoint: &str,
    field_name: &str,
    image: &ImageHandle,
) -> Result<DiagnosisResult, InferenceError> {
    let form = web_sys::FormData::new().map_err(js_network)?;
    match image.payload() {
        ImagePayload::File(file) => {
            form.append_with_blob_and_filename(field_name, file, image.name())
        }
        ImagePayload::Bytes(bytes) => {
            let blob = bytes_to_blob(bytes, image.media_type()).map_err(js_network)?;
            form.append_with_blob_and_filename(field_name, &blob, image.name())
        }
    }
    .map_err(js_network)?;

    let init = web_sys::RequestInit::new();
    init.set_method("POST");
    init.set_body(&form);
    init.set_credentials(web_sys::RequestCredentials::SameOrigin);

    let request = web_sys::Request::new_with_str_and_init(endpoint, &init).map_err(js_network)?;
    let window = web_sys::window()
        .ok_or_else(|| InferenceError::Network("no browser window".into()))?;

    debug!("POST {} ({} bytes)", endpoint, image.payload().len());

    let response: web_sys::Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_network)?
        .dyn_into()
        .map_err(|_| InferenceError::Network("fetch did not yield a Response".into()))?;

    let status = response.status();
    let body = JsFuture::from(response.text().map_err(js_network)?)
        .await
        .map_err(js_network)?
        .as_string()
        .unwrap_or_default();

    decode_reply(status, &body)
}

fn js_network(err: JsValue) -> InferenceError {
    InferenceError::Network(format!("{:?}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureReason;
    use crate::triage::diagnosis::Status;

    const BACTERIAL: &str = r#"{
        "class": "PNEUMONIA",
        "confidence": 0.928,
        "is_diseased": true,
        "details": {
            "disease_name": "Bacterial Pneumonia",
            "pathogen_type": "Bacteria (Streptococcus pneumoniae)",
            "causes": "Bacterial infection causing inflammation of lung alveoli.",
            "description": "Opacities consistent with bacterial infection.",
            "treatments": {
                "antibiotics": ["Amoxicillin (500mg)", "Azithromycin (Z-Pak)"],
                "ayurvedic": ["Steam Inhalation (Tulsi)"]
            }
        }
    }"#;

    #[test]
    fn test_normal_reply() {
        let result = decode_reply(200, r#"{"is_diseased": false, "confidence": 0.984}"#).unwrap();
        assert_eq!(result.status(), Status::Normal);
        assert_eq!(result.confidence.percent(), 98.4);
    }

    #[test]
    fn test_normal_reply_ignores_placeholder_details() {
        let body = r#"{
            "class": "NORMAL", "confidence": 0.91, "is_diseased": false,
            "details": {"disease_name": "No Abnormalities", "pathogen_type": "None",
                        "treatments": {"antibiotics": ["None required"], "ayurvedic": []}}
        }"#;
        let result = decode_reply(200, body).unwrap();
        assert!(result.detail().is_none());
    }

    #[test]
    fn test_diseased_reply_maps_details_in_order() {
        let result = decode_reply(200, BACTERIAL).unwrap();
        let detail = result.detail().expect("diseased result carries detail");

        assert_eq!(detail.disease_name(), "Bacterial Pneumonia");
        assert_eq!(detail.causes()[0], "Bacteria (Streptococcus pneumoniae)");
        assert_eq!(detail.causes().len(), 2);
        assert_eq!(detail.symptoms(), &["Opacities consistent with bacterial infection.".to_string()][..]);
        assert_eq!(
            detail.recommendations(),
            &[
                "Amoxicillin (500mg)".to_string(),
                "Azithromycin (Z-Pak)".to_string(),
                "Steam Inhalation (Tulsi)".to_string(),
            ][..]
        );
        assert_eq!(result.confidence.rounded(), 93);
    }

    #[test]
    fn test_explicit_symptoms_take_precedence() {
        let mut reply: InferenceReply = serde_json::from_str(BACTERIAL).unwrap();
        if let Some(details) = reply.details.as_mut() {
            details.symptoms = Some(vec!["High fever".into(), "Productive cough".into()]);
        }
        let result = reply.into_diagnosis().unwrap();
        assert_eq!(result.detail().unwrap().symptoms().len(), 2);
    }

    #[test]
    fn test_cause_list_follows_pathogen() {
        let body = r#"{"is_diseased": true, "confidence": 0.9, "details": {
            "disease_name": "Bacterial Pneumonia",
            "pathogen_type": "Streptococcus pneumoniae infection",
            "causes": ["Aspiration of oral secretions", " ", "Secondary infection"],
            "description": "Lobar consolidation",
            "treatments": {"antibiotics": ["Sputum culture"]}}}"#;
        let result = decode_reply(200, body).unwrap();
        assert_eq!(
            result.detail().unwrap().causes(),
            &[
                "Streptococcus pneumoniae infection".to_string(),
                "Aspiration of oral secretions".to_string(),
                "Secondary infection".to_string(),
            ][..]
        );
    }

    #[test]
    fn test_diseased_without_details_is_malformed() {
        let err = decode_reply(200, r#"{"is_diseased": true, "confidence": 0.7}"#).unwrap_err();
        assert_eq!(err.reason(), FailureReason::MalformedResponse);
    }

    #[test]
    fn test_diseased_with_empty_treatments_is_malformed() {
        let body = r#"{"is_diseased": true, "confidence": 0.7, "details": {
            "disease_name": "Viral Pneumonia", "pathogen_type": "Virus",
            "description": "Diffuse pattern", "treatments": {"antibiotics": [], "ayurvedic": []}}}"#;
        assert_eq!(
            decode_reply(200, body).unwrap_err().reason(),
            FailureReason::MalformedResponse
        );
    }

    #[test]
    fn test_out_of_range_confidence_is_malformed() {
        let err = decode_reply(200, r#"{"is_diseased": false, "confidence": 98.4}"#).unwrap_err();
        assert_eq!(err.reason(), FailureReason::MalformedResponse);
    }

    #[test]
    fn test_non_json_body_is_malformed() {
        let err = decode_reply(200, "<!DOCTYPE html><html></html>").unwrap_err();
        assert_eq!(err.reason(), FailureReason::MalformedResponse);
    }

    #[test]
    fn test_http_failure_is_network_error() {
        let err = decode_reply(500, r#"{"error": "Model not available"}"#).unwrap_err();
        assert_eq!(err.reason(), FailureReason::NetworkError);
    }

    #[test]
    fn test_error_field_is_collaborator_error() {
        let err = decode_reply(200, r#"{"error": "Failed to process image"}"#).unwrap_err();
        assert_eq!(err, InferenceError::Collaborator("Failed to process image".into()));
    }
}
