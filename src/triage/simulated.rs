//! Stand-in classifier for demos and offline work.
//!
//! Waits a fixed delay, then answers with a canned normal or pneumonia reply
//! chosen by a pseudo-random roll. The reply is serialized and decoded through
//! the same path as a live response.

use std::rc::Rc;
use std::time::Duration;

use wasm_bindgen_futures::JsFuture;

use super::inference::{
    decode_reply, CauseList, ClassifyFuture, InferenceReply, InferenceService, ReplyDetails,
    Treatments,
};
use super::upload::ImageHandle;
use crate::error::InferenceError;

pub struct SimulatedInference {
    delay: Duration,
    healthy_probability: f64,
    roll: Rc<dyn Fn() -> f64>,
}

impl SimulatedInference {
    pub fn new(delay: Duration, healthy_probability: f64) -> Self {
        Self {
            delay,
            healthy_probability: healthy_probability.clamp(0.0, 1.0),
            roll: Rc::new(js_sys::Math::random),
        }
    }

    /// Replace the random source. `roll` must return values in `[0, 1)`.
    pub fn with_roll(mut self, roll: impl Fn() -> f64 + 'static) -> Self {
        self.roll = Rc::new(roll);
        self
    }

    fn reply(&self) -> InferenceReply {
        if (self.roll)() < self.healthy_probability {
            normal_reply()
        } else {
            pneumonia_reply()
        }
    }
}

impl InferenceService for SimulatedInference {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn classify(&self, image: &ImageHandle) -> ClassifyFuture {
        let reply = self.reply();
        let delay = self.delay;
        tracing::debug!("Simulating analysis of {} ({:?})", image.name(), delay);

        Box::pin(async move {
            if !delay.is_zero() {
                sleep(delay).await?;
            }
            let body = serde_json::to_string(&reply)?;
            decode_reply(200, &body)
        })
    }
}

fn normal_reply() -> InferenceReply {
    InferenceReply {
        class: Some("NORMAL".into()),
        is_diseased: Some(false),
        confidence: Some(0.984),
        ..Default::default()
    }
}

fn pneumonia_reply() -> InferenceReply {
    let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    InferenceReply {
        class: Some("PNEUMONIA".into()),
        is_diseased: Some(true),
        confidence: Some(0.928),
        details: Some(ReplyDetails {
            disease_name: Some("Bacterial Pneumonia".into()),
            pathogen_type: Some("Streptococcus pneumoniae infection".into()),
            causes: Some(CauseList::Many(owned(&[
                "Aspiration of oral secretions",
                "Secondary infection following viral respiratory illness",
            ]))),
            description: Some("Opacities consistent with bacterial infection.".into()),
            symptoms: Some(owned(&[
                "High fever and chills",
                "Productive cough with yellow/green sputum",
                "Sharp chest pain during deep breathing",
            ])),
            treatments: Some(Treatments {
                conventional: owned(&[
                    "Immediate consultation with a Pulmonologist",
                    "Sputum culture and blood tests required for confirmation",
                    "Start broad-spectrum antibiotics as per clinical guidelines",
                    "Monitor oxygen saturation levels",
                ]),
                alternative: Vec::new(),
            }),
        }),
        error: None,
    }
}

/// Resolve after `delay` using the browser timer.
async fn sleep(delay: Duration) -> Result<(), InferenceError> {
    let window = web_sys::window()
        .ok_or_else(|| InferenceError::Network("no browser window".into()))?;
    let millis = delay.as_millis().min(i32::MAX as u128) as i32;

    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis) {
            tracing::warn!("Failed to schedule timer: {:?}", e);
        }
    });

    JsFuture::from(promise)
        .await
        .map(|_| ())
        .map_err(|e| InferenceError::Network(format!("{:?}", e)))
}
