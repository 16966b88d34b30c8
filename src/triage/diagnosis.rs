//! Classification outcome types.
//!
//! Disease detail lives inside the `Diseased` variant, so a normal result
//! cannot carry it and a diseased one cannot lack it.

use std::fmt;

use crate::error::InferenceError;

/// Confidence as a percentage in `[0, 100]`, kept to one decimal place.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Confidence(f64);

impl Confidence {
    pub fn from_percent(percent: f64) -> Option<Self> {
        if percent.is_finite() && (0.0..=100.0).contains(&percent) {
            Some(Self((percent * 10.0).round() / 10.0))
        } else {
            None
        }
    }

    /// Scale a collaborator score in `[0, 1]` to a percentage.
    pub fn from_fraction(fraction: f64) -> Option<Self> {
        if fraction.is_finite() && (0.0..=1.0).contains(&fraction) {
            Some(Self((fraction * 1000.0).round() / 10.0))
        } else {
            None
        }
    }

    pub fn percent(self) -> f64 {
        self.0
    }

    /// Whole-number percentage for badges and gauges.
    pub fn rounded(self) -> u8 {
        self.0.round().clamp(0.0, 100.0) as u8
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

/// Clinical detail attached to a positive finding. All lists are ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct DiseaseDetail {
    disease_name: String,
    causes: Vec<String>,
    symptoms: Vec<String>,
    recommendations: Vec<String>,
}

impl DiseaseDetail {
    pub fn new(
        disease_name: impl Into<String>,
        causes: Vec<String>,
        symptoms: Vec<String>,
        recommendations: Vec<String>,
    ) -> Result<Self, InferenceError> {
        let disease_name = disease_name.into().trim().to_string();
        if disease_name.is_empty() {
            return Err(InferenceError::Malformed("disease name is empty".into()));
        }

        let causes = non_blank(causes, "causes")?;
        let symptoms = non_blank(symptoms, "symptoms")?;
        let recommendations = non_blank(recommendations, "recommendations")?;

        Ok(Self {
            disease_name,
            causes,
            symptoms,
            recommendations,
        })
    }

    pub fn disease_name(&self) -> &str {
        &self.disease_name
    }

    pub fn causes(&self) -> &[String] {
        &self.causes
    }

    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }
}

fn non_blank(items: Vec<String>, field: &str) -> Result<Vec<String>, InferenceError> {
    let items: Vec<String> = items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if items.is_empty() {
        Err(InferenceError::Malformed(format!("{} list is empty", field)))
    } else {
        Ok(items)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Normal,
    Diseased,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    Normal,
    Diseased(DiseaseDetail),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisResult {
    pub finding: Finding,
    pub confidence: Confidence,
}

impl DiagnosisResult {
    pub fn normal(confidence: Confidence) -> Self {
        Self {
            finding: Finding::Normal,
            confidence,
        }
    }

    pub fn diseased(confidence: Confidence, detail: DiseaseDetail) -> Self {
        Self {
            finding: Finding::Diseased(detail),
            confidence,
        }
    }

    pub fn status(&self) -> Status {
        match self.finding {
            Finding::Normal => Status::Normal,
            Finding::Diseased(_) => Status::Diseased,
        }
    }

    pub fn detail(&self) -> Option<&DiseaseDetail> {
        match &self.finding {
            Finding::Normal => None,
            Finding::Diseased(detail) => Some(detail),
        }
    }
}
