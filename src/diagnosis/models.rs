use serde::{Deserialize, Serialize};

/// Diagnosis returned to the caller, exactly as the model produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantDiagnosis {
    pub disease_name: String,
    pub severity: String,
    pub treatment_advice: String,
    pub confidence_score: ConfidenceScore,
}

impl PlantDiagnosis {
    /// JSON keys of the result, in the order the model is asked to emit them.
    pub const FIELD_NAMES: [&'static str; 4] =
        ["diseaseName", "severity", "treatmentAdvice", "confidenceScore"];
}

/// Either a 0.0 to 1.0 score or a percentage string such as `"85%"`,
/// depending on the active profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfidenceScore {
    Fraction(f64),
    Percentage(String),
}

impl ConfidenceScore {
    /// Parse a percentage string into its numeric value (`"85%"` -> 85.0).
    pub fn percentage_value(&self) -> Option<f64> {
        match self {
            ConfidenceScore::Percentage(raw) => raw
                .trim()
                .trim_end_matches('%')
                .trim()
                .parse::<f64>()
                .ok(),
            ConfidenceScore::Fraction(_) => None,
        }
    }
}
