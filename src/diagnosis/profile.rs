use super::models::{ConfidenceScore, PlantDiagnosis};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceRepresentation {
    /// A JSON number from 0.0 to 1.0.
    Fraction,
    /// A JSON string such as `"85%"`.
    Percentage,
}

/// Product-level knobs for the shape and language of a diagnosis.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisProfile {
    /// Language for `diseaseName` and `treatmentAdvice`.
    pub language: String,
    pub severity_levels: Vec<String>,
    pub confidence: ConfidenceRepresentation,
    /// Attach a structured-output schema to the request.
    pub strict_schema: bool,
}

impl DiagnosisProfile {
    /// Strict schema, English severity labels, 0.0 to 1.0 confidence.
    pub fn structured() -> Self {
        Self {
            language: "Arabic".to_string(),
            severity_levels: ["Low", "Medium", "High", "None"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            confidence: ConfidenceRepresentation::Fraction,
            strict_schema: true,
        }
    }

    /// Free-text prompt, Arabic severity labels, percentage confidence.
    pub fn arabic() -> Self {
        Self {
            language: "Arabic".to_string(),
            severity_levels: ["منخفضة", "متوسطة", "عالية", "لا يوجد"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            confidence: ConfidenceRepresentation::Percentage,
            strict_schema: false,
        }
    }

    pub fn prompt(&self) -> String {
        let language = self.language.to_uppercase();
        let severities = self.severity_levels.join(", ");
        let confidence = match self.confidence {
            ConfidenceRepresentation::Fraction => "a number from 0.0 to 1.0",
            ConfidenceRepresentation::Percentage => "a percentage string such as \"85%\"",
        };

        if self.strict_schema {
            format!(
                "Analyze this plant image. Provide the diagnosis and treatment advice as structured JSON according to the provided schema. \
                 Diagnose the disease, determine severity (one of: {}), provide comprehensive treatment advice, and estimate confidence ({}). \
                 The output for diseaseName and treatmentAdvice MUST be in {}.",
                severities, confidence, language
            )
        } else {
            format!(
                "Analyze this plant image. Diagnose the disease, determine its severity, provide comprehensive and actionable treatment advice, and estimate your confidence. \
                 Respond with only a JSON object with exactly these keys: \
                 \"diseaseName\" (string), \"severity\" (one of: {}), \"treatmentAdvice\" (a single detailed paragraph), \"confidenceScore\" ({}). \
                 The values of diseaseName and treatmentAdvice MUST be in {}.",
                severities, confidence, language
            )
        }
    }

    /// Check a parsed diagnosis against this profile's vocabulary and ranges.
    pub fn check(&self, diagnosis: &PlantDiagnosis) -> Result<(), String> {
        if diagnosis.disease_name.trim().is_empty() {
            return Err("diseaseName is empty".to_string());
        }

        if diagnosis.treatment_advice.trim().is_empty() {
            return Err("treatmentAdvice is empty".to_string());
        }

        if !self.severity_levels.iter().any(|s| s == &diagnosis.severity) {
            return Err(format!(
                "severity '{}' is not one of: {}",
                diagnosis.severity,
                self.severity_levels.join(", ")
            ));
        }

        match (self.confidence, &diagnosis.confidence_score) {
            (ConfidenceRepresentation::Fraction, ConfidenceScore::Fraction(score)) => {
                if !(0.0..=1.0).contains(score) {
                    return Err(format!("confidenceScore {} is outside 0.0 to 1.0", score));
                }
            }
            (ConfidenceRepresentation::Percentage, ConfidenceScore::Percentage(raw)) => {
                match diagnosis.confidence_score.percentage_value() {
                    Some(value) if (0.0..=100.0).contains(&value) => {}
                    _ => return Err(format!("confidenceScore '{}' is not a percentage", raw)),
                }
            }
            (expected, actual) => {
                return Err(format!(
                    "confidenceScore {:?} does not use the {:?} representation",
                    actual, expected
                ));
            }
        }

        Ok(())
    }
}

impl Default for DiagnosisProfile {
    fn default() -> Self {
        Self::structured()
    }
}
