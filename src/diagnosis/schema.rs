use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use super::models::PlantDiagnosis;
use super::profile::{ConfidenceRepresentation, DiagnosisProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    Object,
    String,
    Number,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    pub description: String,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

/// Structured-output schema sent to Gemini as `generationConfig.responseSchema`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSchema {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    pub properties: BTreeMap<String, FieldSchema>,
    pub required: Vec<String>,
    pub property_ordering: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("response schema root must be an object")]
    NotAnObject,
    #[error("required field '{0}' has no property definition")]
    MissingProperty(String),
    #[error("field '{0}' is not part of the diagnosis result")]
    UnknownField(String),
    #[error("diagnosis field '{0}' is not marked required")]
    NotRequired(String),
    #[error("property ordering does not list exactly the defined properties")]
    BadOrdering,
}

impl ResponseSchema {
    pub fn for_profile(profile: &DiagnosisProfile) -> Self {
        let severity_list = profile.severity_levels.join(", ");

        let confidence = match profile.confidence {
            ConfidenceRepresentation::Fraction => FieldSchema {
                kind: SchemaType::Number,
                description: "A numeric score from 0.0 to 1.0 indicating the model's confidence in the diagnosis.".to_string(),
                enum_values: None,
            },
            ConfidenceRepresentation::Percentage => FieldSchema {
                kind: SchemaType::String,
                description: "The model's confidence in the diagnosis as a percentage string from 0% to 100%, e.g. \"85%\".".to_string(),
                enum_values: None,
            },
        };

        let fields = [
            (
                "diseaseName",
                FieldSchema {
                    kind: SchemaType::String,
                    description: format!(
                        "The name of the disease or primary problem diagnosed in the plant, e.g., \"Root Rot\" or \"Nutrient Deficiency\", written in {}.",
                        profile.language
                    ),
                    enum_values: None,
                },
            ),
            (
                "severity",
                FieldSchema {
                    kind: SchemaType::String,
                    description: format!(
                        "The severity level of the issue, strictly one of: {}.",
                        severity_list
                    ),
                    enum_values: Some(profile.severity_levels.clone()),
                },
            ),
            (
                "treatmentAdvice",
                FieldSchema {
                    kind: SchemaType::String,
                    description: format!(
                        "A detailed, actionable, and comprehensive summary of the steps required to treat and recover the plant, written in {}. This should be a single, detailed paragraph.",
                        profile.language
                    ),
                    enum_values: None,
                },
            ),
            ("confidenceScore", confidence),
        ];

        let property_ordering = fields.iter().map(|(name, _)| name.to_string()).collect();
        let required = PlantDiagnosis::FIELD_NAMES.iter().map(|n| n.to_string()).collect();
        let properties = fields
            .into_iter()
            .map(|(name, field)| (name.to_string(), field))
            .collect();

        Self {
            kind: SchemaType::Object,
            properties,
            required,
            property_ordering,
        }
    }

    /// Check that the schema describes exactly the `PlantDiagnosis` fields, all required.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.kind != SchemaType::Object {
            return Err(SchemaError::NotAnObject);
        }

        for name in &self.required {
            if !self.properties.contains_key(name) {
                return Err(SchemaError::MissingProperty(name.clone()));
            }
        }

        for name in self.properties.keys() {
            if !PlantDiagnosis::FIELD_NAMES.iter().any(|field| *field == name.as_str()) {
                return Err(SchemaError::UnknownField(name.clone()));
            }
        }

        for name in PlantDiagnosis::FIELD_NAMES {
            if !self.required.iter().any(|r| r == name) {
                return Err(SchemaError::NotRequired(name.to_string()));
            }
        }

        let mut ordering = self.property_ordering.clone();
        ordering.sort();
        let keys: Vec<String> = self.properties.keys().cloned().collect();
        if ordering != keys {
            return Err(SchemaError::BadOrdering);
        }

        Ok(())
    }
}
