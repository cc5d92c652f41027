pub mod models;
pub mod normalize;
pub mod profile;
pub mod schema;
pub mod service;

pub use models::{ConfidenceScore, PlantDiagnosis};
pub use profile::{ConfidenceRepresentation, DiagnosisProfile};
pub use schema::ResponseSchema;
pub use service::ImageDiagnosisService;
