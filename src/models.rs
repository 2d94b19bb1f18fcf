// Wire models for the ACADEMIYA-Hub REST resources
// Field names follow the backend serializers; nested *_details blocks and
// counters are read-only and may be absent depending on the endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Role;

/// Lightweight user block nested in other resources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLight {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Departement {
    pub id: i64,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub manager: Option<i64>,
    #[serde(default)]
    pub manager_details: Option<UserLight>,
    #[serde(default)]
    pub filieres_count: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create/update payload for a departement (ADMIN only)
#[derive(Debug, Clone, Serialize)]
pub struct DepartementInput {
    pub name: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Academic level of a filière
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Niveau {
    License,
    Master,
    Doctorat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filiere {
    pub id: i64,
    pub name: String,
    pub code: String,
    // Detail endpoints carry the id, list endpoints carry the name
    #[serde(default)]
    pub departement: Option<i64>,
    #[serde(default)]
    pub departement_name: Option<String>,
    pub niveau: Niveau,
    pub capacity: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub modules_count: Option<i64>,
    #[serde(default)]
    pub inscriptions_count: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FiliereInput {
    pub name: String,
    pub code: String,
    pub departement: i64,
    pub niveau: Niveau,
    pub capacity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub filiere: i64,
    #[serde(default)]
    pub filiere_details: Option<Filiere>,
    #[serde(default)]
    pub enseignant: Option<i64>,
    #[serde(default)]
    pub enseignant_details: Option<UserLight>,
    pub semestre: u8,
    /// DRF decimal fields arrive as strings ("1.00")
    #[serde(default)]
    pub coefficient: Option<String>,
    #[serde(default)]
    pub heures_cm: u32,
    #[serde(default)]
    pub heures_td: u32,
    #[serde(default)]
    pub heures_tp: u32,
    #[serde(default)]
    pub total_heures: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Validation status of an enrollment record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InscriptionStatus {
    Pending,
    Validated,
    Rejected,
}

/// A student's enrollment in a filière for an academic year
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inscription {
    pub id: i64,
    pub student: i64,
    #[serde(default)]
    pub student_details: Option<UserLight>,
    pub filiere: i64,
    #[serde(default)]
    pub filiere_details: Option<Filiere>,
    pub academic_year: String,
    pub status: InscriptionStatus,
    #[serde(default)]
    pub validated_by: Option<i64>,
    #[serde(default)]
    pub validated_by_details: Option<UserLight>,
    #[serde(default)]
    pub validation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Enrollment request submitted by a student
#[derive(Debug, Clone, Serialize)]
pub struct InscriptionInput {
    pub filiere: i64,
    pub academic_year: String,
}

/// Validation decision posted to /inscriptions/{id}/validate/
#[derive(Debug, Clone, Serialize)]
pub struct InscriptionDecision {
    pub status: InscriptionStatus,
    pub rejection_reason: String,
}

/// A grade record for one student and module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub student: i64,
    pub module: i64,
    pub academic_year: String,
    #[serde(default)]
    pub note_controle: Option<f64>,
    #[serde(default)]
    pub note_examen: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoteInput {
    pub student: i64,
    pub module: i64,
    pub academic_year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_controle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_examen: Option<f64>,
}

/// One row of a bulk grade submission
#[derive(Debug, Clone, Serialize)]
pub struct GradeEntry {
    pub student_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_controle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_examen: Option<f64>,
}

/// POST /notes/bulk_update_grades/ request body
#[derive(Debug, Clone, Serialize)]
pub struct BulkGradeUpdate {
    pub module_id: i64,
    pub academic_year: String,
    pub grades: Vec<GradeEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inscription_deserializes_full_payload() {
        let body = r#"{
            "id": 7,
            "student": 12,
            "student_details": {"id": 12, "username": "amine", "role": "ETUDIANT"},
            "filiere": 3,
            "academic_year": "2024-2025",
            "status": "PENDING",
            "validated_by": null,
            "validation_date": null,
            "rejection_reason": null,
            "created_at": "2024-09-02T08:15:00Z"
        }"#;

        let inscription: Inscription = serde_json::from_str(body).unwrap();
        assert_eq!(inscription.status, InscriptionStatus::Pending);
        assert_eq!(inscription.student_details.unwrap().role, Role::Etudiant);
        assert!(inscription.validated_by.is_none());
    }

    #[test]
    fn test_filiere_list_shape() {
        // List endpoints return departement_name instead of the id
        let body = r#"{
            "id": 3, "name": "Génie Informatique", "code": "GI",
            "departement_name": "Informatique", "niveau": "LICENSE", "capacity": 30
        }"#;

        let filiere: Filiere = serde_json::from_str(body).unwrap();
        assert_eq!(filiere.niveau, Niveau::License);
        assert!(filiere.departement.is_none());
        assert_eq!(filiere.departement_name.as_deref(), Some("Informatique"));
    }

    #[test]
    fn test_decision_wire_format() {
        let decision = InscriptionDecision {
            status: InscriptionStatus::Rejected,
            rejection_reason: "Dossier incomplet".to_string(),
        };
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["status"], "REJECTED");
        assert_eq!(json["rejection_reason"], "Dossier incomplet");
    }

    #[test]
    fn test_module_decimal_coefficient() {
        let body = r#"{
            "id": 1, "name": "Algorithmique", "code": "ALG101",
            "filiere": 3, "semestre": 1, "coefficient": "2.50",
            "heures_cm": 20, "heures_td": 10, "heures_tp": 10
        }"#;

        let module: Module = serde_json::from_str(body).unwrap();
        assert_eq!(module.coefficient.as_deref(), Some("2.50"));
        assert_eq!(module.semestre, 1);
    }
}
