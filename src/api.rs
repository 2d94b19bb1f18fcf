// Typed resource wrappers over the API client
// One handle per backend collection, mirroring the REST surface

use serde_json::Value;

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{
    BulkGradeUpdate, Departement, DepartementInput, Filiere, FiliereInput, GradeEntry,
    Inscription, InscriptionDecision, InscriptionInput, InscriptionStatus, Module, Niveau, Note,
    NoteInput,
};

impl ApiClient {
    pub fn departements(&self) -> Departements<'_> {
        Departements { client: self }
    }

    pub fn filieres(&self) -> Filieres<'_> {
        Filieres { client: self }
    }

    pub fn modules(&self) -> Modules<'_> {
        Modules { client: self }
    }

    pub fn inscriptions(&self) -> Inscriptions<'_> {
        Inscriptions { client: self }
    }

    pub fn notes(&self) -> Notes<'_> {
        Notes { client: self }
    }

    pub fn dashboard(&self) -> Dashboard<'_> {
        Dashboard { client: self }
    }
}

/// `/departements/` collection (writes are ADMIN only)
pub struct Departements<'a> {
    client: &'a ApiClient,
}

impl Departements<'_> {
    pub async fn list(&self) -> Result<Vec<Departement>> {
        self.client.get("/departements/").await
    }

    pub async fn get(&self, id: i64) -> Result<Departement> {
        self.client.get(&format!("/departements/{}/", id)).await
    }

    pub async fn create(&self, input: &DepartementInput) -> Result<Departement> {
        self.client.post("/departements/", input).await
    }

    pub async fn update(&self, id: i64, input: &DepartementInput) -> Result<Departement> {
        self.client
            .put(&format!("/departements/{}/", id), input)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/departements/{}/", id)).await
    }
}

/// `/filieres/` collection
pub struct Filieres<'a> {
    client: &'a ApiClient,
}

impl Filieres<'_> {
    pub async fn list(
        &self,
        departement: Option<i64>,
        niveau: Option<Niveau>,
    ) -> Result<Vec<Filiere>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(id) = departement {
            query.push(("departement", id.to_string()));
        }
        if let Some(niveau) = niveau {
            query.push((
                "niveau",
                serde_json::to_value(niveau)
                    .ok()
                    .and_then(|v| v.as_str().map(String::from))
                    .unwrap_or_default(),
            ));
        }
        self.client.get_query("/filieres/", &query).await
    }

    pub async fn get(&self, id: i64) -> Result<Filiere> {
        self.client.get(&format!("/filieres/{}/", id)).await
    }

    pub async fn create(&self, input: &FiliereInput) -> Result<Filiere> {
        self.client.post("/filieres/", input).await
    }

    pub async fn update(&self, id: i64, input: &FiliereInput) -> Result<Filiere> {
        self.client.put(&format!("/filieres/{}/", id), input).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/filieres/{}/", id)).await
    }
}

/// `/modules/` collection
pub struct Modules<'a> {
    client: &'a ApiClient,
}

impl Modules<'_> {
    pub async fn list(
        &self,
        filiere: Option<i64>,
        semestre: Option<u8>,
    ) -> Result<Vec<Module>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(id) = filiere {
            query.push(("filiere", id.to_string()));
        }
        if let Some(s) = semestre {
            query.push(("semestre", s.to_string()));
        }
        self.client.get_query("/modules/", &query).await
    }

    pub async fn get(&self, id: i64) -> Result<Module> {
        self.client.get(&format!("/modules/{}/", id)).await
    }

    pub async fn create(&self, input: &Value) -> Result<Module> {
        self.client.post("/modules/", input).await
    }

    pub async fn update(&self, id: i64, input: &Value) -> Result<Module> {
        self.client.put(&format!("/modules/{}/", id), input).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/modules/{}/", id)).await
    }
}

/// `/inscriptions/` collection and its governance actions
pub struct Inscriptions<'a> {
    client: &'a ApiClient,
}

impl Inscriptions<'_> {
    /// List visible inscriptions (the backend scopes by role), optionally
    /// filtered by status and academic year
    pub async fn list(
        &self,
        status: Option<InscriptionStatus>,
        academic_year: Option<&str>,
    ) -> Result<Vec<Inscription>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(status) = status {
            query.push((
                "status",
                serde_json::to_value(status)
                    .ok()
                    .and_then(|v| v.as_str().map(String::from))
                    .unwrap_or_default(),
            ));
        }
        if let Some(year) = academic_year {
            query.push(("academic_year", year.to_string()));
        }
        self.client.get_query("/inscriptions/", &query).await
    }

    pub async fn get(&self, id: i64) -> Result<Inscription> {
        self.client.get(&format!("/inscriptions/{}/", id)).await
    }

    /// Submit an enrollment (ETUDIANT only; status starts PENDING)
    pub async fn create(&self, input: &InscriptionInput) -> Result<Inscription> {
        self.client.post("/inscriptions/", input).await
    }

    /// The calling student's own inscriptions
    pub async fn mine(&self) -> Result<Vec<Inscription>> {
        self.client.get("/inscriptions/my_inscriptions/").await
    }

    /// Pending inscriptions in the admin's departments
    pub async fn pending(&self) -> Result<Vec<Inscription>> {
        self.client.get("/inscriptions/pending/").await
    }

    /// Validate or reject a pending inscription (ADMIN only).
    /// A rejection requires a reason; the backend enforces it with a 400.
    pub async fn validate(
        &self,
        id: i64,
        status: InscriptionStatus,
        rejection_reason: impl Into<String>,
    ) -> Result<Inscription> {
        let decision = InscriptionDecision {
            status,
            rejection_reason: rejection_reason.into(),
        };
        self.client
            .post(&format!("/inscriptions/{}/validate/", id), &decision)
            .await
    }

    pub async fn update(&self, id: i64, input: &InscriptionInput) -> Result<Inscription> {
        self.client
            .put(&format!("/inscriptions/{}/", id), input)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/inscriptions/{}/", id)).await
    }
}

/// `/notes/` collection plus the teacher-facing grade actions
pub struct Notes<'a> {
    client: &'a ApiClient,
}

impl Notes<'_> {
    pub async fn list(&self) -> Result<Vec<Note>> {
        self.client.get("/notes/").await
    }

    pub async fn get(&self, id: i64) -> Result<Note> {
        self.client.get(&format!("/notes/{}/", id)).await
    }

    pub async fn create(&self, input: &NoteInput) -> Result<Note> {
        self.client.post("/notes/", input).await
    }

    pub async fn update(&self, id: i64, input: &NoteInput) -> Result<Note> {
        self.client.put(&format!("/notes/{}/", id), input).await
    }

    pub async fn partial_update(&self, id: i64, input: &Value) -> Result<Note> {
        self.client.patch(&format!("/notes/{}/", id), input).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/notes/{}/", id)).await
    }

    /// Modules assigned to the calling teacher
    pub async fn my_modules(&self) -> Result<Vec<Module>> {
        self.client.get("/notes/my_modules/").await
    }

    /// Grade sheet for one module and academic year
    pub async fn students_by_module(&self, module_id: i64, academic_year: &str) -> Result<Value> {
        let query = [
            ("module_id", module_id.to_string()),
            ("academic_year", academic_year.to_string()),
        ];
        self.client
            .get_query("/notes/students_by_module/", &query)
            .await
    }

    /// Submit a whole grade sheet in one call
    pub async fn bulk_update_grades(
        &self,
        module_id: i64,
        academic_year: &str,
        grades: Vec<GradeEntry>,
    ) -> Result<Value> {
        let body = BulkGradeUpdate {
            module_id,
            academic_year: academic_year.to_string(),
            grades,
        };
        self.client.post("/notes/bulk_update_grades/", &body).await
    }
}

/// Precomputed KPI payloads for the direction dashboards.
/// Chart shapes are a presentation concern, passed through opaquely.
pub struct Dashboard<'a> {
    client: &'a ApiClient,
}

impl Dashboard<'_> {
    pub async fn admin(&self) -> Result<Value> {
        self.client.get("/admin/dashboard/").await
    }

    pub async fn performance(&self) -> Result<Value> {
        self.client.get("/admin/performance/").await
    }
}
