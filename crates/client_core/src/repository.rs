use async_trait::async_trait;
use chrono::Utc;
use shared::{
    domain::LeadId,
    protocol::{CreateLeadData, Lead, UpdateLeadData},
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("failed to fetch leads: {0}")]
    Fetch(String),
    #[error("failed to save lead: {0}")]
    Save(String),
    #[error("failed to delete lead: {0}")]
    Delete(String),
    #[error("lead {0} not found")]
    NotFound(LeadId),
}

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// CRUD access to the remote lead collection.
#[async_trait]
pub trait LeadRepository: Send + Sync {
    async fn list(&self) -> RepositoryResult<Vec<Lead>>;
    async fn create(&self, data: CreateLeadData) -> RepositoryResult<Lead>;
    async fn update(&self, id: LeadId, data: UpdateLeadData) -> RepositoryResult<Lead>;
    async fn delete(&self, id: LeadId) -> RepositoryResult<()>;
}

/// Process-local repository with server semantics: ids are assigned on
/// create, timestamps are stamped here, and insertion order is kept.
pub struct InMemoryLeadRepository {
    inner: Mutex<InMemoryState>,
}

struct InMemoryState {
    leads: Vec<Lead>,
    next_id: i64,
}

impl InMemoryLeadRepository {
    pub fn new() -> Self {
        Self::with_leads(Vec::new())
    }

    pub fn with_leads(leads: Vec<Lead>) -> Self {
        let next_id = leads.iter().map(|lead| lead.id.0).max().unwrap_or(0) + 1;
        Self {
            inner: Mutex::new(InMemoryState { leads, next_id }),
        }
    }

    pub fn with_sample_leads() -> Self {
        Self::with_leads(sample_leads())
    }

    pub async fn leads(&self) -> Vec<Lead> {
        self.inner.lock().await.leads.clone()
    }
}

impl Default for InMemoryLeadRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LeadRepository for InMemoryLeadRepository {
    async fn list(&self) -> RepositoryResult<Vec<Lead>> {
        Ok(self.inner.lock().await.leads.clone())
    }

    async fn create(&self, data: CreateLeadData) -> RepositoryResult<Lead> {
        let mut guard = self.inner.lock().await;
        let now = Utc::now();
        let lead = Lead {
            id: LeadId(guard.next_id),
            organisation_id: data.organisation_id,
            full_name: data.full_name,
            position: data.position,
            company: data.company,
            location: data.location,
            profile_url: data.profile_url,
            followers: data.followers,
            connections: data.connections,
            education: data.education,
            personal_message: data.personal_message,
            message_length: data.message_length,
            generated_at: data.generated_at,
            total_leads: data.total_leads,
            created_at: now,
            updated_at: now,
        };
        guard.next_id += 1;
        guard.leads.push(lead.clone());
        Ok(lead)
    }

    async fn update(&self, id: LeadId, data: UpdateLeadData) -> RepositoryResult<Lead> {
        let mut guard = self.inner.lock().await;
        let lead = guard
            .leads
            .iter_mut()
            .find(|lead| lead.id == id)
            .ok_or(RepositoryError::NotFound(id))?;
        data.apply_to(lead);
        lead.updated_at = Utc::now();
        Ok(lead.clone())
    }

    async fn delete(&self, id: LeadId) -> RepositoryResult<()> {
        let mut guard = self.inner.lock().await;
        let position = guard
            .leads
            .iter()
            .position(|lead| lead.id == id)
            .ok_or(RepositoryError::NotFound(id))?;
        guard.leads.remove(position);
        Ok(())
    }
}

/// The two contacts the leads screen shipped with before the API existed.
pub fn sample_leads() -> Vec<Lead> {
    decode_fixture(SAMPLE_LEADS_JSON)
}

fn decode_fixture(raw: &str) -> Vec<Lead> {
    serde_json::from_str(raw).unwrap_or_else(|err| {
        warn!(error = %err, "sample lead fixture did not decode; starting empty");
        Vec::new()
    })
}

const SAMPLE_LEADS_JSON: &str = r#"[
    {
        "id": 2,
        "organisation_id": 9,
        "full_name": "John doe Doe",
        "position": "Senior 22Software Engineer",
        "company": "TechCorp International",
        "location": "Paris, France",
        "profile_url": "https://www.linkedin.com/in/johndoe",
        "followers": 1500,
        "connections": 500,
        "education": "Master in Computer Science",
        "personal_message": "Hello, nice to connect! Updated message",
        "message_length": 35,
        "generated_at": "2025-01-31 00:00:00",
        "total_leads": 1,
        "created_at": "2025-12-02T21:38:57.000000Z",
        "updated_at": "2025-12-02T21:39:50.000000Z"
    },
    {
        "id": 3,
        "organisation_id": 9,
        "full_name": "Jane Smith",
        "position": "Product Manager",
        "company": "Innovate Inc.",
        "location": "New York, USA",
        "profile_url": "https://www.linkedin.com/in/janesmith",
        "followers": 2500,
        "connections": 800,
        "education": "MBA",
        "personal_message": "Looking forward to connecting.",
        "message_length": 30,
        "generated_at": "2025-02-15 00:00:00",
        "total_leads": 1,
        "created_at": "2025-12-03T11:20:30.000000Z",
        "updated_at": "2025-12-03T11:20:30.000000Z"
    }
]"#;

#[cfg(test)]
#[path = "tests/repository_tests.rs"]
mod tests;
