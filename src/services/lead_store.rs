use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{CreateLeadRequest, Lead};

/// In-memory lead store.
///
/// Stands in for the external persistence collaborator: callers hand over the
/// request fields and get back the stored record with a generated id and
/// creation timestamp.
#[derive(Default)]
pub struct LeadStore {
    leads: RwLock<Vec<Lead>>,
}

impl LeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, req: CreateLeadRequest, assigned_team: String) -> Lead {
        let lead = Lead {
            id: Uuid::new_v4(),
            name: req.name,
            email: req.email,
            budget: req.budget,
            location: req.location,
            assigned_team,
            created_at: Utc::now(),
        };

        self.leads.write().await.push(lead.clone());
        lead
    }

    /// All stored leads, newest first.
    pub async fn list(&self) -> Vec<Lead> {
        let mut leads = self.leads.read().await.clone();
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        leads
    }
}
