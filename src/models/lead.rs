use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sales lead as returned by the lead store, id and creation timestamp
/// included. The fan-out core only ever sees it as event payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub budget: f64,
    pub location: String,
    pub assigned_team: String,
    pub created_at: DateTime<Utc>,
}

/// Incoming payload for POST /api/leads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadRequest {
    pub name: String,
    pub email: String,
    pub budget: f64,
    pub location: String,
}
