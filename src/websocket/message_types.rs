use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Lead;

use super::ConnectionId;

/// Inbound WebSocket events from observer clients.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsInboundEvent {
    #[serde(rename = "subscribe-to-team", rename_all = "camelCase")]
    SubscribeToTeam { team_name: String },

    #[serde(rename = "unsubscribe-from-team", rename_all = "camelCase")]
    UnsubscribeFromTeam { team_name: String },

    #[serde(rename = "join-team", rename_all = "camelCase")]
    JoinTeam {
        team_name: String,
        #[serde(default)]
        user_info: Option<Value>,
    },

    #[serde(rename = "update-lead-status", rename_all = "camelCase")]
    UpdateLeadStatus {
        lead_id: String,
        status: String,
        #[serde(default)]
        team_name: Option<String>,
        #[serde(default)]
        assigned_to: Option<String>,
    },

    #[serde(rename = "claim-lead", rename_all = "camelCase")]
    ClaimLead {
        lead_id: String,
        claimed_by: String,
        #[serde(default)]
        team_name: Option<String>,
    },
}

/// Outbound events to observer clients.
///
/// Timestamps are stamped when the event value is built, immediately before
/// delivery, never at the upstream trigger. The global and team copies of
/// one logical event are therefore stamped independently and may differ by
/// microseconds; they are distinct deliveries, not distinct events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum WsOutboundEvent {
    #[serde(rename = "connection-confirmed", rename_all = "camelCase")]
    ConnectionConfirmed {
        connection_id: ConnectionId,
        connected_at: DateTime<Utc>,
        available_teams: Vec<String>,
    },

    #[serde(rename = "team-subscribed")]
    TeamSubscribed { team: String },

    #[serde(rename = "team-unsubscribed")]
    TeamUnsubscribed { team: String },

    #[serde(rename = "team-member-joined", rename_all = "camelCase")]
    TeamMemberJoined {
        connection_id: ConnectionId,
        team: String,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "team-member-left", rename_all = "camelCase")]
    TeamMemberLeft {
        connection_id: ConnectionId,
        team: String,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "new-team-member", rename_all = "camelCase")]
    NewTeamMember {
        connection_id: ConnectionId,
        user_info: Option<Value>,
        team: String,
        timestamp: DateTime<Utc>,
    },

    /// The raw lead, exactly as stored.
    #[serde(rename = "new-lead")]
    NewLead {
        #[serde(flatten)]
        lead: Lead,
    },

    /// Team copy of a new lead, stamped at delivery.
    #[serde(rename = "team-new-lead")]
    TeamNewLead {
        #[serde(flatten)]
        lead: Lead,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "lead-status-updated", rename_all = "camelCase")]
    LeadStatusUpdated {
        lead_id: String,
        status: String,
        updated_by: ConnectionId,
        timestamp: DateTime<Utc>,
        assigned_to: Option<String>,
    },

    #[serde(rename = "team-lead-updated", rename_all = "camelCase")]
    TeamLeadUpdated {
        lead_id: String,
        status: String,
        team_name: String,
        updated_by: ConnectionId,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "lead-claimed", rename_all = "camelCase")]
    LeadClaimed {
        lead_id: String,
        claimed_by: String,
        team_name: Option<String>,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "team-lead-claimed", rename_all = "camelCase")]
    TeamLeadClaimed {
        lead_id: String,
        claimed_by: String,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "lead-assigned", rename_all = "camelCase")]
    LeadAssigned {
        lead: Lead,
        assigned_team: Option<String>,
        assigned_by: String,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "team-lead-assigned", rename_all = "camelCase")]
    TeamLeadAssigned {
        lead: Lead,
        assigned_by: String,
        timestamp: DateTime<Utc>,
    },

    /// Free-form notice; payload keys must not collide with the envelope's
    /// "type" or "timestamp".
    #[serde(rename = "system-notification")]
    SystemNotification {
        #[serde(flatten)]
        notification: Value,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "team-notification")]
    TeamNotification {
        #[serde(flatten)]
        notification: Value,
        team: String,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "lead-stats-updated")]
    LeadStatsUpdated {
        #[serde(flatten)]
        stats: Value,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "system-alert")]
    SystemAlert {
        message: String,
        severity: String,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "team-performance")]
    TeamPerformance {
        team: String,
        metrics: Value,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "team-disconnected")]
    TeamDisconnected {
        team: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "team-member-disconnected", rename_all = "camelCase")]
    TeamMemberDisconnected {
        connection_id: ConnectionId,
        team: String,
        timestamp: DateTime<Utc>,
    },
}
