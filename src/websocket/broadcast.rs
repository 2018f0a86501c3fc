use chrono::Utc;
use serde_json::Value;

use crate::models::Lead;

use super::message_types::WsOutboundEvent;
use super::{encode, ConnectionId, HubState, SocketHub};

impl HubState {
    /// Delivers one event to every registered connection. A dead mailbox is
    /// skipped; it never aborts the loop.
    pub(crate) fn deliver_global(&self, event: &WsOutboundEvent) {
        let Some(payload) = encode(event) else { return };
        for conn in self.registry.iter() {
            if !conn.send_raw(payload.clone()) {
                tracing::debug!(connection = %conn.id, "skipping dead mailbox during global delivery");
            }
        }
    }

    /// Delivers one event to the members of `team`, optionally excluding one
    /// connection (a joiner is not told about its own join). Unknown teams
    /// deliver to nobody.
    pub(crate) fn deliver_to_team_except(
        &self,
        team: &str,
        except: Option<ConnectionId>,
        event: &WsOutboundEvent,
    ) {
        let Some(members) = self.teams.members(team) else {
            return;
        };
        let Some(payload) = encode(event) else { return };
        for id in members {
            if Some(*id) == except {
                continue;
            }
            let Some(conn) = self.registry.get(*id) else {
                continue;
            };
            if !conn.send_raw(payload.clone()) {
                tracing::debug!(connection = %id, team = %team, "skipping dead mailbox during team delivery");
            }
        }
    }
}

impl SocketHub {
    /// Delivers `event` to every connected observer.
    pub async fn broadcast_global(&self, event: WsOutboundEvent) {
        self.inner.read().await.deliver_global(&event);
    }

    /// Delivers `event` to the current members of `team_name`. Unknown or
    /// empty team names are a silent no-op.
    pub async fn broadcast_to_team(&self, team_name: &str, event: WsOutboundEvent) {
        if team_name.is_empty() {
            return;
        }
        self.inner
            .read()
            .await
            .deliver_to_team_except(team_name, None, &event);
    }

    /// Announces a freshly created lead to everyone, and additionally to its
    /// assigned team's room when it has one.
    pub async fn broadcast_lead_created(&self, lead: &Lead) {
        tracing::info!(lead = %lead.name, team = %lead.assigned_team, "broadcasting new lead");
        let state = self.inner.read().await;
        state.deliver_global(&WsOutboundEvent::NewLead { lead: lead.clone() });
        if !lead.assigned_team.is_empty() {
            state.deliver_to_team_except(
                &lead.assigned_team,
                None,
                &WsOutboundEvent::TeamNewLead {
                    lead: lead.clone(),
                    timestamp: Utc::now(),
                },
            );
        }
    }

    /// Global status update, plus a team copy when a team is supplied.
    pub async fn broadcast_status_update(
        &self,
        lead_id: &str,
        status: &str,
        updated_by: ConnectionId,
        assigned_to: Option<String>,
        team_name: Option<&str>,
    ) {
        tracing::info!(lead = %lead_id, status = %status, by = %updated_by, "lead status update");
        let state = self.inner.read().await;
        state.deliver_global(&WsOutboundEvent::LeadStatusUpdated {
            lead_id: lead_id.to_string(),
            status: status.to_string(),
            updated_by,
            timestamp: Utc::now(),
            assigned_to,
        });
        if let Some(team) = team_name.filter(|t| !t.is_empty()) {
            state.deliver_to_team_except(
                team,
                None,
                &WsOutboundEvent::TeamLeadUpdated {
                    lead_id: lead_id.to_string(),
                    status: status.to_string(),
                    team_name: team.to_string(),
                    updated_by,
                    timestamp: Utc::now(),
                },
            );
        }
    }

    pub async fn broadcast_claim(&self, lead_id: &str, claimed_by: &str, team_name: Option<&str>) {
        tracing::info!(lead = %lead_id, by = %claimed_by, "lead claimed");
        let state = self.inner.read().await;
        state.deliver_global(&WsOutboundEvent::LeadClaimed {
            lead_id: lead_id.to_string(),
            claimed_by: claimed_by.to_string(),
            team_name: team_name.map(str::to_string),
            timestamp: Utc::now(),
        });
        if let Some(team) = team_name.filter(|t| !t.is_empty()) {
            state.deliver_to_team_except(
                team,
                None,
                &WsOutboundEvent::TeamLeadClaimed {
                    lead_id: lead_id.to_string(),
                    claimed_by: claimed_by.to_string(),
                    timestamp: Utc::now(),
                },
            );
        }
    }

    pub async fn broadcast_assignment(
        &self,
        lead: &Lead,
        assigned_team: Option<&str>,
        assigned_by: &str,
    ) {
        let state = self.inner.read().await;
        state.deliver_global(&WsOutboundEvent::LeadAssigned {
            lead: lead.clone(),
            assigned_team: assigned_team.map(str::to_string),
            assigned_by: assigned_by.to_string(),
            timestamp: Utc::now(),
        });
        if let Some(team) = assigned_team.filter(|t| !t.is_empty()) {
            state.deliver_to_team_except(
                team,
                None,
                &WsOutboundEvent::TeamLeadAssigned {
                    lead: lead.clone(),
                    assigned_by: assigned_by.to_string(),
                    timestamp: Utc::now(),
                },
            );
        }
    }

    /// Global-only routing statistics snapshot.
    pub async fn broadcast_stats(&self, stats: Value) {
        self.inner.read().await.deliver_global(&WsOutboundEvent::LeadStatsUpdated {
            stats,
            timestamp: Utc::now(),
        });
    }

    /// System-wide alert; severity defaults to "info".
    pub async fn broadcast_alert(&self, message: &str, severity: Option<&str>) {
        self.inner.read().await.deliver_global(&WsOutboundEvent::SystemAlert {
            message: message.to_string(),
            severity: severity.unwrap_or("info").to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Generic notification: always global, additionally scoped to a team's
    /// room when one is supplied.
    pub async fn broadcast_notification(&self, notification: Value, team_name: Option<&str>) {
        let state = self.inner.read().await;
        state.deliver_global(&WsOutboundEvent::SystemNotification {
            notification: notification.clone(),
            timestamp: Utc::now(),
        });
        if let Some(team) = team_name.filter(|t| !t.is_empty()) {
            state.deliver_to_team_except(
                team,
                None,
                &WsOutboundEvent::TeamNotification {
                    notification,
                    team: team.to_string(),
                    timestamp: Utc::now(),
                },
            );
        }
    }

    /// Team-scoped performance metrics; there is no global tier for these.
    pub async fn send_team_performance(&self, team_name: &str, metrics: Value) {
        if team_name.is_empty() {
            return;
        }
        self.inner.read().await.deliver_to_team_except(
            team_name,
            None,
            &WsOutboundEvent::TeamPerformance {
                team: team_name.to_string(),
                metrics,
                timestamp: Utc::now(),
            },
        );
    }
}
