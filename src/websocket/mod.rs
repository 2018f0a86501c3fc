use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc::UnboundedSender, RwLock};
use uuid::Uuid;

pub mod broadcast;
pub mod lifecycle;
pub mod message_types;
pub mod registry;
pub mod subscription;
pub mod teams;

pub use registry::ConnectionRegistry;
pub use teams::TeamDirectory;

use message_types::WsOutboundEvent;

/// Unique identifier for one live observer session.
///
/// Minted when the connection registers; all membership bookkeeping and
/// outbound event payloads reference it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One live connection: metadata plus its outbound mailbox.
pub struct Connection {
    pub id: ConnectionId,
    pub connected_at: DateTime<Utc>,
    pub team: Option<String>,
    pub user_info: Option<serde_json::Value>,
    sender: UnboundedSender<String>,
}

impl Connection {
    fn new(id: ConnectionId, sender: UnboundedSender<String>) -> Self {
        Self {
            id,
            connected_at: Utc::now(),
            team: None,
            user_info: None,
            sender,
        }
    }

    /// Fire-and-forget delivery into the connection's mailbox.
    fn send_raw(&self, payload: String) -> bool {
        self.sender.send(payload).is_ok()
    }
}

/// Registry and team directory under a single writer lock.
///
/// Every mutation runs to completion under the write guard, which serializes
/// e.g. a subscribe and a disconnect racing on the same connection. Broadcast
/// paths only ever take the read guard.
pub(crate) struct HubState {
    pub(crate) registry: ConnectionRegistry,
    pub(crate) teams: TeamDirectory,
}

impl HubState {
    fn new() -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            teams: TeamDirectory::new(),
        }
    }
}

/// Fan-out hub for observer connections.
///
/// Tracks who is connected, which team room each connection follows, and
/// delivers domain events either globally or scoped to one team. Cheap to
/// clone; all clones share the same state.
#[derive(Clone)]
pub struct SocketHub {
    inner: Arc<RwLock<HubState>>,
}

impl SocketHub {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HubState::new())),
        }
    }

    pub async fn connection(&self, id: ConnectionId) -> Option<ConnectionInfo> {
        self.inner.read().await.registry.get(id).map(ConnectionInfo::from)
    }

    pub async fn connected_count(&self) -> usize {
        self.inner.read().await.registry.len()
    }

    pub async fn member_count(&self, team_name: &str) -> usize {
        self.inner.read().await.teams.member_count(team_name)
    }

    pub async fn known_teams(&self) -> Vec<String> {
        self.inner.read().await.teams.list_known()
    }

    /// Dashboard snapshot of everyone connected.
    pub async fn connections_info(&self) -> ConnectedClientsInfo {
        let state = self.inner.read().await;
        let clients = state
            .registry
            .iter()
            .map(|conn| (conn.id.to_string(), ConnectionInfo::from(conn)))
            .collect();
        ConnectedClientsInfo {
            total_connected: state.registry.len(),
            clients,
            active_teams: state.teams.list_known(),
        }
    }

    /// Snapshot of one team's room.
    pub async fn team_stats(&self, team_name: &str) -> TeamStats {
        let state = self.inner.read().await;
        let members: Vec<ConnectionInfo> = state
            .teams
            .members(team_name)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.registry.get(*id))
                    .map(ConnectionInfo::from)
                    .collect()
            })
            .unwrap_or_default();
        TeamStats {
            team_name: team_name.to_string(),
            member_count: members.len(),
            members,
            is_active: state.teams.is_known(team_name),
        }
    }
}

impl Default for SocketHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of one connection, minus its mailbox.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub connection_id: ConnectionId,
    pub connected_at: DateTime<Utc>,
    pub team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<serde_json::Value>,
}

impl From<&Connection> for ConnectionInfo {
    fn from(conn: &Connection) -> Self {
        Self {
            connection_id: conn.id,
            connected_at: conn.connected_at,
            team: conn.team.clone(),
            user_info: conn.user_info.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedClientsInfo {
    pub total_connected: usize,
    pub clients: HashMap<String, ConnectionInfo>,
    pub active_teams: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub team_name: String,
    pub member_count: usize,
    pub members: Vec<ConnectionInfo>,
    pub is_active: bool,
}

/// Serializes an outbound event, dropping it (with a log) on failure so no
/// single bad payload can take the fan-out loop down.
pub(crate) fn encode(event: &WsOutboundEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode outbound event");
            None
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{connect_client, drain};
    use super::*;

    #[tokio::test]
    async fn connections_info_reports_clients_and_teams() {
        let hub = SocketHub::new();
        let (a, mut rx_a) = connect_client(&hub).await;
        let (b, _rx_b) = connect_client(&hub).await;
        hub.subscribe(a, "Enterprise Team").await;
        drain(&mut rx_a);

        let info = hub.connections_info().await;
        assert_eq!(info.total_connected, 2);
        assert!(info.clients.contains_key(&a.to_string()));
        assert!(info.clients.contains_key(&b.to_string()));
        assert_eq!(info.active_teams, vec!["Enterprise Team".to_string()]);
        assert_eq!(
            info.clients[&a.to_string()].team.as_deref(),
            Some("Enterprise Team")
        );
    }

    #[tokio::test]
    async fn team_stats_reports_members_and_activity() {
        let hub = SocketHub::new();
        let (a, _rx_a) = connect_client(&hub).await;
        let (_b, _rx_b) = connect_client(&hub).await;
        hub.subscribe(a, "General Team").await;

        let stats = hub.team_stats("General Team").await;
        assert_eq!(stats.member_count, 1);
        assert!(stats.is_active);
        assert_eq!(stats.members[0].connection_id, a);

        let unknown = hub.team_stats("Nobody").await;
        assert_eq!(unknown.member_count, 0);
        assert!(!unknown.is_active);
    }
}
