use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;

use super::message_types::WsOutboundEvent;
use super::{encode, Connection, ConnectionId, SocketHub};

impl SocketHub {
    /// Registers a new observer connection and confirms it with the list of
    /// teams known at connect time (a later team does not update an already
    /// sent confirmation).
    pub async fn connect(&self, sender: UnboundedSender<String>) -> ConnectionId {
        let id = ConnectionId::new();

        let mut guard = self.inner.write().await;
        let state = &mut *guard;
        if let Err(e) = state.registry.register(Connection::new(id, sender)) {
            // Transport bug; keep the hub alive and move on.
            tracing::warn!(error = %e, "connection registration rejected");
            return id;
        }
        tracing::info!(connection = %id, "client connected");

        if let Some(conn) = state.registry.get(id) {
            let confirmation = WsOutboundEvent::ConnectionConfirmed {
                connection_id: id,
                connected_at: conn.connected_at,
                available_teams: state.teams.list_known(),
            };
            if let Some(payload) = encode(&confirmation) {
                conn.send_raw(payload);
            }
        }
        id
    }

    /// Tears a connection down. Safe to call twice; the second call finds
    /// nothing to clean up.
    pub async fn disconnect(&self, id: ConnectionId) {
        let mut guard = self.inner.write().await;
        let state = &mut *guard;
        let Some(conn) = state.registry.unregister(id) else {
            return;
        };
        tracing::info!(connection = %id, "client disconnected");

        if let Some(team) = conn.team {
            state.teams.remove_member(&team, id);
            state.deliver_to_team_except(
                &team,
                Some(id),
                &WsOutboundEvent::TeamMemberDisconnected {
                    connection_id: id,
                    team: team.clone(),
                    timestamp: Utc::now(),
                },
            );
        }
    }

    /// Dissolves a team room: members are told why, the team is forgotten,
    /// and their sessions stay open with no team. Unknown teams are a no-op.
    pub async fn disconnect_team(&self, team_name: &str, reason: &str) {
        let mut guard = self.inner.write().await;
        let state = &mut *guard;
        if !state.teams.is_known(team_name) {
            return;
        }

        state.deliver_to_team_except(
            team_name,
            None,
            &WsOutboundEvent::TeamDisconnected {
                team: team_name.to_string(),
                reason: reason.to_string(),
                timestamp: Utc::now(),
            },
        );

        let members = state.teams.forget(team_name).unwrap_or_default();
        for id in members {
            if let Some(conn) = state.registry.get_mut(id) {
                conn.team = None;
            }
        }
        tracing::info!(team = %team_name, reason = %reason, "team disconnected");
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{connect_client, drain, event_types};
    use super::super::SocketHub;

    #[tokio::test]
    async fn connect_confirms_with_teams_known_at_connect_time() {
        let hub = SocketHub::new();
        let (a, mut rx_a) = connect_client(&hub).await;
        hub.subscribe(a, "X").await;

        let (b, mut rx_b) = connect_client(&hub).await;

        let b_events = drain(&mut rx_b);
        assert_eq!(event_types(&b_events), vec!["connection-confirmed"]);
        assert_eq!(b_events[0]["connectionId"], b.to_string());
        assert!(b_events[0]["connectedAt"].is_string());
        assert_eq!(b_events[0]["availableTeams"], serde_json::json!(["X"]));

        // The first client connected before any team existed.
        let a_events = drain(&mut rx_a);
        assert_eq!(a_events[0]["availableTeams"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn disconnect_notifies_the_team_once_and_is_idempotent() {
        let hub = SocketHub::new();
        let (a, mut rx_a) = connect_client(&hub).await;
        let (b, mut rx_b) = connect_client(&hub).await;
        hub.subscribe(a, "T").await;
        hub.subscribe(b, "T").await;
        drain(&mut rx_a);
        drain(&mut rx_b);

        hub.disconnect(b).await;

        let a_events = drain(&mut rx_a);
        assert_eq!(event_types(&a_events), vec!["team-member-disconnected"]);
        assert_eq!(a_events[0]["connectionId"], b.to_string());
        assert_eq!(hub.member_count("T").await, 1);
        assert_eq!(hub.connected_count().await, 1);

        hub.disconnect(b).await;
        assert!(drain(&mut rx_a).is_empty());
        assert_eq!(hub.connected_count().await, 1);
    }

    #[tokio::test]
    async fn disconnect_without_team_notifies_nobody() {
        let hub = SocketHub::new();
        let (a, _rx_a) = connect_client(&hub).await;
        let (b, mut rx_b) = connect_client(&hub).await;
        hub.subscribe(b, "T").await;
        drain(&mut rx_b);

        hub.disconnect(a).await;

        assert!(drain(&mut rx_b).is_empty());
        assert_eq!(hub.connected_count().await, 1);
    }

    #[tokio::test]
    async fn disconnect_team_dissolves_the_room_but_keeps_sessions() {
        let hub = SocketHub::new();
        let (a, mut rx_a) = connect_client(&hub).await;
        let (b, mut rx_b) = connect_client(&hub).await;
        hub.subscribe(a, "X").await;
        hub.subscribe(b, "X").await;
        drain(&mut rx_a);
        drain(&mut rx_b);

        hub.disconnect_team("X", "shift over").await;

        for rx in [&mut rx_a, &mut rx_b] {
            let events = drain(rx);
            assert_eq!(event_types(&events), vec!["team-disconnected"]);
            assert_eq!(events[0]["reason"], "shift over");
        }
        assert_eq!(hub.member_count("X").await, 0);
        assert!(!hub.known_teams().await.contains(&"X".to_string()));
        assert_eq!(hub.connection(a).await.unwrap().team, None);
        assert_eq!(hub.connected_count().await, 2);

        // A later subscribe recreates the team from scratch.
        hub.subscribe(a, "X").await;
        assert_eq!(hub.member_count("X").await, 1);
        assert!(hub.known_teams().await.contains(&"X".to_string()));
    }

    #[tokio::test]
    async fn disconnect_unknown_team_is_a_noop() {
        let hub = SocketHub::new();
        let (_a, mut rx_a) = connect_client(&hub).await;
        drain(&mut rx_a);

        hub.disconnect_team("Ghost", "because").await;

        assert!(drain(&mut rx_a).is_empty());
    }
}
