use chrono::Utc;
use serde_json::Value;

use super::message_types::WsOutboundEvent;
use super::{encode, ConnectionId, HubState, SocketHub};

impl SocketHub {
    /// Puts the connection into `team_name`'s room.
    ///
    /// A connection follows at most one team. Subscribing while already in a
    /// room silently moves the connection over: the old team gets no leave
    /// notice (fire-and-forget, matching the dashboard protocol), and
    /// re-subscribing to the current team re-announces the join. Empty team
    /// names are ignored.
    pub async fn subscribe(&self, id: ConnectionId, team_name: &str) {
        if team_name.is_empty() {
            return;
        }
        let mut guard = self.inner.write().await;
        subscribe_locked(&mut guard, id, team_name);
    }

    /// Takes the connection out of `team_name`'s room.
    ///
    /// No-op when the name is empty or does not match the connection's
    /// current team.
    pub async fn unsubscribe(&self, id: ConnectionId, team_name: &str) {
        if team_name.is_empty() {
            return;
        }
        let mut guard = self.inner.write().await;
        let state = &mut *guard;

        let Some(conn) = state.registry.get_mut(id) else {
            return;
        };
        if conn.team.as_deref() != Some(team_name) {
            return;
        }

        conn.team = None;
        state.teams.remove_member(team_name, id);

        if let Some(payload) = encode(&WsOutboundEvent::TeamUnsubscribed {
            team: team_name.to_string(),
        }) {
            conn.send_raw(payload);
        }
        tracing::info!(connection = %id, team = %team_name, "unsubscribed from team");

        state.deliver_to_team_except(
            team_name,
            Some(id),
            &WsOutboundEvent::TeamMemberLeft {
                connection_id: id,
                team: team_name.to_string(),
                timestamp: Utc::now(),
            },
        );
    }

    /// `subscribe` plus a profile: stores `user_info` on the connection and
    /// additionally announces the member with their profile to the rest of
    /// the room, all in one critical section.
    pub async fn join_with_profile(
        &self,
        id: ConnectionId,
        team_name: &str,
        user_info: Option<Value>,
    ) {
        if team_name.is_empty() {
            return;
        }
        let mut guard = self.inner.write().await;
        if !subscribe_locked(&mut guard, id, team_name) {
            return;
        }

        let state = &mut *guard;
        if let Some(conn) = state.registry.get_mut(id) {
            conn.user_info = user_info.clone();
        }
        state.deliver_to_team_except(
            team_name,
            Some(id),
            &WsOutboundEvent::NewTeamMember {
                connection_id: id,
                user_info,
                team: team_name.to_string(),
                timestamp: Utc::now(),
            },
        );
    }
}

/// Subscription body shared by `subscribe` and `join_with_profile`; runs
/// entirely under the hub write guard. Returns false for unknown connections.
fn subscribe_locked(state: &mut HubState, id: ConnectionId, team_name: &str) -> bool {
    let Some(conn) = state.registry.get_mut(id) else {
        tracing::warn!(connection = %id, team = %team_name, "subscribe for unknown connection");
        return false;
    };

    // Single-team membership: any prior room entry moves over silently.
    let previous = conn.team.replace(team_name.to_string());
    if let Some(prev) = previous.filter(|p| p.as_str() != team_name) {
        state.teams.remove_member(&prev, id);
    }
    state.teams.ensure(team_name);
    state.teams.add_member(team_name, id);

    if let Some(payload) = encode(&WsOutboundEvent::TeamSubscribed {
        team: team_name.to_string(),
    }) {
        conn.send_raw(payload);
    }
    tracing::info!(connection = %id, team = %team_name, "subscribed to team");

    state.deliver_to_team_except(
        team_name,
        Some(id),
        &WsOutboundEvent::TeamMemberJoined {
            connection_id: id,
            team: team_name.to_string(),
            timestamp: Utc::now(),
        },
    );
    true
}
