//! End-to-end walks through the fan-out hub, driven the same way the
//! WebSocket session drives it: one mailbox channel per observer.

use serde_json::{json, Value};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use lead_stream_service::models::CreateLeadRequest;
use lead_stream_service::services::lead_store::LeadStore;
use lead_stream_service::websocket::message_types::WsOutboundEvent;
use lead_stream_service::websocket::{ConnectionId, SocketHub};

async fn connect(hub: &SocketHub) -> (ConnectionId, UnboundedReceiver<String>) {
    let (tx, rx) = unbounded_channel();
    let id = hub.connect(tx).await;
    (id, rx)
}

fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<Value> {
    let mut events = Vec::new();
    while let Ok(payload) = rx.try_recv() {
        events.push(serde_json::from_str(&payload).expect("valid event json"));
    }
    events
}

fn types(events: &[Value]) -> Vec<&str> {
    events
        .iter()
        .map(|e| e["type"].as_str().unwrap_or_default())
        .collect()
}

#[tokio::test]
async fn enterprise_and_general_team_scenario() {
    let hub = SocketHub::new();
    let (a, mut rx_a) = connect(&hub).await;
    let (b, mut rx_b) = connect(&hub).await;
    let (c, mut rx_c) = connect(&hub).await;

    hub.subscribe(a, "Enterprise Team").await;
    hub.subscribe(b, "Enterprise Team").await;
    hub.subscribe(c, "General Team").await;
    for rx in [&mut rx_a, &mut rx_b, &mut rx_c] {
        drain(rx);
    }

    // Global event reaches A, B and C.
    hub.broadcast_alert("end of quarter", None).await;
    for rx in [&mut rx_a, &mut rx_b, &mut rx_c] {
        assert_eq!(types(&drain(rx)), vec!["system-alert"]);
    }

    // Team-scoped event reaches the enterprise pair only.
    hub.broadcast_to_team(
        "Enterprise Team",
        WsOutboundEvent::TeamPerformance {
            team: "Enterprise Team".to_string(),
            metrics: json!({ "pipeline": 3 }),
            timestamp: chrono::Utc::now(),
        },
    )
    .await;
    assert_eq!(types(&drain(&mut rx_a)), vec!["team-performance"]);
    assert_eq!(types(&drain(&mut rx_b)), vec!["team-performance"]);
    assert!(drain(&mut rx_c).is_empty());

    // B drops: A is told, C is untouched, the room shrinks to A.
    hub.disconnect(b).await;
    let a_events = drain(&mut rx_a);
    assert_eq!(types(&a_events), vec!["team-member-disconnected"]);
    assert_eq!(a_events[0]["connectionId"], b.to_string());
    assert!(drain(&mut rx_c).is_empty());
    assert_eq!(hub.member_count("Enterprise Team").await, 1);
    assert_eq!(hub.connected_count().await, 2);
}

#[tokio::test]
async fn new_lead_fans_out_globally_and_to_the_assigned_team() {
    let hub = SocketHub::new();
    let store = LeadStore::new();

    let (africa, mut rx_africa) = connect(&hub).await;
    let (general, mut rx_general) = connect(&hub).await;
    let (_lurker, mut rx_lurker) = connect(&hub).await;
    hub.subscribe(africa, "Africa Sales").await;
    hub.subscribe(general, "General Team").await;
    for rx in [&mut rx_africa, &mut rx_general, &mut rx_lurker] {
        drain(rx);
    }

    let lead = store
        .create(
            CreateLeadRequest {
                name: "Kwame".to_string(),
                email: "kwame@example.com".to_string(),
                budget: 8000.0,
                location: "Lagos, Nigeria".to_string(),
            },
            "Africa Sales".to_string(),
        )
        .await;
    hub.broadcast_lead_created(&lead).await;

    // Everyone gets the global copy.
    let africa_events = drain(&mut rx_africa);
    assert_eq!(types(&africa_events), vec!["new-lead", "team-new-lead"]);
    assert_eq!(africa_events[0]["name"], "Kwame");
    assert_eq!(africa_events[1]["assignedTeam"], "Africa Sales");

    // Only the assigned team gets the scoped copy.
    assert_eq!(types(&drain(&mut rx_general)), vec!["new-lead"]);
    assert_eq!(types(&drain(&mut rx_lurker)), vec!["new-lead"]);
}

#[tokio::test]
async fn full_session_lifecycle() {
    let hub = SocketHub::new();

    // Connect: confirmation carries the teams known right now.
    let (a, mut rx_a) = connect(&hub).await;
    let a_events = drain(&mut rx_a);
    assert_eq!(types(&a_events), vec!["connection-confirmed"]);
    assert_eq!(a_events[0]["availableTeams"], json!([]));

    // Join with a profile, observed by an existing member.
    let (b, mut rx_b) = connect(&hub).await;
    hub.subscribe(b, "Enterprise Team").await;
    drain(&mut rx_b);
    hub.join_with_profile(a, "Enterprise Team", Some(json!({ "name": "Ada" })))
        .await;
    assert_eq!(
        types(&drain(&mut rx_b)),
        vec!["team-member-joined", "new-team-member"]
    );

    // A status update triggered by B fans out both tiers.
    hub.broadcast_status_update("lead-9", "qualified", b, None, Some("Enterprise Team"))
        .await;
    assert_eq!(
        types(&drain(&mut rx_a)),
        vec!["team-subscribed", "lead-status-updated", "team-lead-updated"]
    );

    // Administrative team disconnect dissolves the room but keeps sessions.
    hub.disconnect_team("Enterprise Team", "reorg").await;
    assert_eq!(types(&drain(&mut rx_a)), vec!["team-disconnected"]);
    assert_eq!(hub.connected_count().await, 2);
    assert!(hub.known_teams().await.is_empty());
    assert_eq!(hub.connection(a).await.unwrap().team, None);

    // A fresh subscribe recreates the team with a single member.
    hub.subscribe(a, "Enterprise Team").await;
    assert_eq!(hub.member_count("Enterprise Team").await, 1);
}
