use std::time::{Duration, Instant};

use actix::{Actor, ActorContext, AsyncContext, StreamHandler};
use actix_web::{get, web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::state::AppState;
use crate::websocket::message_types::WsInboundEvent;
use crate::websocket::{ConnectionId, SocketHub};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// One observer WebSocket session.
///
/// The session is registered with the hub before the actor starts; its
/// mailbox receiver is bridged into the actor context so queued events (the
/// connection confirmation included) drain in order.
struct WsSession {
    id: ConnectionId,
    hub: SocketHub,
    hb: Instant,
    mailbox: Option<UnboundedReceiver<String>>,
}

impl WsSession {
    fn new(id: ConnectionId, hub: SocketHub, mailbox: UnboundedReceiver<String>) -> Self {
        Self {
            id,
            hub,
            hb: Instant::now(),
            mailbox: Some(mailbox),
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                tracing::warn!(connection = %act.id, "WebSocket heartbeat failed, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.hb(ctx);
        if let Some(mailbox) = self.mailbox.take() {
            ctx.add_stream(UnboundedReceiverStream::new(mailbox));
        }
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        let hub = self.hub.clone();
        let id = self.id;
        actix::spawn(async move {
            hub.disconnect(id).await;
        });
    }
}

/// Outbound events arriving from the hub mailbox.
impl StreamHandler<String> for WsSession {
    fn handle(&mut self, msg: String, ctx: &mut Self::Context) {
        ctx.text(msg);
    }

    fn finished(&mut self, ctx: &mut Self::Context) {
        // Mailbox closed: the hub no longer knows this connection.
        ctx.stop();
    }
}

/// Inbound WebSocket protocol frames.
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => match serde_json::from_str::<WsInboundEvent>(&text) {
                Ok(evt) => {
                    let hub = self.hub.clone();
                    let id = self.id;
                    actix::spawn(async move {
                        handle_inbound(hub, id, evt).await;
                    });
                }
                Err(e) => {
                    tracing::warn!(connection = %self.id, error = %e, "unparseable WebSocket message");
                }
            },
            Ok(ws::Message::Binary(_)) => {
                tracing::warn!(connection = %self.id, "binary WebSocket messages not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::info!(connection = %self.id, ?reason, "WebSocket close received");
                ctx.stop();
            }
            Err(e) => {
                tracing::warn!(connection = %self.id, error = %e, "WebSocket protocol error");
                ctx.stop();
            }
            _ => {}
        }
    }
}

async fn handle_inbound(hub: SocketHub, id: ConnectionId, evt: WsInboundEvent) {
    match evt {
        WsInboundEvent::SubscribeToTeam { team_name } => hub.subscribe(id, &team_name).await,
        WsInboundEvent::UnsubscribeFromTeam { team_name } => hub.unsubscribe(id, &team_name).await,
        WsInboundEvent::JoinTeam {
            team_name,
            user_info,
        } => hub.join_with_profile(id, &team_name, user_info).await,
        WsInboundEvent::UpdateLeadStatus {
            lead_id,
            status,
            team_name,
            assigned_to,
        } => {
            hub.broadcast_status_update(&lead_id, &status, id, assigned_to, team_name.as_deref())
                .await
        }
        WsInboundEvent::ClaimLead {
            lead_id,
            claimed_by,
            team_name,
        } => {
            hub.broadcast_claim(&lead_id, &claimed_by, team_name.as_deref())
                .await
        }
    }
}

#[get("/ws")]
pub async fn ws_handler(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    // Handshake first: a rejected upgrade must never touch the registry.
    let mut response = ws::handshake(&req)?;
    let (tx, rx) = unbounded_channel();
    let id = state.hub.connect(tx).await;
    let session = WsSession::new(id, state.hub.clone(), rx);
    Ok(response.streaming(ws::WebsocketContext::create(session, stream)))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use actix_web::{test, web, App};

    use crate::config::{ClassifierConfig, Config};
    use crate::state::AppState;

    fn offline_state() -> AppState {
        AppState::new(Config {
            port: 0,
            classifier: ClassifierConfig {
                api_url: None,
                api_key: None,
                timeout: Duration::from_millis(10),
            },
        })
    }

    #[actix_web::test]
    async fn rejected_upgrade_leaves_no_registry_entry() {
        let state = offline_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .service(super::ws_handler),
        )
        .await;

        // Plain GET without upgrade headers fails the handshake.
        let req = test::TestRequest::get().uri("/ws").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_client_error());
        assert_eq!(state.hub.connected_count().await, 0);
        assert!(state.hub.connections_info().await.clients.is_empty());
    }
}
