use actix_web::{web, HttpRequest, HttpResponse};
use actix_ws::{Message, MessageStream, Session};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use crate::{
    realtime::{Broadcaster, ClientId, OutboundEvent},
    state::AppState,
};

/// GET /ws - upgrades to a WebSocket and registers the client for broadcasts
pub async fn connect(
    req: HttpRequest,
    body: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, actix_web::Error> {
    let (response, session, messages) = actix_ws::handle(&req, body)?;

    let broadcaster = state.broadcaster.clone();
    let (client_id, events) = broadcaster.connect();

    actix_web::rt::spawn(relay(session, messages, events, broadcaster, client_id));

    Ok(response)
}

/// Pumps broadcast frames out and watches the socket for close/errors.
/// Inbound text and binary frames are ignored.
async fn relay(
    mut session: Session,
    mut messages: MessageStream,
    mut events: Receiver<Arc<OutboundEvent>>,
    broadcaster: Broadcaster,
    client_id: ClientId,
) {
    let mut close_reason = None;

    loop {
        tokio::select! {
            message = messages.next() => match message {
                Some(Ok(Message::Ping(bytes))) => {
                    if session.pong(&bytes).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(reason))) => {
                    close_reason = reason;
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    log::warn!("⚠️ Client {} protocol error: {}", client_id, e);
                    break;
                }
                None => break,
            },
            event = events.recv() => match event {
                Some(event) => match serde_json::to_string(event.as_ref()) {
                    Ok(text) => {
                        if session.text(text).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => log::error!("❌ Could not encode {} frame: {}", event.event, e),
                },
                None => break,
            },
        }
    }

    broadcaster.disconnect(client_id);
    let _ = session.close(close_reason).await;
}
