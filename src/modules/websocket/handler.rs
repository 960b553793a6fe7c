/// WebSocket HTTP Handler
///
/// Module này xử lý HTTP upgrade request và quản lý bidirectional event flow:
/// - Inbound:  Client → WebSocket → parse ClientEvent → Session Actor
/// - Outbound: Server Actor → Session Actor → mpsc channel → WebSocket → Client
use actix::{Actor, Addr};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_ws::Message;
use tokio::sync::mpsc;

use super::events::CloseSession;
use super::message::ClientEvent;
use super::server::RelayServer;
use super::session::RelaySession;

/// HTTP handler để upgrade connection thành WebSocket relay channel
///
/// Endpoint: GET /ws
///
/// Flow:
/// 1. HTTP handshake → WebSocket connection
/// 2. Tạo mpsc channel (session actor → client)
/// 3. Start RelaySession actor
/// 4. Spawn async task xử lý bidirectional events
pub async fn relay_handler(
    req: HttpRequest,
    stream: web::Payload,
    server: web::Data<Addr<RelayServer>>,
) -> Result<HttpResponse, Error> {
    tracing::debug!("WebSocket upgrade request từ {:?}", req.peer_addr());

    // Thực hiện WebSocket handshake
    let (response, mut ws_session, mut msg_stream) = actix_ws::handle(&req, stream)?;

    // Tạo mpsc channel: session actor gửi JSON → spawned task → WebSocket → client
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let addr = RelaySession::new(server.get_ref().clone(), tx).start();

    // Spawn async task xử lý bidirectional event flow
    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                // === INBOUND: Client → Server ===
                msg = msg_stream.recv() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let text_str = text.to_string();

                            // Parse và forward tới session actor
                            match serde_json::from_str::<ClientEvent>(&text_str) {
                                Ok(event) => {
                                    addr.do_send(event);
                                }
                                Err(e) => {
                                    // Cắt preview theo ký tự, frame có thể chứa
                                    // ký tự nhiều byte ngay tại mốc cắt
                                    let preview: String = text_str.chars().take(100).collect();
                                    tracing::warn!(
                                        "Không thể parse client event: {} - raw: {}",
                                        e,
                                        preview
                                    );
                                }
                            }
                        }

                        Some(Ok(Message::Ping(data))) => {
                            // Tự động trả lời pong cho WebSocket-level ping
                            if let Err(e) = ws_session.pong(&data).await {
                                tracing::error!("Không thể gửi pong: {}", e);
                                break;
                            }
                        }

                        Some(Ok(Message::Pong(_))) => {
                            // Heartbeat response - bỏ qua
                        }

                        Some(Ok(Message::Close(reason))) => {
                            tracing::info!("WebSocket close frame: {:?}", reason);
                            break;
                        }

                        Some(Ok(Message::Binary(_))) => {
                            tracing::warn!("Binary messages không được hỗ trợ");
                        }

                        Some(Ok(Message::Continuation(_) | Message::Nop)) => {}

                        Some(Err(e)) => {
                            tracing::error!("WebSocket protocol error: {}", e);
                            break;
                        }

                        // Stream kết thúc (client disconnect)
                        None => break,
                    }
                }

                // === OUTBOUND: Server → Client ===
                Some(json) = rx.recv() => {
                    if ws_session.text(json).await.is_err() {
                        tracing::error!("Không thể gửi event tới WebSocket client");
                        break;
                    }
                }
            }
        }

        // Cleanup: đóng WebSocket và dừng session actor để server gỡ presence
        let _ = ws_session.close(None).await;
        addr.do_send(CloseSession);
        tracing::debug!("WebSocket relay loop kết thúc");
    });

    tracing::info!("WebSocket relay connection established");
    Ok(response)
}
