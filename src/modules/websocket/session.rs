/// Relay Session Actor
///
/// Mỗi WebSocket connection có một session actor riêng. Session actor giữ
/// state đăng ký (user_id) và gửi events tới client thông qua mpsc channel
/// được bridge từ handler.rs.
///
/// Relay không chạm vào database: bản durable của tin nhắn đi qua HTTP API,
/// session chỉ forward events tới relay server actor.
use actix::prelude::*;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::events::{CloseSession, Connect, Disconnect, RegisterUser, RelayMessage, StopTyping, Typing};
use super::message::{ClientEvent, ServerEvent};
use super::server::RelayServer;

/// Relay session cho một client connection
pub struct RelaySession {
    /// Unique session ID
    pub id: Uuid,

    /// User ID sau khi client gửi registerUser (None nếu chưa đăng ký)
    pub user_id: Option<Uuid>,

    /// Address của relay server actor
    pub server: Addr<RelayServer>,

    /// Channel gửi JSON events tới client (bridge → handler.rs → WebSocket)
    pub tx: mpsc::UnboundedSender<String>,
}

impl RelaySession {
    /// Tạo session mới với outbound channel
    pub fn new(server: Addr<RelayServer>, tx: mpsc::UnboundedSender<String>) -> Self {
        Self { id: Uuid::now_v7(), user_id: None, server, tx }
    }

    /// Gửi ServerEvent tới client thông qua channel
    fn send_to_client(&self, event: &ServerEvent) {
        match serde_json::to_string(event) {
            Ok(json) => {
                if let Err(e) = self.tx.send(json) {
                    tracing::error!("Không thể gửi event tới client (session {}): {}", self.id, e);
                }
            }
            Err(e) => {
                tracing::error!("Không thể serialize ServerEvent (session {}): {}", self.id, e);
            }
        }
    }

    /// Xử lý event từ client - forward tới relay server actor
    fn handle_client_event(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::RegisterUser { user_id } => {
                // Đăng ký lại trên cùng connection: server map ghi đè
                // theo kiểu đăng ký sau thắng
                self.user_id = Some(user_id);
                self.server.do_send(RegisterUser { session_id: self.id, user_id });
                tracing::debug!("Session {} đăng ký user {}", self.id, user_id);
            }

            ClientEvent::Typing { sender_id, receiver_id } => {
                self.server.do_send(Typing { sender_id, receiver_id });
            }

            ClientEvent::StopTyping { sender_id, receiver_id } => {
                self.server.do_send(StopTyping { sender_id, receiver_id });
            }

            ClientEvent::SendMessage { sender_id, receiver_id, text } => {
                self.server.do_send(RelayMessage {
                    session_id: self.id,
                    sender_id,
                    receiver_id,
                    text,
                });
            }
        }
    }
}

impl Actor for RelaySession {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::debug!("Relay session started: {}", self.id);

        // Notify server về connection mới
        self.server.do_send(Connect { id: self.id, addr: ctx.address() });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::debug!("Relay session stopped: {} (user: {:?})", self.id, self.user_id);

        // Notify server về disconnect
        self.server.do_send(Disconnect { id: self.id });
    }
}

/// Implement Message trait cho ClientEvent để có thể send qua actors
impl Message for ClientEvent {
    type Result = ();
}

/// Handler: Nhận ClientEvent từ handler.rs
impl Handler<ClientEvent> for RelaySession {
    type Result = ();

    fn handle(&mut self, msg: ClientEvent, _ctx: &mut Context<Self>) {
        self.handle_client_event(msg);
    }
}

/// Handler: Nhận ServerEvent từ server actor → serialize → gửi tới client qua channel
impl Handler<ServerEvent> for RelaySession {
    type Result = ();

    fn handle(&mut self, msg: ServerEvent, _ctx: &mut Context<Self>) {
        self.send_to_client(&msg);
    }
}

/// Handler: bridge loop kết thúc → dừng actor (trigger Disconnect về server)
impl Handler<CloseSession> for RelaySession {
    type Result = ();

    fn handle(&mut self, _msg: CloseSession, ctx: &mut Context<Self>) {
        ctx.stop();
    }
}
