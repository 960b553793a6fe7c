/// Relay Server Actor
///
/// Server actor giữ presence map (user id -> session) và route các relay
/// events tới đúng receiver. Relay là best-effort, at-most-once: receiver
/// offline thì event bị drop, không queue, không retry. Bản durable của
/// tin nhắn đi qua Message Service, không đi qua đây.
use actix::prelude::*;
use std::collections::HashMap;
use uuid::Uuid;

use super::events::*;
use super::message::ServerEvent;
use super::session::RelaySession;

/// Relay server quản lý tất cả sessions và presence map
pub struct RelayServer {
    /// Map: session_id -> session actor address
    /// Lưu tất cả active WebSocket connections
    sessions: HashMap<Uuid, Addr<RelaySession>>,

    /// Map: user_id -> session_id
    /// Một route duy nhất cho mỗi user, đăng ký sau ghi đè đăng ký trước
    users: HashMap<Uuid, Uuid>,
}

impl RelayServer {
    /// Tạo relay server mới với state rỗng
    pub fn new() -> Self {
        Self { sessions: HashMap::new(), users: HashMap::new() }
    }

    /// Lấy danh sách user IDs đang online
    fn online_user_ids(&self) -> Vec<Uuid> {
        self.users.keys().copied().collect()
    }

    /// Gửi event tới một session cụ thể
    fn send_to_session(&self, session_id: &Uuid, event: ServerEvent) {
        if let Some(session_addr) = self.sessions.get(session_id) {
            session_addr.do_send(event);
        }
    }

    /// Gửi event tới user nếu đang online, drop nếu không
    fn send_to_user(&self, user_id: &Uuid, event: ServerEvent) {
        if let Some(session_id) = self.users.get(user_id) {
            self.send_to_session(session_id, event);
        }
    }

    /// Broadcast danh sách online tới tất cả connections (kể cả chưa đăng ký)
    fn broadcast_online_users(&self) {
        let event = ServerEvent::OnlineUsers { user_ids: self.online_user_ids() };

        for session_addr in self.sessions.values() {
            session_addr.do_send(event.clone());
        }
    }
}

impl Actor for RelayServer {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("Relay server started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("Relay server stopped");
    }
}

/// Handler: connection mới attach
impl Handler<Connect> for RelayServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) {
        tracing::debug!("Relay session connected: {}", msg.id);

        self.sessions.insert(msg.id, msg.addr);
    }
}

/// Handler: session ngắt kết nối
impl Handler<Disconnect> for RelayServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        tracing::debug!("Relay session disconnected: {}", msg.id);

        self.sessions.remove(&msg.id);

        // Chỉ gỡ binding còn trỏ về session này; binding có thể đã bị
        // một registration mới hơn ghi đè
        self.users.retain(|_, session_id| *session_id != msg.id);

        self.broadcast_online_users();
    }
}

/// Handler: client khai báo user id, đăng ký sau thắng
impl Handler<RegisterUser> for RelayServer {
    type Result = ();

    fn handle(&mut self, msg: RegisterUser, _: &mut Context<Self>) {
        if let Some(old_session) = self.users.insert(msg.user_id, msg.session_id) {
            if old_session != msg.session_id {
                tracing::info!(
                    "User {} re-registered: route dời từ session {} sang {}",
                    msg.user_id,
                    old_session,
                    msg.session_id
                );
            }
        }

        tracing::info!(
            "User {} online trên session {} ({} user(s) online)",
            msg.user_id,
            msg.session_id,
            self.users.len()
        );

        self.broadcast_online_users();
    }
}

/// Handler: typing indicator — forward tới receiver, không echo về sender
impl Handler<Typing> for RelayServer {
    type Result = ();

    fn handle(&mut self, msg: Typing, _: &mut Context<Self>) {
        self.send_to_user(&msg.receiver_id, ServerEvent::Typing { sender_id: msg.sender_id });
    }
}

/// Handler: stop-typing — forward tới receiver, không echo về sender
impl Handler<StopTyping> for RelayServer {
    type Result = ();

    fn handle(&mut self, msg: StopTyping, _: &mut Context<Self>) {
        self.send_to_user(&msg.receiver_id, ServerEvent::StopTyping { sender_id: msg.sender_id });
    }
}

/// Handler: relay bản sao tin nhắn + echo xác nhận
impl Handler<RelayMessage> for RelayServer {
    type Result = ();

    fn handle(&mut self, msg: RelayMessage, _: &mut Context<Self>) {
        let timestamp = chrono::Utc::now();

        match self.users.get(&msg.receiver_id) {
            Some(session_id) => {
                self.send_to_session(
                    session_id,
                    ServerEvent::GetMessage {
                        sender: msg.sender_id,
                        receiver: msg.receiver_id,
                        text: msg.text.clone(),
                        timestamp,
                    },
                );
            }
            None => {
                tracing::debug!("Receiver {} không online, relay copy bị drop", msg.receiver_id);
            }
        }

        // Echo luôn gửi về session gửi, kể cả khi receiver offline
        self.send_to_session(
            &msg.session_id,
            ServerEvent::MessageSent {
                sender: msg.sender_id,
                receiver: msg.receiver_id,
                text: msg.text,
                timestamp,
            },
        );
    }
}

/// Handler: lấy online users (test-only)
#[cfg(test)]
impl Handler<GetOnlineUsers> for RelayServer {
    type Result = Vec<Uuid>;

    fn handle(&mut self, _: GetOnlineUsers, _: &mut Context<Self>) -> Self::Result {
        self.online_user_ids()
    }
}

/// Implement Message trait cho ServerEvent để có thể send tới sessions
impl Message for ServerEvent {
    type Result = ();
}

impl Default for RelayServer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::websocket::message::ClientEvent;
    use std::time::Duration;
    use tokio::sync::mpsc;

    /// Tạo session gắn với server, trả về addr và đầu nhận của client channel
    fn spawn_session(
        server: &Addr<RelayServer>,
    ) -> (Addr<RelaySession>, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let addr = RelaySession::new(server.clone(), tx).start();
        (addr, rx)
    }

    /// Chờ các actor mailbox xử lý xong
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(json) = rx.try_recv() {
            events.push(serde_json::from_str(&json).unwrap());
        }
        events
    }

    #[actix_web::test]
    async fn test_register_broadcasts_online_users_to_all_sessions() {
        let server = RelayServer::new().start();
        let (session_a, mut rx_a) = spawn_session(&server);
        let (_session_b, mut rx_b) = spawn_session(&server);
        let alice = Uuid::now_v7();
        settle().await;

        session_a.do_send(ClientEvent::RegisterUser { user_id: alice });
        settle().await;

        // Cả hai connections (kể cả chưa đăng ký) đều nhận broadcast
        for rx in [&mut rx_a, &mut rx_b] {
            let events = drain(rx);
            assert_eq!(events.len(), 1);
            assert!(
                matches!(&events[0], ServerEvent::OnlineUsers { user_ids } if user_ids == &vec![alice])
            );
        }
    }

    #[actix_web::test]
    async fn test_register_both_users_shows_both_online() {
        let server = RelayServer::new().start();
        let (session_a, _rx_a) = spawn_session(&server);
        let (session_b, _rx_b) = spawn_session(&server);
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();
        settle().await;

        session_a.do_send(ClientEvent::RegisterUser { user_id: alice });
        session_b.do_send(ClientEvent::RegisterUser { user_id: bob });
        settle().await;

        let mut online = server.send(GetOnlineUsers).await.unwrap();
        online.sort();
        let mut expected = vec![alice, bob];
        expected.sort();
        assert_eq!(online, expected);
    }

    #[actix_web::test]
    async fn test_typing_routed_to_receiver_only() {
        let server = RelayServer::new().start();
        let (session_a, mut rx_a) = spawn_session(&server);
        let (session_b, mut rx_b) = spawn_session(&server);
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();
        settle().await;

        session_a.do_send(ClientEvent::RegisterUser { user_id: alice });
        session_b.do_send(ClientEvent::RegisterUser { user_id: bob });
        settle().await;
        drain(&mut rx_a);
        drain(&mut rx_b);

        session_a.do_send(ClientEvent::Typing { sender_id: alice, receiver_id: bob });
        settle().await;

        let events = drain(&mut rx_b);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], ServerEvent::Typing { sender_id } if *sender_id == alice));

        // Sender không nhận echo typing của chính mình
        assert!(drain(&mut rx_a).is_empty());
    }

    #[actix_web::test]
    async fn test_typing_to_offline_receiver_is_dropped() {
        let server = RelayServer::new().start();
        let (session_a, mut rx_a) = spawn_session(&server);
        let alice = Uuid::now_v7();
        settle().await;

        session_a.do_send(ClientEvent::RegisterUser { user_id: alice });
        settle().await;
        drain(&mut rx_a);

        session_a.do_send(ClientEvent::Typing { sender_id: alice, receiver_id: Uuid::now_v7() });
        settle().await;

        assert!(drain(&mut rx_a).is_empty());
    }

    #[actix_web::test]
    async fn test_relay_delivers_copy_and_echoes_confirmation() {
        let server = RelayServer::new().start();
        let (session_a, mut rx_a) = spawn_session(&server);
        let (session_b, mut rx_b) = spawn_session(&server);
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();
        settle().await;

        session_a.do_send(ClientEvent::RegisterUser { user_id: alice });
        session_b.do_send(ClientEvent::RegisterUser { user_id: bob });
        settle().await;
        drain(&mut rx_a);
        drain(&mut rx_b);

        session_a.do_send(ClientEvent::SendMessage {
            sender_id: alice,
            receiver_id: bob,
            text: "chào Bob".to_string(),
        });
        settle().await;

        let received = drain(&mut rx_b);
        assert_eq!(received.len(), 1);
        let delivered_at = match &received[0] {
            ServerEvent::GetMessage { sender, receiver, text, timestamp } => {
                assert_eq!(*sender, alice);
                assert_eq!(*receiver, bob);
                assert_eq!(text, "chào Bob");
                *timestamp
            }
            other => panic!("Expected GetMessage, got {:?}", other),
        };

        let echoed = drain(&mut rx_a);
        assert_eq!(echoed.len(), 1);
        match &echoed[0] {
            ServerEvent::MessageSent { sender, receiver, timestamp, .. } => {
                assert_eq!(*sender, alice);
                assert_eq!(*receiver, bob);
                // Hai bản dùng chung một server timestamp
                assert_eq!(*timestamp, delivered_at);
            }
            other => panic!("Expected MessageSent, got {:?}", other),
        }
    }

    #[actix_web::test]
    async fn test_relay_to_offline_receiver_still_echoes() {
        let server = RelayServer::new().start();
        let (session_a, mut rx_a) = spawn_session(&server);
        let alice = Uuid::now_v7();
        settle().await;

        session_a.do_send(ClientEvent::RegisterUser { user_id: alice });
        settle().await;
        drain(&mut rx_a);

        session_a.do_send(ClientEvent::SendMessage {
            sender_id: alice,
            receiver_id: Uuid::now_v7(),
            text: "ai đó?".to_string(),
        });
        settle().await;

        let events = drain(&mut rx_a);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], ServerEvent::MessageSent { .. }));
    }

    #[actix_web::test]
    async fn test_disconnect_prunes_presence_and_rebroadcasts() {
        let server = RelayServer::new().start();
        let (session_a, mut rx_a) = spawn_session(&server);
        let (session_b, mut rx_b) = spawn_session(&server);
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();
        settle().await;

        session_a.do_send(ClientEvent::RegisterUser { user_id: alice });
        session_b.do_send(ClientEvent::RegisterUser { user_id: bob });
        settle().await;
        drain(&mut rx_a);
        drain(&mut rx_b);

        session_a.do_send(CloseSession);
        settle().await;

        let events = drain(&mut rx_b);
        assert_eq!(events.len(), 1);
        assert!(
            matches!(&events[0], ServerEvent::OnlineUsers { user_ids } if user_ids == &vec![bob])
        );

        let online = server.send(GetOnlineUsers).await.unwrap();
        assert_eq!(online, vec![bob]);
    }

    #[actix_web::test]
    async fn test_stale_session_disconnect_keeps_new_binding() {
        let server = RelayServer::new().start();
        let (session_a, mut rx_a) = spawn_session(&server);
        let (session_b, mut rx_b) = spawn_session(&server);
        let (session_c, mut rx_c) = spawn_session(&server);
        let alice = Uuid::now_v7();
        let carol = Uuid::now_v7();
        settle().await;

        // Alice đăng ký trên session A rồi chuyển sang session B
        session_a.do_send(ClientEvent::RegisterUser { user_id: alice });
        session_b.do_send(ClientEvent::RegisterUser { user_id: alice });
        session_c.do_send(ClientEvent::RegisterUser { user_id: carol });
        settle().await;
        drain(&mut rx_a);
        drain(&mut rx_b);
        drain(&mut rx_c);

        // Session cũ đóng, binding mới không bị ảnh hưởng
        session_a.do_send(CloseSession);
        settle().await;

        let online = server.send(GetOnlineUsers).await.unwrap();
        assert!(online.contains(&alice));

        drain(&mut rx_b);
        drain(&mut rx_c);

        session_c.do_send(ClientEvent::SendMessage {
            sender_id: carol,
            receiver_id: alice,
            text: "vẫn thấy bạn chứ?".to_string(),
        });
        settle().await;

        let events = drain(&mut rx_b);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], ServerEvent::GetMessage { .. }));
    }
}
