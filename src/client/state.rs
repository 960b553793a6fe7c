/// Chat Client State
///
/// Giữ state hiển thị của chat UI và reconcile hai nguồn dữ liệu:
/// - HTTP API: inbox list, lịch sử tin nhắn, response của POST /send
/// - Relay channel: onlineUsers, typing/stopTyping, getMessage
///
/// Nguyên tắc: server là source of truth. Entry đến từ relay chỉ là
/// advisory và bị thay thế toàn bộ ở lần reload lịch sử kế tiếp.
use std::collections::HashSet;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::modules::conversation::model::ConversationDetail;
use crate::modules::message::model::MessageDetail;
use crate::modules::websocket::message::{ClientEvent, ServerEvent};

/// Ngừng gõ sau khoảng này thì phát stopTyping
pub const TYPING_IDLE: Duration = Duration::from_millis(1000);

/// Một entry trong thread đang mở
#[derive(Debug, Clone)]
pub enum ThreadEntry {
    /// Bản durable từ HTTP API, có id
    Persisted(MessageDetail),
    /// Bản sao advisory từ relay, chưa có id durable
    Relayed { sender: Uuid, text: String, timestamp: chrono::DateTime<chrono::Utc> },
}

/// State machine của chat UI cho một user
pub struct ChatClient {
    user_id: Uuid,
    conversations: Vec<ConversationDetail>,
    /// Conversation đang mở (None khi đang ở inbox)
    active: Option<Uuid>,
    thread: Vec<ThreadEntry>,
    online: HashSet<Uuid>,
    /// User ids đang gõ cho mình
    typing_peers: HashSet<Uuid>,
    /// Mình có đang gõ không (để phát typing/stopTyping đúng một lần)
    typing: bool,
    last_keystroke: Option<Instant>,
}

impl ChatClient {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            conversations: Vec::new(),
            active: None,
            thread: Vec::new(),
            online: HashSet::new(),
            typing_peers: HashSet::new(),
            typing: false,
            last_keystroke: None,
        }
    }

    /// Event đầu tiên sau khi connect: khai báo user id với relay server
    pub fn register_event(&self) -> ClientEvent {
        ClientEvent::RegisterUser { user_id: self.user_id }
    }

    /// Nạp inbox list từ GET /conversations; thay thế toàn bộ,
    /// badge theo số server trả về
    pub fn load_conversations(&mut self, conversations: Vec<ConversationDetail>) {
        self.conversations = conversations;
    }

    /// Mở một conversation: thay thế thread bằng lịch sử durable và
    /// xóa badge của nó
    pub fn open_conversation(&mut self, conversation_id: Uuid, history: Vec<MessageDetail>) {
        self.active = Some(conversation_id);
        self.thread = history.into_iter().map(ThreadEntry::Persisted).collect();

        if let Some(conversation) =
            self.conversations.iter_mut().find(|c| c.id == conversation_id)
        {
            conversation.unread_count = 0;
        }

        // Trạng thái gõ của mình không mang sang conversation khác
        self.typing = false;
        self.last_keystroke = None;
    }

    /// Append bản durable từ response của POST /send, dedup theo id
    pub fn append_confirmed(&mut self, message: MessageDetail) {
        if self.active != Some(message.conversation_id) {
            return;
        }

        let already_present = self.thread.iter().any(|entry| {
            matches!(entry, ThreadEntry::Persisted(existing) if existing.id == message.id)
        });
        if already_present {
            return;
        }

        self.thread.push(ThreadEntry::Persisted(message));
    }

    /// Bản sao low-latency gửi kèm POST /send, cho conversation đang mở
    pub fn relay_send_event(&self, text: &str) -> Option<ClientEvent> {
        let receiver_id = self.active_peer()?;
        Some(ClientEvent::SendMessage {
            sender_id: self.user_id,
            receiver_id,
            text: text.to_string(),
        })
    }

    /// Áp một event từ relay channel vào state
    pub fn apply_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::OnlineUsers { user_ids } => {
                // Thay thế toàn bộ, không merge
                self.online = user_ids.into_iter().collect();
            }

            ServerEvent::Typing { sender_id } => {
                self.typing_peers.insert(sender_id);
            }

            ServerEvent::StopTyping { sender_id } => {
                self.typing_peers.remove(&sender_id);
            }

            ServerEvent::GetMessage { sender, text, timestamp, .. } => {
                if self.active_peer() == Some(sender) {
                    self.thread.push(ThreadEntry::Relayed { sender, text, timestamp });
                    return;
                }

                // Không mở conversation đó: bump badge nếu đã biết
                // conversation, chưa biết thì drop và chờ reload inbox
                if let Some(conversation) = self
                    .conversations
                    .iter_mut()
                    .find(|c| c.other_participant.id == sender)
                {
                    conversation.unread_count += 1;
                }
            }

            // Client đã có bản durable từ response của POST /send
            ServerEvent::MessageSent { .. } => {}
        }
    }

    /// Gõ phím trong composer. Trả về event typing ở lần gõ đầu tiên
    /// sau khi idle.
    pub fn note_keystroke(&mut self, now: Instant) -> Option<ClientEvent> {
        let receiver_id = self.active_peer()?;
        self.last_keystroke = Some(now);

        if self.typing {
            return None;
        }

        self.typing = true;
        Some(ClientEvent::Typing { sender_id: self.user_id, receiver_id })
    }

    /// Tick định kỳ: phát stopTyping khi đã ngừng gõ đủ lâu
    pub fn poll_typing(&mut self, now: Instant) -> Option<ClientEvent> {
        let receiver_id = self.active_peer()?;

        if !self.typing {
            return None;
        }

        let last = self.last_keystroke?;
        if now.duration_since(last) < TYPING_IDLE {
            return None;
        }

        self.typing = false;
        self.last_keystroke = None;
        Some(ClientEvent::StopTyping { sender_id: self.user_id, receiver_id })
    }

    /// Gửi tin xong thì dừng typing ngay, không chờ idle
    pub fn note_sent(&mut self) -> Option<ClientEvent> {
        let receiver_id = self.active_peer()?;

        if !self.typing {
            return None;
        }

        self.typing = false;
        self.last_keystroke = None;
        Some(ClientEvent::StopTyping { sender_id: self.user_id, receiver_id })
    }

    /// Participant còn lại của conversation đang mở
    pub fn active_peer(&self) -> Option<Uuid> {
        let active = self.active?;
        self.conversations
            .iter()
            .find(|c| c.id == active)
            .map(|c| c.other_participant.id)
    }

    pub fn is_online(&self, user_id: &Uuid) -> bool {
        self.online.contains(user_id)
    }

    /// Peer của conversation đang mở có đang gõ không
    pub fn peer_typing(&self) -> bool {
        self.active_peer().map(|peer| self.typing_peers.contains(&peer)).unwrap_or(false)
    }

    pub fn conversations(&self) -> &[ConversationDetail] {
        &self.conversations
    }

    pub fn thread(&self) -> &[ThreadEntry] {
        &self.thread
    }
}
