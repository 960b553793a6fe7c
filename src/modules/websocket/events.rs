/// Relay Actor Events
///
/// Module này định nghĩa các messages được trao đổi giữa session actors
/// và relay server actor.
use actix::prelude::*;
use uuid::Uuid;

use super::session::RelaySession;

/// Event: connection mới attach vào relay server
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    /// Unique session ID
    pub id: Uuid,
    /// Address của session actor để có thể gửi events
    pub addr: Addr<RelaySession>,
}

/// Event: session ngắt kết nối
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    /// Session ID cần gỡ
    pub id: Uuid,
}

/// Event: client khai báo user id cho session (đăng ký sau thắng)
#[derive(Message)]
#[rtype(result = "()")]
pub struct RegisterUser {
    /// Session đang đăng ký
    pub session_id: Uuid,
    /// User ID client khai báo
    pub user_id: Uuid,
}

/// Event: forward typing indicator tới receiver nếu online
#[derive(Message)]
#[rtype(result = "()")]
pub struct Typing {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
}

/// Event: forward stop-typing tới receiver nếu online
#[derive(Message)]
#[rtype(result = "()")]
pub struct StopTyping {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
}

/// Event: relay bản sao tin nhắn, luôn echo messageSent về session gửi
#[derive(Message)]
#[rtype(result = "()")]
pub struct RelayMessage {
    /// Session gửi (nơi nhận echo)
    pub session_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub text: String,
}

/// Event: bridge loop kết thúc, dừng session actor
#[derive(Message)]
#[rtype(result = "()")]
pub struct CloseSession;

/// Event: lấy danh sách user ids đang online, chỉ dùng cho tests
/// (production chỉ quan sát presence qua broadcast onlineUsers)
#[cfg(test)]
#[derive(Message)]
#[rtype(result = "Vec<Uuid>")]
pub struct GetOnlineUsers;
