/// Relay Message Protocol
///
/// Module này định nghĩa các events trao đổi giữa client và relay server
/// qua WebSocket. Các field inbound chấp nhận `sender`/`receiver` như alias
/// của `senderId`/`receiverId` để tương thích client cũ; outbound chỉ có
/// một shape duy nhất.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events được gửi từ client đến relay server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Khai báo user id cho connection hiện tại
    #[serde(rename_all = "camelCase")]
    RegisterUser { user_id: Uuid },

    /// Sender đang gõ cho receiver
    #[serde(rename_all = "camelCase")]
    Typing {
        #[serde(alias = "sender")]
        sender_id: Uuid,
        #[serde(alias = "receiver")]
        receiver_id: Uuid,
    },

    /// Sender ngừng gõ
    #[serde(rename_all = "camelCase")]
    StopTyping {
        #[serde(alias = "sender")]
        sender_id: Uuid,
        #[serde(alias = "receiver")]
        receiver_id: Uuid,
    },

    /// Bản sao low-latency của tin nhắn; bản durable đi qua HTTP API
    #[serde(rename_all = "camelCase")]
    SendMessage {
        #[serde(alias = "sender")]
        sender_id: Uuid,
        #[serde(alias = "receiver")]
        receiver_id: Uuid,
        text: String,
    },
}

/// Events được gửi từ relay server về client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Danh sách user ids đang online, broadcast cho mọi connection
    #[serde(rename_all = "camelCase")]
    OnlineUsers { user_ids: Vec<Uuid> },

    /// Peer đang gõ
    #[serde(rename_all = "camelCase")]
    Typing { sender_id: Uuid },

    /// Peer ngừng gõ
    #[serde(rename_all = "camelCase")]
    StopTyping { sender_id: Uuid },

    /// Tin nhắn đến theo đường relay (advisory, không phải bản durable)
    #[serde(rename_all = "camelCase")]
    GetMessage { sender: Uuid, receiver: Uuid, text: String, timestamp: chrono::DateTime<chrono::Utc> },

    /// Echo xác nhận về phía sender
    #[serde(rename_all = "camelCase")]
    MessageSent { sender: Uuid, receiver: Uuid, text: String, timestamp: chrono::DateTime<chrono::Utc> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    // === ClientEvent deserialization ===

    #[test]
    fn test_client_register_user_deserialize() {
        let id = Uuid::now_v7();
        let json = format!(r#"{{"type":"registerUser","userId":"{}"}}"#, id);
        let event: ClientEvent = serde_json::from_str(&json).unwrap();
        assert!(matches!(event, ClientEvent::RegisterUser { user_id } if user_id == id));
    }

    #[test]
    fn test_client_typing_deserialize() {
        let sender = Uuid::now_v7();
        let receiver = Uuid::now_v7();
        let json =
            format!(r#"{{"type":"typing","senderId":"{}","receiverId":"{}"}}"#, sender, receiver);
        let event: ClientEvent = serde_json::from_str(&json).unwrap();
        match event {
            ClientEvent::Typing { sender_id, receiver_id } => {
                assert_eq!(sender_id, sender);
                assert_eq!(receiver_id, receiver);
            }
            _ => panic!("Expected Typing variant"),
        }
    }

    #[test]
    fn test_client_typing_accepts_legacy_field_names() {
        let sender = Uuid::now_v7();
        let receiver = Uuid::now_v7();
        // Client cũ gửi sender/receiver thay vì senderId/receiverId
        let json = format!(r#"{{"type":"typing","sender":"{}","receiver":"{}"}}"#, sender, receiver);
        let event: ClientEvent = serde_json::from_str(&json).unwrap();
        match event {
            ClientEvent::Typing { sender_id, receiver_id } => {
                assert_eq!(sender_id, sender);
                assert_eq!(receiver_id, receiver);
            }
            _ => panic!("Expected Typing variant"),
        }
    }

    #[test]
    fn test_client_stop_typing_deserialize() {
        let sender = Uuid::now_v7();
        let receiver = Uuid::now_v7();
        let json = format!(
            r#"{{"type":"stopTyping","senderId":"{}","receiverId":"{}"}}"#,
            sender, receiver
        );
        let event: ClientEvent = serde_json::from_str(&json).unwrap();
        assert!(matches!(event, ClientEvent::StopTyping { sender_id, .. } if sender_id == sender));
    }

    #[test]
    fn test_client_send_message_deserialize() {
        let sender = Uuid::now_v7();
        let receiver = Uuid::now_v7();
        let json = format!(
            r#"{{"type":"sendMessage","senderId":"{}","receiverId":"{}","text":"Xin chào!"}}"#,
            sender, receiver
        );
        let event: ClientEvent = serde_json::from_str(&json).unwrap();
        match event {
            ClientEvent::SendMessage { sender_id, receiver_id, text } => {
                assert_eq!(sender_id, sender);
                assert_eq!(receiver_id, receiver);
                assert_eq!(text, "Xin chào!");
            }
            _ => panic!("Expected SendMessage variant"),
        }
    }

    #[test]
    fn test_client_send_message_accepts_mixed_field_names() {
        let sender = Uuid::now_v7();
        let receiver = Uuid::now_v7();
        let json = format!(
            r#"{{"type":"sendMessage","sender":"{}","receiverId":"{}","text":"hi"}}"#,
            sender, receiver
        );
        let event: ClientEvent = serde_json::from_str(&json).unwrap();
        match event {
            ClientEvent::SendMessage { sender_id, receiver_id, .. } => {
                assert_eq!(sender_id, sender);
                assert_eq!(receiver_id, receiver);
            }
            _ => panic!("Expected SendMessage variant"),
        }
    }

    #[test]
    fn test_invalid_type_returns_error() {
        let json = r#"{"type":"unknownType"}"#;
        let result = serde_json::from_str::<ClientEvent>(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_required_field_returns_error() {
        // sendMessage thiếu text
        let json = r#"{"type":"sendMessage","senderId":"550e8400-e29b-41d4-a716-446655440000","receiverId":"550e8400-e29b-41d4-a716-446655440001"}"#;
        let result = serde_json::from_str::<ClientEvent>(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_text_allowed_at_protocol_level() {
        let sender = Uuid::now_v7();
        let receiver = Uuid::now_v7();
        let json = format!(
            r#"{{"type":"sendMessage","senderId":"{}","receiverId":"{}","text":""}}"#,
            sender, receiver
        );
        let event: ClientEvent = serde_json::from_str(&json).unwrap();
        assert!(matches!(event, ClientEvent::SendMessage { text, .. } if text.is_empty()));
    }

    // === ServerEvent serialization ===

    #[test]
    fn test_server_online_users_serialize() {
        let u1 = Uuid::now_v7();
        let u2 = Uuid::now_v7();
        let event = ServerEvent::OnlineUsers { user_ids: vec![u1, u2] };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"onlineUsers\""));
        assert!(json.contains(&u1.to_string()));
        assert!(json.contains(&u2.to_string()));
    }

    #[test]
    fn test_server_typing_serialize() {
        let sender = Uuid::now_v7();
        let event = ServerEvent::Typing { sender_id: sender };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"typing\""));
        assert!(json.contains("\"senderId\""));
        assert!(json.contains(&sender.to_string()));
    }

    #[test]
    fn test_server_get_message_serialize() {
        let sender = Uuid::now_v7();
        let receiver = Uuid::now_v7();
        let event = ServerEvent::GetMessage {
            sender,
            receiver,
            text: "Chào bạn".to_string(),
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"getMessage\""));
        assert!(json.contains("\"timestamp\""));
        assert!(json.contains("Chào bạn"));
    }

    #[test]
    fn test_server_message_sent_serialize() {
        let sender = Uuid::now_v7();
        let receiver = Uuid::now_v7();
        let event = ServerEvent::MessageSent {
            sender,
            receiver,
            text: "ok".to_string(),
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"messageSent\""));
    }

    // === Roundtrip tests ===

    #[test]
    fn test_client_event_roundtrip() {
        let original = ClientEvent::SendMessage {
            sender_id: Uuid::now_v7(),
            receiver_id: Uuid::now_v7(),
            text: "Test message 🇻🇳".to_string(),
        };
        let json = serde_json::to_string(&original).unwrap();
        let deserialized: ClientEvent = serde_json::from_str(&json).unwrap();

        match (original, deserialized) {
            (
                ClientEvent::SendMessage { sender_id: s1, receiver_id: r1, text: t1 },
                ClientEvent::SendMessage { sender_id: s2, receiver_id: r2, text: t2 },
            ) => {
                assert_eq!(s1, s2);
                assert_eq!(r1, r2);
                assert_eq!(t1, t2);
            }
            _ => panic!("Roundtrip failed"),
        }
    }

    #[test]
    fn test_server_event_roundtrip_keeps_timestamp() {
        let ts = chrono::Utc::now();
        let original = ServerEvent::GetMessage {
            sender: Uuid::now_v7(),
            receiver: Uuid::now_v7(),
            text: "hi".to_string(),
            timestamp: ts,
        };
        let json = serde_json::to_string(&original).unwrap();
        let deserialized: ServerEvent = serde_json::from_str(&json).unwrap();

        match deserialized {
            ServerEvent::GetMessage { timestamp, .. } => assert_eq!(timestamp, ts),
            _ => panic!("Roundtrip failed"),
        }
    }
}
