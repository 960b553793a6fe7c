use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::modules::message::schema::MessageType;
use crate::modules::user::model::PublicProfile;
use crate::modules::user::schema::UserRole;

/// Request body cho POST /send. Sender lấy từ token, không nhận từ body.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub receiver_id: Uuid,
    #[validate(length(min = 1, message = "Message text cannot be empty"))]
    pub text: String,
    /// Khi có, message phải thuộc đúng conversation này;
    /// khi vắng, server tự resolve theo cặp sender/receiver
    pub conversation_id: Option<Uuid>,
    pub message_type: Option<MessageType>,
}

#[derive(Debug, Clone)]
pub struct InsertMessage {
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub _type: MessageType,
}

/// Message đã resolve profile hai phía để hiển thị.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDetail {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender: PublicProfile,
    pub receiver: PublicProfile,
    pub content: String,
    #[serde(rename = "type")]
    pub _type: MessageType,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Flat row từ query join users hai lần (sender và receiver).
#[derive(FromRow)]
pub struct MessageDetailRaw {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub content: String,
    #[sqlx(rename = "type")]
    pub _type: MessageType,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,

    pub sender_id: Uuid,
    pub sender_first_name: String,
    pub sender_last_name: String,
    pub sender_role: UserRole,
    pub sender_avatar_url: Option<String>,

    pub receiver_id: Uuid,
    pub receiver_first_name: String,
    pub receiver_last_name: String,
    pub receiver_role: UserRole,
    pub receiver_avatar_url: Option<String>,
}

impl From<MessageDetailRaw> for MessageDetail {
    fn from(raw: MessageDetailRaw) -> Self {
        MessageDetail {
            id: raw.id,
            conversation_id: raw.conversation_id,
            sender: PublicProfile {
                id: raw.sender_id,
                first_name: raw.sender_first_name,
                last_name: raw.sender_last_name,
                role: raw.sender_role,
                avatar_url: raw.sender_avatar_url,
            },
            receiver: PublicProfile {
                id: raw.receiver_id,
                first_name: raw.receiver_first_name,
                last_name: raw.receiver_last_name,
                role: raw.receiver_role,
                avatar_url: raw.receiver_avatar_url,
            },
            content: raw.content,
            _type: raw._type,
            is_read: raw.is_read,
            created_at: raw.created_at,
        }
    }
}
