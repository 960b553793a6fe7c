use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::modules::user::model::PublicProfile;
use crate::modules::user::schema::UserRole;

/// Request body cho POST /conversations. Sender là user đã authenticate,
/// field senderId chỉ để tương thích client cũ và phải khớp với token.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewConversationRequest {
    pub sender_id: Option<Uuid>,
    pub receiver_id: Uuid,
}

/// Tin nhắn mới nhất đính kèm mỗi conversation trong danh sách.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMessageRow {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Flat row từ query danh sách conversation, chưa lồng profile/last message.
#[derive(FromRow)]
pub struct ConversationRaw {
    pub id: Uuid,
    pub participant_one: Uuid,
    pub participant_two: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,

    pub other_id: Uuid,
    pub other_first_name: String,
    pub other_last_name: String,
    pub other_role: UserRole,
    pub other_avatar_url: Option<String>,

    pub last_id: Option<Uuid>,
    pub last_sender_id: Option<Uuid>,
    pub last_content: Option<String>,
    pub last_created_at: Option<chrono::DateTime<chrono::Utc>>,

    pub unread_count: i64,
}

/// Conversation đã kèm đủ dữ liệu hiển thị cho inbox list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDetail {
    pub id: Uuid,
    pub participants: [Uuid; 2],
    pub other_participant: PublicProfile,
    pub last_message: Option<LastMessageRow>,
    /// Số message chưa đọc mà user hiện tại là receiver (tính từ store,
    /// không phải counter riêng)
    pub unread_count: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ConversationRaw> for ConversationDetail {
    fn from(raw: ConversationRaw) -> Self {
        let last_message = match (raw.last_id, raw.last_sender_id, raw.last_content, raw.last_created_at) {
            (Some(id), Some(sender_id), Some(content), Some(created_at)) => {
                Some(LastMessageRow { id, sender_id, content, created_at })
            }
            _ => None,
        };

        ConversationDetail {
            id: raw.id,
            participants: [raw.participant_one, raw.participant_two],
            other_participant: PublicProfile {
                id: raw.other_id,
                first_name: raw.other_first_name,
                last_name: raw.other_last_name,
                role: raw.other_role,
                avatar_url: raw.other_avatar_url,
            },
            last_message,
            unread_count: raw.unread_count,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        }
    }
}
