use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Một row cho mỗi cặp user. Cặp được lưu theo thứ tự chuẩn hóa
/// (participant_one < participant_two) nên mỗi cặp chỉ có đúng một row.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ConversationEntity {
    pub id: Uuid,
    pub participant_one: Uuid,
    pub participant_two: Uuid,
    /// Con trỏ tới message mới nhất, NULL khi conversation chưa có tin nhắn
    pub last_message_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ConversationEntity {
    /// Chuẩn hóa một cặp user về thứ tự lưu trữ.
    pub fn ordered_pair(user_a: Uuid, user_b: Uuid) -> (Uuid, Uuid) {
        let (mut first, mut second) = (user_a, user_b);
        if first > second {
            std::mem::swap(&mut first, &mut second);
        }
        (first, second)
    }

    pub fn has_participant(&self, user_id: &Uuid) -> bool {
        self.participant_one == *user_id || self.participant_two == *user_id
    }

    /// Trả về participant còn lại, None nếu user không thuộc conversation.
    pub fn counterpart_of(&self, user_id: &Uuid) -> Option<Uuid> {
        if self.participant_one == *user_id {
            Some(self.participant_two)
        } else if self.participant_two == *user_id {
            Some(self.participant_one)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_pair_is_permutation_invariant() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();

        assert_eq!(ConversationEntity::ordered_pair(a, b), ConversationEntity::ordered_pair(b, a));

        let (first, second) = ConversationEntity::ordered_pair(a, b);
        assert!(first < second);
    }

    #[test]
    fn test_counterpart_lookup() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let stranger = Uuid::now_v7();
        let (first, second) = ConversationEntity::ordered_pair(a, b);

        let now = chrono::Utc::now();
        let conversation = ConversationEntity {
            id: Uuid::now_v7(),
            participant_one: first,
            participant_two: second,
            last_message_id: None,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(conversation.counterpart_of(&a), Some(b));
        assert_eq!(conversation.counterpart_of(&b), Some(a));
        assert_eq!(conversation.counterpart_of(&stranger), None);
        assert!(conversation.has_participant(&a));
        assert!(!conversation.has_participant(&stranger));
    }
}
