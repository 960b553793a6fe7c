use uuid::Uuid;

use crate::{
    api::error,
    modules::conversation::{model::ConversationDetail, schema::ConversationEntity},
};

#[async_trait::async_trait]
pub trait ConversationRepository {
    async fn find_by_id(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError>;

    /// Pair lookup theo thứ tự lưu trữ (first < second).
    async fn find_by_pair(
        &self,
        first: &Uuid,
        second: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError>;

    /// Insert race-safe: hai caller đồng thời cùng cặp đều nhận về row
    /// còn sống duy nhất của cặp đó.
    async fn create_for_pair(
        &self,
        first: &Uuid,
        second: &Uuid,
    ) -> Result<ConversationEntity, error::SystemError>;

    /// Tất cả conversation của user, mới nhất trước, kèm profile của
    /// participant còn lại, last message và unread count.
    async fn list_for_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<ConversationDetail>, error::SystemError>;
}
