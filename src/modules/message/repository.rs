use uuid::Uuid;

use crate::modules::message::model::{InsertMessage, MessageDetail};
use crate::{api::error, modules::message::schema::MessageEntity};

#[async_trait::async_trait]
pub trait MessageRepository {
    /// Insert message và dời con trỏ last_message_id của conversation
    /// trong cùng một transaction.
    async fn append(&self, message: &InsertMessage) -> Result<MessageEntity, error::SystemError>;

    async fn find_by_id(
        &self,
        message_id: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError>;

    async fn detail_by_id(
        &self,
        message_id: &Uuid,
    ) -> Result<Option<MessageDetail>, error::SystemError>;

    /// Toàn bộ message của conversation, createdAt tăng dần
    /// (tie-break theo id).
    async fn list_for_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<MessageDetail>, error::SystemError>;

    /// Set is_read = true, idempotent. None khi message không tồn tại.
    async fn mark_read(
        &self,
        message_id: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError>;
}
