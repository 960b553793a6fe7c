/// Message Service
///
/// Service layer xử lý business logic cho messages, bao gồm:
/// - Gửi tin nhắn (durable path, bản relay đi qua WebSocket riêng)
/// - Đánh dấu đã đọc
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::conversation::repository::ConversationRepository;
use crate::modules::conversation::schema::ConversationEntity;
use crate::modules::message::model::{InsertMessage, MessageDetail};
use crate::modules::message::repository::MessageRepository;
use crate::modules::message::schema::{MessageEntity, MessageType};
use crate::modules::user::repository::UserRepository;

/// Message service với generic repositories để dễ testing
#[derive(Clone)]
pub struct MessageService<M, C, U>
where
    M: MessageRepository + Send + Sync + 'static,
    C: ConversationRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    message_repo: Arc<M>,
    conversation_repo: Arc<C>,
    user_repo: Arc<U>,
}

impl<M, C, U> MessageService<M, C, U>
where
    M: MessageRepository + Send + Sync + 'static,
    C: ConversationRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    /// Tạo MessageService với các dependencies
    pub fn with_dependencies(
        message_repo: Arc<M>,
        conversation_repo: Arc<C>,
        user_repo: Arc<U>,
    ) -> Self {
        MessageService { message_repo, conversation_repo, user_repo }
    }

    /// Gửi tin nhắn giữa 2 users
    ///
    /// Flow:
    /// 1. Validate text và cặp sender/receiver
    /// 2. Resolve conversation (từ id truyền vào hoặc tìm/tạo theo cặp)
    /// 3. Insert message + dời con trỏ last message (một transaction)
    /// 4. Trả về message đã resolve profile hai phía
    pub async fn send_message(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        text: String,
        conversation_id: Option<Uuid>,
        message_type: Option<MessageType>,
    ) -> Result<MessageDetail, error::SystemError> {
        if sender_id == receiver_id {
            return Err(error::SystemError::bad_request("Cannot send a message to yourself"));
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(error::SystemError::bad_request("Message text cannot be empty"));
        }

        let conversation = match conversation_id {
            Some(id) => {
                let conversation = self
                    .conversation_repo
                    .find_by_id(&id)
                    .await?
                    .ok_or_else(|| error::SystemError::not_found("Conversation not found"))?;

                // Cặp sender/receiver phải đúng là hai participant của
                // conversation được chỉ định
                if conversation.counterpart_of(&sender_id) != Some(receiver_id) {
                    return Err(error::SystemError::forbidden(
                        "Conversation does not belong to this sender/receiver pair",
                    ));
                }

                conversation
            }
            None => self.resolve_pair_conversation(sender_id, receiver_id).await?,
        };

        let message = self
            .message_repo
            .append(&InsertMessage {
                conversation_id: conversation.id,
                sender_id,
                receiver_id,
                content: text.to_owned(),
                _type: message_type.unwrap_or_default(),
            })
            .await?;

        self.message_repo
            .detail_by_id(&message.id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Message not found"))
    }

    /// Đánh dấu đã đọc, chỉ receiver mới được đánh dấu. Idempotent:
    /// gọi lại trên message đã đọc trả về message như cũ.
    pub async fn mark_as_read(
        &self,
        message_id: Uuid,
        user_id: Uuid,
    ) -> Result<MessageEntity, error::SystemError> {
        let message = self
            .message_repo
            .find_by_id(&message_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Message not found"))?;

        if message.receiver_id != user_id {
            return Err(error::SystemError::forbidden(
                "Only the receiver can mark a message as read",
            ));
        }

        if message.is_read {
            return Ok(message);
        }

        self.message_repo
            .mark_read(&message_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Message not found"))
    }

    /// Tìm conversation theo cặp, tạo mới nếu chưa có.
    async fn resolve_pair_conversation(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
    ) -> Result<ConversationEntity, error::SystemError> {
        let (first, second) = ConversationEntity::ordered_pair(sender_id, receiver_id);

        if let Some(conversation) = self.conversation_repo.find_by_pair(&first, &second).await? {
            return Ok(conversation);
        }

        self.user_repo
            .find_by_id(&receiver_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Receiver not found"))?;

        self.conversation_repo.create_for_pair(&first, &second).await
    }
}
