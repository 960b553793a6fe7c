use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        conversation::{
            model::ConversationDetail, repository::ConversationRepository,
            schema::ConversationEntity,
        },
        message::{model::MessageDetail, repository::MessageRepository},
        user::repository::UserRepository,
    },
};

/// Service cho conversation: resolve cặp user về đúng một conversation,
/// trả inbox list và lịch sử tin nhắn.
#[derive(Clone)]
pub struct ConversationService<R, M, U>
where
    R: ConversationRepository + Send + Sync + 'static,
    M: MessageRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    conversation_repo: Arc<R>,
    message_repo: Arc<M>,
    user_repo: Arc<U>,
}

impl<R, M, U> ConversationService<R, M, U>
where
    R: ConversationRepository + Send + Sync + 'static,
    M: MessageRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn with_dependencies(
        conversation_repo: Arc<R>,
        message_repo: Arc<M>,
        user_repo: Arc<U>,
    ) -> Self {
        ConversationService { conversation_repo, message_repo, user_repo }
    }

    /// Tìm hoặc tạo conversation cho cặp user, không phân biệt thứ tự truyền vào.
    /// Gọi lại với cùng cặp (kể cả đảo chiều) luôn trả về cùng một conversation.
    pub async fn find_or_create(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<ConversationEntity, error::SystemError> {
        if user_a == user_b {
            return Err(error::SystemError::bad_request(
                "Cannot start a conversation with yourself",
            ));
        }

        let (first, second) = ConversationEntity::ordered_pair(user_a, user_b);

        if let Some(conversation) = self.conversation_repo.find_by_pair(&first, &second).await? {
            return Ok(conversation);
        }

        // Chỉ check tồn tại khi phải tạo mới; conversation đã có nghĩa là
        // cả hai user đều tồn tại
        self.user_repo
            .find_by_id(&user_b)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Receiver not found"))?;

        self.conversation_repo.create_for_pair(&first, &second).await
    }

    /// Danh sách conversation của user, mới nhất trước, kèm unread count.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ConversationDetail>, error::SystemError> {
        self.conversation_repo.list_for_user(&user_id).await
    }

    /// Lịch sử tin nhắn của một conversation, createdAt tăng dần.
    /// Chỉ participant mới được xem.
    pub async fn messages(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<MessageDetail>, error::SystemError> {
        let conversation = self
            .conversation_repo
            .find_by_id(&conversation_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Conversation not found"))?;

        if !conversation.has_participant(&user_id) {
            return Err(error::SystemError::forbidden("You are not part of this conversation"));
        }

        self.message_repo.list_for_conversation(&conversation_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::fakes::FakeStore;

    fn service_with(
        store: Arc<FakeStore>,
    ) -> ConversationService<FakeStore, FakeStore, FakeStore> {
        ConversationService::with_dependencies(store.clone(), store.clone(), store)
    }

    #[actix_web::test]
    async fn test_find_or_create_is_idempotent_across_permutations() {
        let store = Arc::new(FakeStore::new());
        let alice = store.seed_user("Alice");
        let bob = store.seed_user("Bob");
        let service = service_with(store);

        let first = service.find_or_create(alice, bob).await.unwrap();
        let second = service.find_or_create(bob, alice).await.unwrap();

        assert_eq!(first.id, second.id);
        assert!(first.participant_one < first.participant_two);
    }

    #[actix_web::test]
    async fn test_find_or_create_rejects_self_conversation() {
        let store = Arc::new(FakeStore::new());
        let alice = store.seed_user("Alice");
        let service = service_with(store);

        let err = service.find_or_create(alice, alice).await.unwrap_err();
        assert!(matches!(err, error::SystemError::BadRequest(_)));
    }

    #[actix_web::test]
    async fn test_find_or_create_rejects_unknown_receiver() {
        let store = Arc::new(FakeStore::new());
        let alice = store.seed_user("Alice");
        let service = service_with(store);

        let err = service.find_or_create(alice, Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));
    }

    #[actix_web::test]
    async fn test_messages_rejects_unknown_conversation() {
        let store = Arc::new(FakeStore::new());
        let alice = store.seed_user("Alice");
        let service = service_with(store);

        let err = service.messages(Uuid::now_v7(), alice).await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));
    }

    #[actix_web::test]
    async fn test_messages_rejects_non_participant() {
        let store = Arc::new(FakeStore::new());
        let alice = store.seed_user("Alice");
        let bob = store.seed_user("Bob");
        let eve = store.seed_user("Eve");
        let service = service_with(store);

        let conversation = service.find_or_create(alice, bob).await.unwrap();

        let err = service.messages(conversation.id, eve).await.unwrap_err();
        assert!(matches!(err, error::SystemError::Forbidden(_)));
    }

    #[actix_web::test]
    async fn test_messages_of_fresh_conversation_is_empty() {
        let store = Arc::new(FakeStore::new());
        let alice = store.seed_user("Alice");
        let bob = store.seed_user("Bob");
        let service = service_with(store);

        let conversation = service.find_or_create(alice, bob).await.unwrap();
        let messages = service.messages(conversation.id, alice).await.unwrap();

        assert!(messages.is_empty());
        assert!(conversation.last_message_id.is_none());
    }

    #[actix_web::test]
    async fn test_list_for_user_is_empty_without_conversations() {
        let store = Arc::new(FakeStore::new());
        let alice = store.seed_user("Alice");
        let service = service_with(store);

        let conversations = service.list_for_user(alice).await.unwrap();
        assert!(conversations.is_empty());
    }
}
