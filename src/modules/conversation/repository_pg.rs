use uuid::Uuid;

use crate::modules::conversation::model::{ConversationDetail, ConversationRaw};
use crate::modules::conversation::repository::ConversationRepository;
use crate::{api::error, modules::conversation::schema::ConversationEntity};

#[derive(Clone)]
pub struct ConversationPgRepository {
    pool: sqlx::PgPool,
}

impl ConversationPgRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ConversationRepository for ConversationPgRepository {
    async fn find_by_id(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError> {
        let conversation =
            sqlx::query_as::<_, ConversationEntity>("SELECT * FROM conversations WHERE id = $1")
                .bind(conversation_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(conversation)
    }

    async fn find_by_pair(
        &self,
        first: &Uuid,
        second: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError> {
        let conversation = sqlx::query_as::<_, ConversationEntity>(
            "SELECT * FROM conversations WHERE participant_one = $1 AND participant_two = $2",
        )
        .bind(first)
        .bind(second)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conversation)
    }

    async fn create_for_pair(
        &self,
        first: &Uuid,
        second: &Uuid,
    ) -> Result<ConversationEntity, error::SystemError> {
        let created = sqlx::query_as::<_, ConversationEntity>(
            r#"
            INSERT INTO conversations (id, participant_one, participant_two)
            VALUES ($1, $2, $3)
            ON CONFLICT (participant_one, participant_two) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(first)
        .bind(second)
        .fetch_optional(&self.pool)
        .await?;

        // Caller đồng thời có thể đã thắng insert, fallback về lookup
        match created {
            Some(conversation) => Ok(conversation),
            None => self
                .find_by_pair(first, second)
                .await?
                .ok_or_else(|| error::SystemError::not_found("Conversation not found")),
        }
    }

    async fn list_for_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<ConversationDetail>, error::SystemError> {
        let rows = sqlx::query_as::<_, ConversationRaw>(
            r#"
            SELECT
                c.id,
                c.participant_one,
                c.participant_two,
                c.created_at,
                c.updated_at,

                u.id AS other_id,
                u.first_name AS other_first_name,
                u.last_name AS other_last_name,
                u.role AS other_role,
                u.avatar_url AS other_avatar_url,

                lm.id AS last_id,
                lm.sender_id AS last_sender_id,
                lm.content AS last_content,
                lm.created_at AS last_created_at,

                (
                    SELECT COUNT(*)
                    FROM messages m
                    WHERE m.conversation_id = c.id
                      AND m.receiver_id = $1
                      AND m.is_read = FALSE
                ) AS unread_count
            FROM conversations c
            JOIN users u
                ON u.id = CASE
                    WHEN c.participant_one = $1 THEN c.participant_two
                    ELSE c.participant_one
                END
            LEFT JOIN messages lm
                ON lm.id = c.last_message_id
            WHERE c.participant_one = $1 OR c.participant_two = $1
            ORDER BY c.updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ConversationDetail::from).collect())
    }
}
