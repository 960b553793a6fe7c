use uuid::Uuid;

use crate::{
    api::error,
    modules::message::{
        model::{InsertMessage, MessageDetail, MessageDetailRaw},
        repository::MessageRepository,
        schema::MessageEntity,
    },
};

const DETAIL_COLUMNS: &str = r#"
    m.id,
    m.conversation_id,
    m.content,
    m.type,
    m.is_read,
    m.created_at,

    s.id AS sender_id,
    s.first_name AS sender_first_name,
    s.last_name AS sender_last_name,
    s.role AS sender_role,
    s.avatar_url AS sender_avatar_url,

    r.id AS receiver_id,
    r.first_name AS receiver_first_name,
    r.last_name AS receiver_last_name,
    r.role AS receiver_role,
    r.avatar_url AS receiver_avatar_url
"#;

#[derive(Clone)]
pub struct MessageRepositoryPg {
    pool: sqlx::PgPool,
}

impl MessageRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MessageRepository for MessageRepositoryPg {
    async fn append(&self, message: &InsertMessage) -> Result<MessageEntity, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, MessageEntity>(
            r#"
            INSERT INTO messages (id, conversation_id, sender_id, receiver_id, content, type)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(message.conversation_id)
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(&message.content)
        .bind(&message._type)
        .fetch_one(tx.as_mut())
        .await?;

        sqlx::query("UPDATE conversations SET last_message_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(created.conversation_id)
            .bind(created.id)
            .execute(tx.as_mut())
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn find_by_id(
        &self,
        message_id: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError> {
        let message = sqlx::query_as::<_, MessageEntity>("SELECT * FROM messages WHERE id = $1")
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(message)
    }

    async fn detail_by_id(
        &self,
        message_id: &Uuid,
    ) -> Result<Option<MessageDetail>, error::SystemError> {
        let row = sqlx::query_as::<_, MessageDetailRaw>(&format!(
            r#"
            SELECT {DETAIL_COLUMNS}
            FROM messages m
            JOIN users s ON s.id = m.sender_id
            JOIN users r ON r.id = m.receiver_id
            WHERE m.id = $1
            "#
        ))
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MessageDetail::from))
    }

    async fn list_for_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<MessageDetail>, error::SystemError> {
        // index on (conversation_id, created_at, id)
        let rows = sqlx::query_as::<_, MessageDetailRaw>(&format!(
            r#"
            SELECT {DETAIL_COLUMNS}
            FROM messages m
            JOIN users s ON s.id = m.sender_id
            JOIN users r ON r.id = m.receiver_id
            WHERE m.conversation_id = $1
            ORDER BY m.created_at ASC, m.id ASC
            "#
        ))
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MessageDetail::from).collect())
    }

    async fn mark_read(
        &self,
        message_id: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError> {
        let message = sqlx::query_as::<_, MessageEntity>(
            "UPDATE messages SET is_read = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }
}
