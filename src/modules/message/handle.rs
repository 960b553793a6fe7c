use actix_web::{post, put, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        conversation::repository_pg::ConversationPgRepository,
        message::{
            model::{MessageDetail, SendMessageRequest},
            repository_pg::MessageRepositoryPg,
            schema::MessageEntity,
            service::MessageService,
        },
        user::repository_pg::UserRepositoryPg,
    },
    utils::ValidatedJson,
};

pub type MessageSvc =
    MessageService<MessageRepositoryPg, ConversationPgRepository, UserRepositoryPg>;

#[post("/send")]
pub async fn send_message(
    message_svc: web::Data<MessageSvc>,
    body: ValidatedJson<SendMessageRequest>,
    req: HttpRequest,
) -> Result<success::Success<MessageDetail>, error::Error> {
    let sender_id = get_claims(&req)?.sub;

    let body = body.0;

    let message = message_svc
        .send_message(sender_id, body.receiver_id, body.text, body.conversation_id, body.message_type)
        .await?;

    Ok(success::Success::created(Some(message)).message("Message sent"))
}

#[put("/read/{message_id}")]
pub async fn mark_as_read(
    message_svc: web::Data<MessageSvc>,
    message_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<MessageEntity>, error::Error> {
    let user_id = get_claims(&req)?.sub;

    let message = message_svc.mark_as_read(*message_id, user_id).await?;

    Ok(success::Success::ok(Some(message)).message("Message marked as read"))
}
