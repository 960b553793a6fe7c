use actix_web::{get, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        conversation::{
            model::{ConversationDetail, NewConversationRequest},
            repository_pg::ConversationPgRepository,
            schema::ConversationEntity,
            service::ConversationService,
        },
        message::{model::MessageDetail, repository_pg::MessageRepositoryPg},
        user::repository_pg::UserRepositoryPg,
    },
    utils::ValidatedJson,
};

pub type ConversationSvc =
    ConversationService<ConversationPgRepository, MessageRepositoryPg, UserRepositoryPg>;

#[get("/conversations")]
pub async fn get_conversations(
    conversation_svc: web::Data<ConversationSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<ConversationDetail>>, error::Error> {
    let user_id = get_claims(&req)?.sub;

    let conversations = conversation_svc.list_for_user(user_id).await?;

    Ok(success::Success::ok(Some(conversations)).message("Successfully retrieved conversations"))
}

#[get("/conversation/{conversation_id}")]
pub async fn get_conversation_messages(
    conversation_svc: web::Data<ConversationSvc>,
    conversation_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<Vec<MessageDetail>>, error::Error> {
    let user_id = get_claims(&req)?.sub;

    let messages = conversation_svc.messages(*conversation_id, user_id).await?;

    Ok(success::Success::ok(Some(messages)).message("Successfully retrieved messages"))
}

#[post("/conversations")]
pub async fn create_conversation(
    conversation_svc: web::Data<ConversationSvc>,
    body: ValidatedJson<NewConversationRequest>,
    req: HttpRequest,
) -> Result<success::Success<ConversationEntity>, error::Error> {
    let user_id = get_claims(&req)?.sub;

    let body = body.0;

    if body.sender_id.is_some_and(|sender_id| sender_id != user_id) {
        return Err(error::Error::bad_request("Sender must be the authenticated user"));
    }

    let conversation = conversation_svc.find_or_create(user_id, body.receiver_id).await?;

    Ok(success::Success::ok(Some(conversation)).message("Successfully resolved conversation"))
}
