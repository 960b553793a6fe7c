use actix_web::web::ServiceConfig;

use crate::modules::conversation::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(get_conversations).service(get_conversation_messages).service(create_conversation);
}
