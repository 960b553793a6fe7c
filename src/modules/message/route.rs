use actix_web::web::ServiceConfig;

use crate::modules::message::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(send_message).service(mark_as_read);
}
