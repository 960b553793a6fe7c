//! Realty chat backend library.
//!
//! Module được expose ở đây để integration tests (tests/) dựng lại app
//! với cùng routes và relay server như binary.

use std::sync::LazyLock;

pub mod api;
pub mod client;
pub mod configs;
pub mod constants;
pub mod middlewares;
pub mod modules;
pub mod utils;


pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});
