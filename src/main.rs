use actix::Actor;
use actix_web::{
    self, App, HttpServer,
    middleware::{Logger, from_fn},
    web,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use realty_chat::{
    ENV,
    configs::{connect_database, run_migrations},
    middlewares::authentication,
    modules::{
        self,
        conversation::{handle::ConversationSvc, repository_pg::ConversationPgRepository},
        message::{handle::MessageSvc, repository_pg::MessageRepositoryPg},
        user::repository_pg::UserRepositoryPg,
        websocket::{handler::relay_handler, server::RelayServer},
    },
};

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;
    run_migrations(&db_pool)
        .await
        .map_err(|_| std::io::Error::other("Database migration error"))?;

    let user_repo = Arc::new(UserRepositoryPg::new(db_pool.clone()));
    let conversation_repo = Arc::new(ConversationPgRepository::new(db_pool.clone()));
    let message_repo = Arc::new(MessageRepositoryPg::new(db_pool.clone()));

    let conversation_service = ConversationSvc::with_dependencies(
        conversation_repo.clone(),
        message_repo.clone(),
        user_repo.clone(),
    );
    let message_service = MessageSvc::with_dependencies(message_repo, conversation_repo, user_repo);

    // Một relay server cho toàn bộ workers, giữ presence map thống nhất.
    let relay_server = RelayServer::new().start();

    println!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = actix_cors::Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(conversation_service.clone()))
            .app_data(web::Data::new(message_service.clone()))
            .app_data(web::Data::new(relay_server.clone()))
            .service(health_check)
            .route("/ws", web::get().to(relay_handler))
            .service(
                web::scope("/api")
                    .wrap(from_fn(authentication))
                    .configure(modules::conversation::route::configure)
                    .configure(modules::message::route::configure),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
