use actix_multipart::form::MultipartFormConfig;
use actix_web::web::Data;
use actix_web::{App, HttpServer, middleware::Logger};
use dotenvy::dotenv;

use splab::config::AppConfig;
use splab::handlers;
use splab::store;
use splab::uploads::UploadStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    if config.jwt_key.is_none() {
        log::warn!("JWT_KEY is not set; staff routes will reject every request");
    }

    let db_pool = store::connect(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;
    store::migrate(&db_pool).await.map_err(std::io::Error::other)?;

    let uploads = UploadStore::new(config.media_root.clone());
    let multipart = MultipartFormConfig::default()
        .total_limit(config.max_upload_bytes)
        .memory_limit(config.max_upload_bytes);

    let bind = (config.host.clone(), config.port);
    log::info!(
        "listening on {}:{}, media root {}",
        bind.0,
        bind.1,
        uploads.root().display()
    );

    let config = Data::new(config);
    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(db_pool.clone()))
            .app_data(Data::new(uploads.clone()))
            .app_data(config.clone())
            .app_data(multipart.clone())
            .wrap(Logger::default())
            .configure(handlers::config)
    })
    .bind(bind)?
    .run()
    .await
}
