use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

#[macro_use]
extern crate diesel;

mod config;
mod errors;
mod handlers;
mod models;
mod schema;
mod store;

use config::Config;
use store::{
    backend::{Backend, MemoryBackend, PgBackend},
    NoteStore,
};

fn startup_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;
    let guard = config.credential_guard().map_err(startup_error)?;
    let ids = config.id_generator().map_err(startup_error)?;

    let backend: Arc<dyn Backend> = match &config.database_url {
        Some(url) => Arc::new(PgBackend::connect(url).map_err(startup_error)?),
        None => {
            log::warn!("DATABASE_URL is not set, notes are kept in memory only");
            Arc::new(MemoryBackend::new())
        }
    };
    let store = web::Data::new(NoteStore::new(backend, guard).with_id_generator(ids));

    log::info!("listening on {}:{}", config.bind_address, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(handlers::configure)
    })
    .bind((config.bind_address.as_str(), config.port))?
    .run()
    .await
}
