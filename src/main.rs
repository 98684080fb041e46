#[macro_use]
extern crate lazy_static;

use std::sync::Arc;

use actix_files::{Files, NamedFile};
use actix_identity::IdentityMiddleware;
use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{
    cookie::Key,
    http::{Method, StatusCode},
    middleware,
    web::{self, Data},
    App, Either, HttpResponse, HttpServer, Responder,
};
use log::info;
use sqlx::SqlitePool;
use tera::Tera;

mod backend;
mod config;
mod db;
mod errors;
mod listing;
mod models;
mod routes;
#[cfg(test)]
mod test_support;
mod utils;

use backend::{Backend, HttpBackend};
use config::Config;
use errors::AppError;

pub const SESSION_COOKIE: &str = "repair_admin";

#[derive(Clone)]
pub struct AppState {
    db_pool: SqlitePool,
    backend: Arc<dyn Backend>,
    page_size: usize,
}

lazy_static! {
    pub static ref TEMPLATES: Tera = {
        let mut tera = match Tera::new("templates/**/*") {
            Ok(t) => t,
            Err(e) => {
                log::error!("Parsing error(s): {}", e);
                ::std::process::exit(1);
            }
        };
        tera.autoescape_on(vec![".html"]);
        tera
    };
}

pub fn session_middleware(key: Key, secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(secure)
        .build()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("FATAL: {}", e);
        AppError::ConfigError(e)
    })?;

    let db_pool = db::connect(&config.database_url).await?;

    let backend: Arc<dyn Backend> = Arc::new(
        HttpBackend::new(config.backend_url.clone(), config.backend_timeout)
            .map_err(AppError::BackendError)?,
    );
    info!("Using marketplace backend at {}", config.backend_url);

    let state = AppState {
        db_pool,
        backend,
        page_size: config.page_size,
    };
    let session_key = Key::from(config.session_key.as_bytes());
    let secure_cookies = config.secure_cookies;

    info!(
        "Starting HTTP server on http://{}:{}/",
        config.bind_addr, config.port
    );

    HttpServer::new(move || {
        App::new()
            // enable automatic response compression - usually register this first
            .wrap(middleware::Compress::default())
            .wrap(IdentityMiddleware::default())
            .wrap(session_middleware(session_key.clone(), secure_cookies))
            // enable logger - always register Actix Web Logger middleware last
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", "static"))
            .configure(routes::configure)
            .app_data(Data::new(state.clone()))
            .default_service(web::to(default_handler))
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}

async fn default_handler(req_method: Method) -> Result<impl Responder, std::io::Error> {
    match req_method {
        Method::GET => {
            let file = NamedFile::open("static/404.html")?
                .customize()
                .with_status(StatusCode::NOT_FOUND);
            Ok(Either::Left(file))
        }
        _ => Ok(Either::Right(HttpResponse::MethodNotAllowed().finish())),
    }
}
