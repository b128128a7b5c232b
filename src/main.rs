mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod qr;
mod routes;
mod services;
mod state;
mod structs;
mod utils;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http, middleware::Logger, web};
use dotenv::dotenv;
use env_logger::Env;

use crate::config::Config;
use crate::state::app_state::AppState;
use crate::state::response_cache::ResponseCache;
use routes::init_routes;

const JSON_LIMIT: usize = 10 * 1024 * 1024;

fn cors(frontend_url: Option<&str>) -> Cors {
    let mut cors = Cors::default()
        .allowed_origin("http://localhost:3000")
        .allowed_origin_fn(|origin, _req_head| {
            origin
                .to_str()
                .map(|o| o.starts_with("https://") && o.ends_with(".vercel.app"))
                .unwrap_or(false)
        })
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        .supports_credentials()
        .max_age(3600);
    if let Some(url) = frontend_url {
        cors = cors.allowed_origin(url);
    }
    cors
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env()?;
    let store = db::connect(&config).await?;

    let cache = Arc::new(if config.cache_enabled {
        ResponseCache::new(config.cache_ttl)
    } else {
        ResponseCache::disabled()
    });
    if cache.is_enabled() {
        ResponseCache::spawn_sweeper(&cache, config.cache_sweep_interval);
    }

    let bind = (config.host.clone(), config.port);
    log::info!(
        "QR tracker listening on {}:{}, tracking links under {}",
        bind.0,
        bind.1,
        config.base_url
    );

    let frontend_url = config.frontend_url.clone();
    let app_state = web::Data::new(AppState::new(store, cache, config));

    HttpServer::new(move || {
        let logger = Logger::new("%a \"%r\" %s %b \"%{Referer}i\" \"%{User-Agent}i\" %D ms");
        App::new()
            .wrap(logger)
            .wrap(cors(frontend_url.as_deref()))
            .app_data(app_state.clone())
            .app_data(web::JsonConfig::default().limit(JSON_LIMIT))
            .configure(init_routes)
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
