use crate::appdata::ApplicationData;
use crate::config::Config;
use crate::inventory::declaration::Declarations;
use crate::opts::Opts;
use crate::services::directory::LdapDirectory;
use crate::services::dns::DigResolver;
use crate::services::probe::ResolverProbe;
use crate::services::Lookups;
use actix_web::middleware::normalize::TrailingSlash;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{web, App, HttpServer};
use log::{error, info, LevelFilter};
use std::process::exit;
use std::sync::Arc;

mod appdata;
mod cache;
mod config;
mod error;
mod handlers;
mod inventory;
mod opts;
mod services;
mod templates;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let opts = Opts::new();
    match opts.verbose {
        0 => env_logger::builder()
            .filter_level(LevelFilter::Error)
            .init(),
        1 => env_logger::builder().filter_level(LevelFilter::Warn).init(),
        2 => env_logger::builder().filter_level(LevelFilter::Info).init(),
        3 => env_logger::builder()
            .filter_level(LevelFilter::Debug)
            .init(),
        _ => env_logger::builder()
            .filter_level(LevelFilter::Trace)
            .init(),
    }

    info!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let mut config = match Config::from_file(&opts.config) {
        Ok(x) => x,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            exit(1);
        }
    };

    if let Some(declarations) = opts.declarations {
        config.global.declarations = declarations;
    }
    if let Some(bind) = opts.bind {
        config.global.bind = bind;
    }

    let declarations = match Declarations::read(&config.global.declarations) {
        Ok(x) => x,
        Err(e) => {
            error!("Failed to load host declarations: {:?}", e);
            exit(1);
        }
    };

    let directory = Arc::new(LdapDirectory::new(&config));
    let lookups = Lookups {
        directory: directory.clone(),
        desktops: directory,
        resolver: Arc::new(DigResolver::new(&config)),
        probe: Arc::new(ResolverProbe),
        domain: config.global.domain.clone(),
    };

    let bind = config.global.bind.clone();
    let appdata = ApplicationData::new(config, declarations, lookups);

    info!("Listening on {}", bind);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::new(TrailingSlash::Trim))
            .data(appdata.clone())
            .route(
                "/docs/staff/backend/servers",
                web::get().to(handlers::servers::servers),
            )
            .route(
                "/docs/staff/backend/stretch-upgrade",
                web::get().to(handlers::stretch_upgrade::stretch_upgrade),
            )
    })
    .bind(bind)?
    .run()
    .await
}
