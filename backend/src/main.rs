mod attributes;
mod campaign;
mod config;
mod job_controller;
mod placeholders;
mod services;

use crate::attributes::SqliteAttributeStore;
use crate::campaign::state::CampaignsState;
use crate::config::Config;
use crate::job_controller::state::JobsState;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::load().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let store = SqliteAttributeStore::new(&config.store.database_path);
    // A store that cannot be prepared is not fatal: campaigns fail open at start.
    if let Err(e) = store.init_schema() {
        log::warn!("Could not prepare attribute store at {}: {}", store.path().display(), e);
    }
    let store_path = store.path().display().to_string();

    let campaigns_state = CampaignsState::new(Arc::new(store), config.on_directory_error);

    // Initialize job controller state
    let (jobs_state, rx) = JobsState::new(100);

    // Start job updater task
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        job_controller::state::start_job_updater(updater_state, rx).await;
    });

    let host = config.server.host.clone();
    let port = config.server.port;
    info!(
        "Subject placeholder service running at http://{}:{} (attributes from {}, directory errors: {:?})",
        host,
        port,
        store_path,
        config.on_directory_error
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(campaigns_state.clone()))
            .app_data(web::Data::new(jobs_state.clone()))
            .service(services::campaigns::configure_routes())
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
