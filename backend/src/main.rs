mod config;
mod error;
mod job_controller;
mod services;
mod session;
mod store;

use crate::config::ServerConfig;
use crate::job_controller::state::JobsState;
use crate::session::SessionStore;
use crate::store::Store;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = ServerConfig::from_env();

    let store = Store::open(&config.database_path).map_err(std::io::Error::other)?;
    let session = web::Data::new(SessionStore::load(&config.session_path));

    let (jobs_state, rx) = JobsState::new();
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        job_controller::state::start_job_updater(updater_state, rx).await;
    });

    info!(
        "Server running at {} (datastore {})",
        config.url(),
        config.database_path.display()
    );

    let json_limit = config.json_limit;
    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(web::Data::new(store.clone()))
            .app_data(session.clone())
            .app_data(web::Data::new(jobs_state.clone()))
            .configure(services::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
