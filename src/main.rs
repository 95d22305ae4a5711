pub mod app;
pub mod database;
pub mod schema;

mod auth;
mod routes;

use actix_web::{middleware, web::Data, App, HttpServer};

use app::{config::Config, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))?;
    let app_state =
        AppState::new(&config).map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))?;

    log::info!("server listening on {}:{}", config.bind_address, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .configure(routes::configure)
    })
    .bind((config.bind_address.as_str(), config.port))?
    .run()
    .await
}
