use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer};
use taskdeck::config::Config;
use taskdeck::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let state = match &config.database_url {
        Some(url) => AppState::postgres(&config, url).await.map_err(|e| e.to_string()),
        None => {
            log::warn!("DATABASE_URL is not set; using the in-memory store, data will not persist");
            AppState::in_memory(&config).map_err(|e| e.to_string())
        }
    };
    let state = match state {
        Ok(state) => state,
        Err(e) => {
            log::error!("failed to initialise application state: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("Starting server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(|cfg| state.configure(cfg))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
