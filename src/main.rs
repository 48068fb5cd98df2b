use actix_web::{web, App, HttpServer};
use clap::Parser;
use env_logger::Env;

use crate::app_state::AppState;
use crate::args::Args;

mod app_state;
mod args;
mod blockchain;
mod cache;
mod error;
mod json_rpc;
mod metrics;
mod routes;
mod solana_rpc;
mod utils;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let args = Args::parse();

    let app_state = match AppState::new(&args) {
        Ok(app_state) => web::Data::new(app_state),
        Err(err) => {
            tracing::error!("fail to start: {err:#}");
            return Err(err);
        }
    };

    tracing::info!("Server listening on {}:{}", args.bind, args.port);

    {
        let app_state = app_state.clone();
        let cors_origins = args.cors_origins.clone();

        HttpServer::new(move || {
            App::new()
                .wrap(routes::cors(&cors_origins))
                .app_data(app_state.clone())
                .configure(routes::configure)
                .service(metrics::metrics)
        })
        .bind((args.bind.as_str(), args.port))?
        .run()
        .await?;
    }

    tracing::info!("Server stopped");

    Ok(())
}
