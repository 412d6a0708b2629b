pub use crate::error::Result;
use crate::amo::auth::AmoAuth;
use crate::amo::AmoClient;
use crate::api::AppState;
use crate::config::Config;
use crate::pipeline::LeadsPipeline;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::net::TcpListener;

mod amo;
mod api;
mod config;
mod error;
mod model;
mod pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    pretty_env_logger::init();

    let config = Config::load_from_env().unwrap_or_else(|err| {
        panic!("FATAL - WHILE LOADING Config -cause: {:?}", err);
    });

    let client = AmoClient::new(&config)?;
    let auth = config
        .OAUTH
        .clone()
        .map(|oauth| AmoAuth::new(client.clone(), oauth));
    if auth.is_none() {
        log::info!("OAuth variables not set, /api/auth/token disabled");
    }

    let app = api::router(AppState {
        pipeline: LeadsPipeline::new(client),
        auth,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.APP_PORT));
    let listener = TcpListener::bind(addr).await?;
    log::info!("Serving joined leads on http://{addr}/api/leads");

    axum::serve(listener, app).await?;

    Ok(())
}
