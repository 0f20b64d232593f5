use config::Config;
use sqlx::PgPool;
use tokio::sync::broadcast;

use routes::realtime::ParticipantInserted;

pub mod config;
pub mod flow;
pub mod middleware;
pub mod utils;

pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub http: reqwest::Client,
    pub events: broadcast::Sender<ParticipantInserted>,
}
