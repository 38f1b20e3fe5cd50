//! Backend entry-point: wires the store, credential adapter, services, and
//! REST endpoints.

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

use backend::api::health::HealthState;
use backend::api::{self, AppState};
use backend::auth::JwtCredentialService;
use backend::config::ServerConfig;
use backend::store::MemoryStore;
use backend::RequestId;

fn resolve_secret(config: &ServerConfig) -> std::io::Result<Vec<u8>> {
    if let Some(secret) = &config.jwt_secret {
        return Ok(secret.as_bytes().to_vec());
    }
    if cfg!(debug_assertions) {
        warn!("using ephemeral token secret (dev only); tokens die with the process");
        let secret = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        return Ok(secret.into_bytes());
    }
    Err(std::io::Error::other(
        "FUNDLINE_JWT_SECRET must be set in release builds",
    ))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = ServerConfig::parse();
    let secret = resolve_secret(&config)?;

    let store = Arc::new(MemoryStore::new());
    let credentials = Arc::new(JwtCredentialService::new(
        &secret,
        config.token_ttl_secs,
        config.bcrypt_cost,
    ));
    let state = web::Data::new(AppState::new(store, credentials));
    let health = web::Data::new(HealthState::new());

    let server_state = state.clone();
    let server_health = health.clone();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestId)
            .configure(|cfg| api::configure(cfg, server_state.clone(), server_health.clone()))
    })
    .bind(config.bind_addr.as_str())?;

    info!(bind_addr = %config.bind_addr, "fundline backend listening");
    health.mark_ready();
    server.run().await
}
