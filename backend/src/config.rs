//! Server configuration from CLI flags with environment fallbacks.

use clap::Parser;

/// Runtime configuration for the Fundline backend.
///
/// Every flag can also be supplied through a `FUNDLINE_*` environment
/// variable; flags win when both are present.
#[derive(Debug, Clone, Parser)]
#[command(name = "fundline-backend", about = "Research-fund tracking backend")]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[arg(long, env = "FUNDLINE_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: String,

    /// Secret used to sign and verify bearer tokens. When absent, a debug
    /// build generates an ephemeral secret (tokens die with the process);
    /// a release build refuses to start.
    #[arg(long, env = "FUNDLINE_JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// Bearer token lifetime in seconds.
    #[arg(long, env = "FUNDLINE_TOKEN_TTL_SECS", default_value_t = 3600)]
    pub token_ttl_secs: u64,

    /// bcrypt cost factor for password hashing.
    #[arg(long, env = "FUNDLINE_BCRYPT_COST", default_value_t = 12)]
    pub bcrypt_cost: u32,
}
