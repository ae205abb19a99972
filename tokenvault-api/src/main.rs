mod app;

use anyhow::{bail, Context};
use app::{app_router, AppState};
use dotenvy::dotenv;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokenvault_core::{
    AccountManager, AccountStore, AuthConfig, FileStore, MemoryStore, MAX_ACCESS_TOKEN_TTL,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone)]
struct ApiConfig {
    bind: SocketAddr,
    /// Account documents live here; unset means an in-memory store
    data_dir: Option<PathBuf>,
    auth: AuthConfig,
    /// Browser origins allowed to call the API
    allowed_origins: Vec<String>,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {}: {}", key, e)),
        _ => Ok(default),
    }
}

/// Secret from `key`, or a random one that only lives for this process.
fn env_secret(key: &str) -> String {
    match env::var(key).ok().filter(|s| !s.trim().is_empty()) {
        Some(secret) => secret,
        None => {
            warn!("{} not set; generating a random secret for this run", key);
            uuid::Uuid::new_v4().to_string()
        }
    }
}

fn check_access_ttl(seconds: i64) -> anyhow::Result<i64> {
    if !(1..=MAX_ACCESS_TOKEN_TTL).contains(&seconds) {
        bail!(
            "TV_ACCESS_TOKEN_TTL must be between 1 and {} seconds",
            MAX_ACCESS_TOKEN_TTL
        );
    }
    Ok(seconds)
}

impl ApiConfig {
    fn from_env() -> anyhow::Result<Self> {
        let bind = env_parse("TV_BIND", SocketAddr::from(([0, 0, 0, 0], 3000)))?;

        let data_dir = env::var("TV_DATA_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let access_secret = env_secret("TV_ACCESS_TOKEN_SECRET");
        let refresh_secret = env_secret("TV_REFRESH_TOKEN_SECRET");
        if access_secret == refresh_secret {
            bail!("TV_ACCESS_TOKEN_SECRET and TV_REFRESH_TOKEN_SECRET must differ");
        }

        let access_ttl = check_access_ttl(env_parse("TV_ACCESS_TOKEN_TTL", 30)?)?;
        let bcrypt_cost: u32 = env_parse("TV_BCRYPT_COST", 10)?;
        if !(10..=31).contains(&bcrypt_cost) {
            bail!("TV_BCRYPT_COST must be between 10 and 31");
        }
        let revoke_on_password_change: bool = env_parse("TV_REVOKE_ON_PASSWORD_CHANGE", true)?;

        // Comma separated; empty means no cross-origin caller is allowed
        let allowed_origins = env::var("TV_ALLOWED_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            bind,
            data_dir,
            auth: AuthConfig::new(access_secret, refresh_secret)
                .with_access_ttl(access_ttl)
                .with_bcrypt_cost(bcrypt_cost)
                .with_revoke_on_password_change(revoke_on_password_change),
            allowed_origins,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Read .env first, if present
    let _ = dotenv();
    init_tracing();

    let config = ApiConfig::from_env()?;
    info!(auth = ?config.auth, "starting API on {}", config.bind);

    let store: Arc<dyn AccountStore> = match &config.data_dir {
        Some(dir) => {
            info!(data_dir = %dir.display(), "using file account store");
            Arc::new(
                FileStore::open(dir)
                    .await
                    .with_context(|| format!("opening account store at {}", dir.display()))?,
            )
        }
        None => {
            warn!("TV_DATA_DIR not set; accounts are kept in memory and lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState {
        accounts: Arc::new(AccountManager::new(store, config.auth.clone())),
    };

    let app = app_router(state, config.allowed_origins.clone());
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
