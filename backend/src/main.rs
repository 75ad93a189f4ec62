//! Backend entry-point: loads configuration, prepares the database, and
//! serves the users REST API.

use mockable::DefaultEnv;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use backend::outbound::persistence::{run_pending_migrations, DbPool, PoolConfig};
use backend::server::{create_server, AppConfig};

fn init_tracing() {
    let builder = fmt().with_env_filter(EnvFilter::from_default_env());
    #[cfg(debug_assertions)]
    let result = builder.pretty().try_init();
    #[cfg(not(debug_assertions))]
    let result = builder.json().try_init();
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let config = match AppConfig::from_env(&DefaultEnv::new()) {
        Ok(config) => config,
        Err(error) => {
            error!(%error, "invalid configuration");
            return Err(std::io::Error::other(error.to_string()));
        }
    };

    if let Err(error) = run_pending_migrations(&config.database_url).await {
        error!(%error, "database migration failed");
        return Err(std::io::Error::other(error.to_string()));
    }

    let pool = match DbPool::new(PoolConfig::new(&config.database_url)).await {
        Ok(pool) => pool,
        Err(error) => {
            error!(%error, "database pool construction failed");
            return Err(std::io::Error::other(error.to_string()));
        }
    };

    let server = create_server(&config, pool)?;
    info!(addr = %config.bind_addr(), "listening");
    server.await
}
