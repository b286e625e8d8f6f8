use std::env;
use std::time::Duration;

use mongodb::options::{ClientOptions, ServerAddress};

use super::Result;

#[derive(Clone)]
pub struct Config {
    host: String,
    port: u16,
    db: String,
    pool_size: u32,
    idle_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 27017,
            db: String::from("messages"),
            pool_size: 10,
            idle_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn env() -> Result<Self> {
        let host = env::var("MONGO_HOST")?;
        let port = env::var("MONGO_PORT")?.parse()?;
        let db = env::var("MONGO_DB")?;
        let pool_size = env::var("MONGO_POOL_SIZE")
            .unwrap_or_else(|_| "10".into())
            .parse()?;
        let idle_timeout = Duration::from_secs(
            env::var("MONGO_IDLE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".into())
                .parse()?,
        );

        Ok(Self {
            host,
            port,
            db,
            pool_size,
            idle_timeout,
        })
    }
}

pub async fn init(config: &Config) -> Result<mongodb::Database> {
    let options = ClientOptions::builder()
        .hosts(vec![ServerAddress::Tcp {
            host: config.host.clone(),
            port: Some(config.port),
        }])
        .max_pool_size(Some(config.pool_size))
        .max_idle_time(Some(config.idle_timeout))
        .server_selection_timeout(Some(Duration::from_secs(2)))
        .connect_timeout(Some(Duration::from_secs(5)))
        .build();

    let db = mongodb::Client::with_options(options).map(|client| client.database(&config.db))?;

    Ok(db)
}
