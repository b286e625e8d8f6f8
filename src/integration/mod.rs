use std::env;
use std::fs::File;
use std::str::FromStr;

use dotenv::dotenv;
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode, WriteLogger};

pub mod chat;
pub mod mongo;
pub mod pubsub;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    _Irc(#[from] irc::error::Error),
    _MongoDB(#[from] mongodb::error::Error),
    _NatsConnect(#[from] async_nats::ConnectError),
    _CreateStream(#[from] async_nats::jetstream::context::CreateStreamError),
    _Consumer(#[from] async_nats::jetstream::stream::ConsumerError),

    _Env(#[from] env::VarError),
    _ParseInt(#[from] std::num::ParseIntError),
}

/// Backend configuration shared by both binaries, built once at startup
/// and passed down by parameter.
#[derive(Clone)]
pub struct Config {
    pub pubsub: pubsub::Config,
    pub mongo: mongo::Config,
}

impl Default for Config {
    fn default() -> Self {
        dotenv().ok();

        Self {
            pubsub: pubsub::Config::env().unwrap_or_default(),
            mongo: mongo::Config::env().unwrap_or_default(),
        }
    }
}

/// Terminal plus file logger: level comes from `RUST_LOG`, `verbose`
/// forces debug.
pub fn init_logger(service: &str, verbose: bool) {
    dotenv().ok();

    let rust_log = env::var("RUST_LOG").unwrap_or("info".into());
    let mut level = LevelFilter::from_str(&rust_log).unwrap_or(LevelFilter::Info);
    if verbose {
        level = LevelFilter::Debug;
    }

    CombinedLogger::init(vec![
        TermLogger::new(
            level,
            simplelog::Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(
            level,
            simplelog::Config::default(),
            File::create(format!("{service}.log")).expect("Failed to create log file"),
        ),
    ])
    .expect("Failed to initialize logger");
}
