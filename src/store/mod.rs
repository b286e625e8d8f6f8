use crate::integration;

pub mod handler;
pub mod repository;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    #[error("queue acknowledgement failed: {0}")]
    Ack(async_nats::Error),

    _Integration(#[from] integration::Error),
    _ParseJson(#[from] serde_json::Error),
    _MongoDB(#[from] mongodb::error::Error),
    _Stream(#[from] async_nats::jetstream::consumer::StreamError),
    _Io(#[from] std::io::Error),
}
