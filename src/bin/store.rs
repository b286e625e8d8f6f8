use std::process;

use log::error;
use tokio_util::sync::CancellationToken;

use ircsink::integration;
use ircsink::shutdown;
use ircsink::store::{self, handler::StoreHandler, repository::MessageRepository};

#[tokio::main]
async fn main() {
    integration::init_logger("store", false);

    if let Err(e) = run().await {
        error!("store terminated: {e}");
        process::exit(1);
    }
}

async fn run() -> store::Result<()> {
    let config = integration::Config::default();

    let db = integration::mongo::init(&config.mongo).await?;
    let repository = MessageRepository::new(&db);

    let js = integration::pubsub::init(&config.pubsub).await?;
    let subscription = integration::pubsub::subscription(&js).await?;

    let cancel = CancellationToken::new();
    shutdown::watch(cancel.clone())?;

    StoreHandler::new(repository).run(subscription, cancel).await
}
