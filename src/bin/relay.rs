use std::process;

use clap::Parser;
use log::error;
use tokio_util::sync::CancellationToken;

use ircsink::integration;
use ircsink::relay::{self, listener::Listener};
use ircsink::shutdown;

/// Relays messages from IRC channels into the durable queue.
#[derive(Parser)]
#[command(name = "relay")]
struct Args {
    /// IRC server, as host or host:port
    #[arg(short, long)]
    server: String,

    /// IRC nick
    #[arg(short, long)]
    nick: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Channels to join, each starting with '#'
    #[arg(required = true)]
    channels: Vec<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    integration::init_logger("relay", args.verbose);

    if let Err(e) = run(args).await {
        error!("relay terminated: {e}");
        process::exit(1);
    }
}

async fn run(args: Args) -> relay::Result<()> {
    relay::validate_channels(&args.channels)?;

    let config = integration::Config::default();
    let chat_config = integration::chat::Config::new(&args.server, &args.nick)?;

    let mut chat = integration::chat::init(&chat_config).await?;

    let js = integration::pubsub::init(&config.pubsub).await?;
    integration::pubsub::ensure_topic(&js).await?;

    let cancel = CancellationToken::new();
    shutdown::watch(cancel.clone())?;

    relay::run(Listener::new(args.channels), &mut chat, js, cancel).await
}
