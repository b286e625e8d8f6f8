use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use irc::client::Client;
use irc::client::prelude::{Command, Config as IrcConfig, Response};
use log::warn;

use crate::relay;
use crate::relay::listener::{ChatConnection, ChatEvent};

use super::Result;

#[derive(Clone)]
pub struct Config {
    server: String,
    port: u16,
    nickname: String,
}

impl Config {
    /// `server` is `host` or `host:port`; the port defaults to 6667.
    pub fn new(server: &str, nickname: &str) -> Result<Self> {
        let (host, port) = match server.split_once(':') {
            Some((host, port)) => (host.to_string(), port.parse()?),
            None => (server.to_string(), 6667),
        };

        Ok(Self {
            server: host,
            port,
            nickname: nickname.to_string(),
        })
    }
}

/// IRC-backed [`ChatConnection`]. Channel joins happen through the
/// listener once the welcome arrives, not through the client's own
/// autojoin list.
pub struct IrcChat {
    client: Client,
    stream: irc::client::ClientStream,
}

pub async fn init(config: &Config) -> Result<IrcChat> {
    let irc_config = IrcConfig {
        nickname: Some(config.nickname.clone()),
        server: Some(config.server.clone()),
        port: Some(config.port),
        use_tls: Some(false),
        ..IrcConfig::default()
    };

    let mut client = Client::from_config(irc_config).await?;
    client.identify()?;
    let stream = client.stream()?;

    Ok(IrcChat { client, stream })
}

#[async_trait]
impl ChatConnection for IrcChat {
    fn join(&mut self, channel: &str) -> relay::Result<()> {
        self.client
            .send_join(channel)
            .map_err(super::Error::from)?;
        Ok(())
    }

    fn quit(&mut self) -> relay::Result<()> {
        self.client.send_quit("").map_err(super::Error::from)?;
        Ok(())
    }

    async fn next_event(&mut self) -> Option<ChatEvent> {
        loop {
            match self.stream.next().await? {
                Ok(protocol_message) => {
                    let event = match &protocol_message.command {
                        Command::Response(Response::RPL_WELCOME, _) => Some(ChatEvent::Connected),
                        Command::PRIVMSG(target, text) => protocol_message
                            .source_nickname()
                            .map(|nick| ChatEvent::Message {
                                nick: nick.to_string(),
                                text: text.clone(),
                                channel: target.clone(),
                                received_at: Utc::now(),
                            }),
                        Command::ERROR(_) => Some(ChatEvent::Disconnected),
                        _ => None,
                    };

                    if let Some(event) = event {
                        return Some(event);
                    }
                }
                Err(e) => {
                    warn!("chat stream error: {e}");
                    return Some(ChatEvent::Disconnected);
                }
            }
        }
    }
}
