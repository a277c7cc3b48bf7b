//! Picks invocations out of the server log and runs each of them in its own task.
//!
//! The log is read from stdin, e.g. `tail -F logs/latest.log | tpsign watch`.

use std::sync::Arc;

use color_eyre::eyre::Error;
use futures_lite::StreamExt;
use tokio::task::JoinHandle;
use tokio_util::codec::{
    FramedRead,
    LinesCodec,
};
use tpsign_command::parse::DIVIDER;
use tpsign_rcon_client::RconClient;
use tracing::Instrument;

use crate::{
    config::Config,
    tp_sign,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChatMessage<'a> {
    pub player: &'a str,
    pub message: &'a str,
}

pub fn is_valid_player_name(name: &str) -> bool {
    (1..=16).contains(&name.len())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Tag in front of chat messages that carry no chat signature.
const NOT_SECURE: &str = "[Not Secure] ";

/// Extracts a chat message from a log line like
/// `[12:34:56] [Server thread/INFO]: <Steve> hello`.
pub fn parse_chat_line(line: &str) -> Option<ChatMessage<'_>> {
    let (_, rest) = line.split_once("]: ")?;
    let rest = rest.strip_prefix(NOT_SECURE).unwrap_or(rest);
    let (player, message) = rest.strip_prefix('<')?.split_once("> ")?;

    is_valid_player_name(player).then_some(ChatMessage { player, message })
}

/// Returns the argument string if `message` invokes the command named `prefix`.
pub fn invocation_args<'a>(message: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = message.strip_prefix(prefix)?;

    if rest.is_empty() {
        Some(rest)
    }
    else {
        rest.strip_prefix(DIVIDER)
    }
}

pub fn spawn_invocation(config: Arc<Config>, player: String, args: String) -> JoinHandle<()> {
    let span = tracing::info_span!("tp_sign", %player);

    tokio::spawn(
        async move {
            let result = async {
                let mut client =
                    RconClient::connect(&config.rcon.address, &config.rcon.password).await?;
                tp_sign::run(&mut client, &config, &player, &args).await
            }
            .await;

            match result {
                Ok(outcome) => tracing::info!(?outcome, "invocation finished"),
                Err(error) => tracing::error!(%error, "invocation failed"),
            }
        }
        .instrument(span),
    )
}

/// Reads log lines from stdin until EOF or Ctrl-C.
pub async fn run(config: Arc<Config>) -> Result<(), Error> {
    let mut lines = FramedRead::new(tokio::io::stdin(), LinesCodec::new());

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    tracing::info!(prefix = %config.watch.prefix, "watching server log on stdin");

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                break;
            }
            result = lines.try_next() => {
                let Some(line) = result?
                else {
                    break;
                };

                let Some(chat) = parse_chat_line(&line)
                else {
                    continue;
                };

                if let Some(args) = invocation_args(chat.message, &config.watch.prefix) {
                    tracing::debug!(player = chat.player, args, "invocation");
                    spawn_invocation(config.clone(), chat.player.to_owned(), args.to_owned());
                }
            }
        }
    }

    tracing::debug!("stopped watching");

    Ok(())
}
