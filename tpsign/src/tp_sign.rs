//! One `!!tp_sign` invocation, from argument string to rewritten sign.

use color_eyre::eyre::Error;
use tpsign_command::{
    BlockPos,
    SyntaxError,
    parse_command,
};

use crate::{
    config::Config,
    raycast::{
        ViewRay,
        locate_sign,
    },
    server::{
        MinecraftServer,
        player_dimension,
        player_position,
        player_rotation,
        tell,
    },
    sign::{
        PayloadTooLong,
        rewrite_sign,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Rewritten(BlockPos),
    NotFound,
    SyntaxError(SyntaxError),
    /// The sign text would not fit into one command; carries the command length in bytes.
    TooLong(usize),
}

/// Runs an invocation by `player` with the arguments following the command prefix.
///
/// Syntax errors, missing signs and oversized sign text are reported to the player and returned as an [`Outcome`].
/// Errors are only returned for failed server queries, in which case nothing has been written.
pub async fn run<S>(
    server: &mut S,
    config: &Config,
    player: &str,
    args: &str,
) -> Result<Outcome, Error>
where
    S: MinecraftServer,
{
    let command = match parse_command(args) {
        Ok((command, _)) => command,
        Err(error) => {
            tracing::debug!(%error, offset = error.offset(), "invalid arguments");
            tell(server, player, &error.excerpt(args).to_string(), "red").await?;
            return Ok(Outcome::SyntaxError(error));
        }
    };

    tracing::debug!(?command);

    let position = player_position(server, player).await?;
    let rotation = player_rotation(server, player).await?;
    let dimension = player_dimension(server, player).await?;

    let ray = ViewRay::new(position, rotation, &config.raycast);
    let sign = locate_sign(server, &ray, dimension, &config.sign.block_entity_id).await?;

    if let Some(sign) = sign {
        let result = rewrite_sign(
            server,
            sign,
            dimension,
            player,
            &command,
            &config.sign.label,
        )
        .await;

        if let Err(error) = result {
            let Some(too_long) = error.downcast_ref::<PayloadTooLong>().copied()
            else {
                return Err(error);
            };

            tracing::debug!(length = too_long.length, "sign text too long");
            tell(server, player, &too_long.to_string(), "red").await?;
            return Ok(Outcome::TooLong(too_long.length));
        }

        Ok(Outcome::Rewritten(sign))
    }
    else {
        tell(server, player, &config.sign.not_found_message, "yellow").await?;
        Ok(Outcome::NotFound)
    }
}
