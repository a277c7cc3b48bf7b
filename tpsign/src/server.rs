//! Queries against a running server, expressed as console commands.

use color_eyre::eyre::{
    Error,
    OptionExt,
};
use nalgebra::Point3;
use serde_json::{
    Value,
    json,
};
use tokio::io::{
    AsyncRead,
    AsyncWrite,
};
use tpsign_command::{
    BlockPos,
    Dimension,
};
use tpsign_rcon_client::RconClient;

use crate::{
    raycast::Rotation,
    snbt,
};

const ENTITY_DATA: &str = " has the following entity data: ";
const BLOCK_DATA: &str = " has the following block data: ";
const NO_ENTITY: &str = "No entity was found";

/// Anything that runs a console command and hands back the server's reply.
pub trait MinecraftServer {
    fn execute(&mut self, command: &str) -> impl Future<Output = Result<String, Error>> + Send;
}

impl<S> MinecraftServer for RconClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    fn execute(&mut self, command: &str) -> impl Future<Output = Result<String, Error>> + Send {
        RconClient::execute(self, command)
    }
}

#[derive(Clone, Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Unexpected reply to `{command}`: {reply}")]
    UnexpectedReply { command: String, reply: String },
}

/// Decoded block entity data.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockData {
    pub id: String,
    pub nbt: Value,
}

async fn entity_data<S>(server: &mut S, player: &str, path: &str) -> Result<Value, Error>
where
    S: MinecraftServer,
{
    let command = format!("data get entity {player} {path}");
    let reply = server.execute(&command).await?;

    let Some((_, data)) = reply.split_once(ENTITY_DATA)
    else {
        if reply.starts_with(NO_ENTITY) {
            return Err(QueryError::PlayerNotFound(player.to_owned()).into());
        }
        return Err(QueryError::UnexpectedReply { command, reply }.into());
    };

    Ok(snbt::from_str(data.trim())?)
}

pub async fn player_position<S>(server: &mut S, player: &str) -> Result<Point3<f64>, Error>
where
    S: MinecraftServer,
{
    let [x, y, z]: [f64; 3] = serde_json::from_value(entity_data(server, player, "Pos").await?)?;
    Ok(Point3::new(x, y, z))
}

pub async fn player_rotation<S>(server: &mut S, player: &str) -> Result<Rotation, Error>
where
    S: MinecraftServer,
{
    let [yaw, pitch]: [f64; 2] =
        serde_json::from_value(entity_data(server, player, "Rotation").await?)?;
    Ok(Rotation { yaw, pitch })
}

pub async fn player_dimension<S>(server: &mut S, player: &str) -> Result<Dimension, Error>
where
    S: MinecraftServer,
{
    let dimension: String =
        serde_json::from_value(entity_data(server, player, "Dimension").await?)?;
    Ok(Dimension::from_resource_location(&dimension)?)
}

/// Returns `None` if there is no block entity at `position`.
pub async fn block_data<S>(
    server: &mut S,
    dimension: Dimension,
    position: BlockPos,
) -> Result<Option<BlockData>, Error>
where
    S: MinecraftServer,
{
    let reply = server
        .execute(&format!(
            "execute in {dimension} run data get block {position}"
        ))
        .await?;

    let Some((_, data)) = reply.split_once(BLOCK_DATA)
    else {
        tracing::trace!(%position, reply, "no block data");
        return Ok(None);
    };

    let nbt = snbt::from_str(data.trim())?;
    let id = nbt
        .get("id")
        .and_then(Value::as_str)
        .ok_or_eyre("Block data without id")?
        .to_owned();

    Ok(Some(BlockData { id, nbt }))
}

/// Sends a chat message to a single player.
pub async fn tell<S>(server: &mut S, player: &str, text: &str, color: &str) -> Result<(), Error>
where
    S: MinecraftServer,
{
    let message = json!({ "text": text, "color": color });
    server.execute(&format!("tellraw {player} {message}")).await?;
    Ok(())
}


#[cfg(test)]
mod tests {
    use tpsign_command::{
        BlockPos,
        Dimension,
    };

    use crate::{
        raycast::Rotation,
        server::{
            QueryError,
            block_data,
            mock::{
                CHEST,
                MockServer,
                SIGN,
            },
            player_dimension,
            player_position,
            player_rotation,
            tell,
        },
    };

    #[tokio::test]
    async fn reads_player_state() {
        let mut server = MockServer::new("Steve");
        server.position = nalgebra::Point3::new(-12.25, 70.0, 3.5);
        server.rotation = Rotation {
            yaw: -90.0,
            pitch: 30.5,
        };
        server.dimension = Dimension::TheNether;

        let position = player_position(&mut server, "Steve").await.unwrap();
        assert_eq!(position, nalgebra::Point3::new(-12.25, 70.0, 3.5));

        let rotation = player_rotation(&mut server, "Steve").await.unwrap();
        assert_eq!(rotation, server.rotation);

        let dimension = player_dimension(&mut server, "Steve").await.unwrap();
        assert_eq!(dimension, Dimension::TheNether);
    }

    #[tokio::test]
    async fn unknown_player_is_an_error() {
        let mut server = MockServer::new("Steve");
        let error = player_position(&mut server, "Alex").await.unwrap_err();

        assert!(matches!(
            error.downcast_ref::<QueryError>(),
            Some(QueryError::PlayerNotFound(name)) if name == "Alex"
        ));
    }

    #[tokio::test]
    async fn block_data_reports_absence_and_id() {
        let mut server = MockServer::new("Steve");
        server.blocks.insert(BlockPos::new(1, 2, 3), SIGN);
        server.blocks.insert(BlockPos::new(4, 5, 6), CHEST);

        let sign = block_data(&mut server, Dimension::Overworld, BlockPos::new(1, 2, 3))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sign.id, "minecraft:sign");
        assert_eq!(sign.nbt["front_text"]["color"], "black");

        let chest = block_data(&mut server, Dimension::Overworld, BlockPos::new(4, 5, 6))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(chest.id, "minecraft:chest");

        let air = block_data(&mut server, Dimension::Overworld, BlockPos::new(0, 0, 0))
            .await
            .unwrap();
        assert_eq!(air, None);

        assert_eq!(
            server.commands[0],
            "execute in minecraft:overworld run data get block 1 2 3"
        );
    }

    #[tokio::test]
    async fn tell_sends_json_text() {
        let mut server = MockServer::new("Steve");
        tell(&mut server, "Steve", "say \"hi\"", "red").await.unwrap();

        let message = server.commands[0].strip_prefix("tellraw Steve ").unwrap();
        let message: serde_json::Value = serde_json::from_str(message).unwrap();
        assert_eq!(message, serde_json::json!({ "text": "say \"hi\"", "color": "red" }));
    }
}
