//! Turns a sign into a clickable teleporter.

use color_eyre::eyre::Error;
use serde::Serialize;
use tpsign_command::{
    BlockPos,
    Dimension,
    ParsedCommand,
};
use tpsign_rcon_client::codec::MAX_REQUEST_BODY;

use crate::server::MinecraftServer;

/// The sign text doesn't fit into a single console command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Sign text too long: the command is {length} bytes (maximum is {max})", max = MAX_REQUEST_BODY)]
pub struct PayloadTooLong {
    pub length: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickAction {
    RunCommand,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClickEvent {
    pub action: ClickAction,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextComponent {
    pub text: String,
    #[serde(rename = "clickEvent")]
    pub click_event: ClickEvent,
}

pub fn teleport_command(player: &str, command: &ParsedCommand) -> String {
    format!(
        "/execute in {} run tp {player} {}",
        command.dimension, command.destination
    )
}

/// The four sign lines: label, spacer, destination and remark. All of them carry the same click
/// action so the whole sign is one click target.
pub fn text_components(label: &str, player: &str, command: &ParsedCommand) -> [TextComponent; 4] {
    let click_event = ClickEvent {
        action: ClickAction::RunCommand,
        value: teleport_command(player, command),
    };

    [
        label.to_owned(),
        String::new(),
        command.destination.to_string(),
        command.remark.clone(),
    ]
    .map(|text| {
        TextComponent {
            text,
            click_event: click_event.clone(),
        }
    })
}

/// Quotes `s` as a single-quoted SNBT string.
fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Renders the components as an SNBT list of strings, each holding one component as JSON.
pub fn messages(components: &[TextComponent]) -> Result<String, Error> {
    let messages = components
        .iter()
        .map(|component| serde_json::to_string(component).map(|json| quote(&json)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(format!("[{}]", messages.join(",")))
}

/// Command that writes `messages` to both sides of the sign and makes them glow.
pub fn merge_command(position: BlockPos, dimension: Dimension, messages: &str) -> String {
    let text = format!("{{messages:{messages},has_glowing_text:1b}}");
    format!(
        "execute in {dimension} run data merge block {position} {{front_text:{text},back_text:{text}}}"
    )
}

/// Writes the teleporter text onto the sign at `position`.
///
/// Fails with [`PayloadTooLong`] without writing anything if the command would exceed the
/// server's request limit.
pub async fn rewrite_sign<S>(
    server: &mut S,
    position: BlockPos,
    dimension: Dimension,
    player: &str,
    command: &ParsedCommand,
    label: &str,
) -> Result<(), Error>
where
    S: MinecraftServer,
{
    let components = text_components(label, player, command);
    let messages = messages(&components)?;

    let write = merge_command(position, dimension, &messages);
    if write.len() > MAX_REQUEST_BODY {
        return Err(PayloadTooLong {
            length: write.len(),
        }
        .into());
    }

    server.execute(&write).await?;

    tracing::info!(
        %position,
        destination = %command.destination,
        dimension = %command.dimension,
        "rewrote sign"
    );

    Ok(())
}
