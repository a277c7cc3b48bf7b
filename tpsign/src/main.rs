use std::{
    path::PathBuf,
    sync::Arc,
};

use clap::{
    Parser,
    Subcommand,
};
use color_eyre::eyre::{
    Error,
    bail,
};
use tpsign::{
    config::Config,
    tp_sign,
    watch,
};
use tpsign_rcon_client::RconClient;

#[derive(Debug, Parser)]
pub struct Args {
    #[clap(short, long, default_value = "tpsign.toml")]
    config: PathBuf,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand, Default)]
enum Command {
    /// Read the server log from stdin and handle chat invocations.
    #[default]
    Watch,

    /// Handle a single invocation on behalf of a player.
    Run {
        #[clap(short, long)]
        player: String,

        /// `<x> <y> <z> <dimension> <remark>`
        #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _ = dotenvy::dotenv();
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = Config::load(&args.config)?;
    tracing::debug!(?config);

    match args.command.unwrap_or_default() {
        Command::Watch => {
            watch::run(Arc::new(config)).await?;
        }
        Command::Run { player, args } => {
            if !watch::is_valid_player_name(&player) {
                bail!("Invalid player name: {player}");
            }

            let mut client =
                RconClient::connect(&config.rcon.address, &config.rcon.password).await?;
            let outcome = tp_sign::run(&mut client, &config, &player, &args.join(" ")).await?;
            println!("{outcome:?}");
        }
    }

    Ok(())
}
