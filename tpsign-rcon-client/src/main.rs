use clap::Parser;
use color_eyre::eyre::Error;
use tpsign_rcon_client::RconClient;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _ = dotenvy::dotenv();
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut client = RconClient::connect(&args.address, &args.password).await?;
    let reply = client.execute(&args.command.join(" ")).await?;
    println!("{reply}");

    Ok(())
}

/// Sends a single command to the server console and prints the reply.
#[derive(Debug, Parser)]
struct Args {
    #[clap(short, long, default_value = "localhost:25575")]
    address: String,

    #[clap(short, long, env = "TPSIGN_RCON_PASSWORD", hide_env_values = true)]
    password: String,

    #[clap(required = true)]
    command: Vec<String>,
}
