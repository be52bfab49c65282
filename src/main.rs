use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{error, info};

use limpet::banner::banner;
use limpet::config::Config;
use limpet::server::server::run as run_server;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// C2 coordinator server
    Server {
        /// Host to bind the listener to
        #[arg(short = 'H', long, default_value = "0.0.0.0")]
        host: String,

        /// Port to bind the listener to
        #[arg(short = 'P', long, default_value_t = 8000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Server { host, port }) => {
            banner("server");

            let config = Config::new(host.to_owned(), port.to_owned());

            info!("Starting C2 coordinator...");
            if let Err(e) = run_server(config).await {
                error!("Server error: {e}");
            }
        },
        _ => {},
    }
}
