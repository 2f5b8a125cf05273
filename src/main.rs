use clap::{Parser, Subcommand};

use homescope::server;

#[derive(Parser, Debug)]
#[command(name = "marketplace", about = "Real-estate marketplace backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Server {},

    Sweep {
        #[arg(long = "grace-minutes", default_value_t = 1440)]
        grace_minutes: i64,
    },
}

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server {} => server::run().await,
        Commands::Sweep { grace_minutes } => server::sweep(grace_minutes).await,
    }
}
