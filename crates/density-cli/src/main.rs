use clap::{Parser, Subcommand};

mod commands;

use commands::SearchArgs;
use commands::benchmark::BenchmarkArgs;

#[derive(Parser)]
#[command(
    name = "stream-density",
    about = "Find the maximum number of pipelines that sustain a target FPS",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the stream density search for each (target fps, container name) pair.
    ///
    /// Pipelines are started through docker compose. Each pipeline writes
    /// its FPS to pipeline<id>_<container-name>.log in the results
    /// directory. Diagnostics for the run go to stream_density.log there.
    Run {
        #[command(flatten)]
        search: SearchArgs,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Run a fixed number of pipelines for a set duration, then tear them down.
    Benchmark {
        #[command(flatten)]
        args: BenchmarkArgs,
    },
    /// Print the effective configuration after merging file, env, and flags.
    Config {
        #[command(flatten)]
        search: SearchArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { search, format } => commands::run::run(search, &format).await,
        Commands::Benchmark { args } => commands::benchmark::run(args).await,
        Commands::Config { search } => commands::config::show(search),
    }
}
