use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "chronodrift", version, about = "Chronodrift CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Run a live focus countdown on a task
    Focus(commands::focus::FocusArgs),
    /// Productivity statistics
    Stats,
    /// Achievement progress
    Achievements,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action),
        Commands::Focus(args) => commands::focus::run(args),
        Commands::Stats => commands::stats::run_stats(),
        Commands::Achievements => commands::stats::run_achievements(),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
