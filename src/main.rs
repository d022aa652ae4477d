use clap::Parser;
use fleetwatch::cli::{
    check, diagnose, handle_completions, handle_config_init, unlock, Cli, Commands,
    ConfigCommands,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => fleetwatch::cli::serve::run_serve(args).await,
        Commands::Check(args) => check::handle_check(&args).await,
        Commands::Diagnose(args) => diagnose::handle_diagnose(&args).await,
        Commands::Unlock(args) => unlock::handle_unlock(&args).await,
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
